//! Permission resolution scenarios through the public resolver.

use backoffice::permissions::{
    CapabilitySet, DecisionBasis, DomainSimilarity, PermissionResolver, RoleProfile,
};

#[test]
fn same_domain_employee_is_treated_as_owner() {
    let capabilities = PermissionResolver::new().resolve("owner@acme.com", "info@acme.com", "Server");
    assert_eq!(
        capabilities,
        CapabilitySet {
            pos: true,
            inventory: true,
            employees: true,
            reports: true,
            configuration: true,
            reservations: true,
            menus: true,
        }
    );
}

#[test]
fn external_chef_gets_kitchen_capabilities_only() {
    let decision =
        PermissionResolver::new().explain("j.doe@external.com", "info@acme.com", "Chef");
    assert_eq!(decision.similarity, DomainSimilarity::Low);
    assert_eq!(decision.basis, DecisionBasis::RoleLabel(RoleProfile::Chef));
    assert!(!decision.capabilities.pos);
    assert!(decision.capabilities.inventory);
    assert!(decision.capabilities.menus);
    assert!(!decision.capabilities.reservations);
}

#[test]
fn spanish_role_labels_resolve() {
    let resolver = PermissionResolver::new();
    let cases = [
        ("Propietario", RoleProfile::Owner),
        ("Gerente de turno", RoleProfile::Manager),
        ("Cocinero", RoleProfile::Chef),
        ("Cajero", RoleProfile::Cashier),
        ("Mesero", RoleProfile::Waiter),
    ];

    for (label, profile) in cases {
        let decision = resolver.explain("staff@gmail.com", "info@lacasona.mx", label);
        assert_eq!(decision.basis, DecisionBasis::RoleLabel(profile), "{label}");
        assert_eq!(decision.capabilities, profile.capabilities(), "{label}");
    }
}

#[test]
fn resolution_is_deterministic() {
    let resolver = PermissionResolver::new();
    let first = resolver.explain("ops@central.lacasona.mx", "info@lacasona.mx", "Supervisor");
    let second = resolver.explain("ops@central.lacasona.mx", "info@lacasona.mx", "Supervisor");
    assert_eq!(first, second);
    assert_eq!(first.similarity, DomainSimilarity::Medium);
    assert_eq!(first.basis, DecisionBasis::DomainAdmin);
}

#[test]
fn unknown_role_gets_nothing() {
    let capabilities =
        PermissionResolver::new().resolve("temp@agency.com", "info@acme.com", "Dishwasher");
    assert!(capabilities.is_empty());
}
