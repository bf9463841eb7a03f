use serde::{Deserialize, Serialize};

/// How strongly an employee's e-mail domain suggests they belong to the restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSimilarity {
    Low,
    Medium,
    High,
}

/// Lower-cased domain part of an address, if it has a non-empty one.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

pub fn classify(employee_email: &str, restaurant_email: &str) -> DomainSimilarity {
    let (Some(employee), Some(restaurant)) =
        (email_domain(employee_email), email_domain(restaurant_email))
    else {
        return DomainSimilarity::Low;
    };

    if employee == restaurant {
        return DomainSimilarity::High;
    }

    if employee.contains(&restaurant) || restaurant.contains(&employee) {
        return DomainSimilarity::Medium;
    }

    let employee_label = first_label(&employee);
    if employee_label == first_label(&restaurant) && employee_label.chars().count() > 3 {
        return DomainSimilarity::Medium;
    }

    DomainSimilarity::Low
}

fn first_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}
