use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::resolver::PermissionResolver;

#[derive(Debug, Deserialize)]
pub struct ResolvePermissionsRequest {
    pub employee_email: String,
    pub restaurant_email: String,
    pub role_label: String,
}

/// Router exposing the permission resolver for employee onboarding screens.
pub fn permissions_router() -> Router {
    Router::new().route("/api/v1/permissions/resolve", post(resolve_handler))
}

pub(crate) async fn resolve_handler(
    Json(request): Json<ResolvePermissionsRequest>,
) -> impl IntoResponse {
    if request.employee_email.trim().is_empty() || request.restaurant_email.trim().is_empty() {
        let payload = json!({ "error": "employee_email and restaurant_email are required" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let decision = PermissionResolver::new().explain(
        &request.employee_email,
        &request.restaurant_email,
        &request.role_label,
    );
    (StatusCode::OK, Json(decision)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn call(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = permissions_router()
            .oneshot(
                Request::post("/api/v1/permissions/resolve")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }

    #[tokio::test]
    async fn resolve_route_returns_decision() {
        let (status, payload) = call(json!({
            "employee_email": "owner@acme.com",
            "restaurant_email": "info@acme.com",
            "role_label": "Server"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["similarity"], "high");
        assert_eq!(payload["basis"]["kind"], "domain_owner");
        assert_eq!(payload["capabilities"]["configuration"], true);
    }

    #[tokio::test]
    async fn resolve_route_requires_both_emails() {
        let (status, payload) = call(json!({
            "employee_email": " ",
            "restaurant_email": "info@acme.com",
            "role_label": "chef"
        }))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(payload["error"].as_str().unwrap_or_default().contains("required"));
    }
}
