use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Public and independent of storage.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use crate::auth::{PasswordHasher, TokenService};
    use crate::routes::configure;
    use crate::state::AppState;
    use actix_web::{http::StatusCode, test, App};
    use std::time::Duration;

    #[actix_rt::test]
    async fn test_health_needs_no_token() {
        let state = AppState::in_memory(
            TokenService::new(b"health-secret", Duration::from_secs(60)),
            PasswordHasher::new(4),
        );
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "todoforge");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_string());
    }
}
