// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas: login, lista de campi e abertura de chamados
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/campuses", get(handlers::campuses::list_campuses))
        .route("/api/campuses/{id}", get(handlers::campuses::get_campus))
        .route("/api/campuses/{id}/sectors", get(handlers::campuses::list_campus_sectors))
        .route("/api/requests", post(handlers::requests::create_request));

    // Todo o resto passa pelo auth_guard
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/campuses", post(handlers::campuses::create_campus))
        .route(
            "/api/campuses/{id}",
            put(handlers::campuses::rename_campus)
                .delete(handlers::campuses::delete_campus),
        )
        .route(
            "/api/categories",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::catalog::rename_category)
                .delete(handlers::catalog::delete_category),
        )
        .route(
            "/api/sectors",
            get(handlers::catalog::list_sectors).post(handlers::catalog::create_sector),
        )
        .route(
            "/api/sectors/{id}",
            put(handlers::catalog::rename_sector)
                .delete(handlers::catalog::delete_sector),
        )
        .route(
            "/api/inventory",
            get(handlers::inventory::list_items).post(handlers::inventory::create_item),
        )
        .route("/api/inventory/disposed", get(handlers::inventory::list_disposed_items))
        .route("/api/inventory/sync", post(handlers::inventory::sync_items))
        .route(
            "/api/inventory/{id}",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        )
        .route("/api/inventory/{id}/dispose", post(handlers::inventory::dispose_item))
        .route("/api/inventory/{id}/restore", post(handlers::inventory::restore_item))
        .route(
            "/api/loans",
            get(handlers::loans::list_loans).post(handlers::loans::create_loan),
        )
        .route("/api/loans/{id}", get(handlers::loans::get_loan))
        .route("/api/loans/{id}/return", post(handlers::loans::return_loan))
        .route("/api/audit", get(handlers::audit::list_audit_log))
        .route("/api/requests", get(handlers::requests::list_requests))
        .route("/api/requests/{id}", get(handlers::requests::get_request))
        .route(
            "/api/requests/{id}/status",
            patch(handlers::requests::update_request_status),
        )
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/api/reports/inventory.csv", get(handlers::reports::inventory_csv))
        .route("/api/reports/inventory.pdf", get(handlers::reports::inventory_pdf))
        .route(
            "/api/reports/loans/{id}/receipt.pdf",
            get(handlers::reports::loan_receipt_pdf),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Tracing
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use std::path::PathBuf;
    use tower::ServiceExt;

    // O pool nunca conecta: só servem rotas que respondem antes de tocar no banco
    fn test_app() -> Router {
        let settings = Settings {
            database_url: "postgres://localhost/inventario_test".into(),
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            jwt_ttl_hours: 1,
            report_fonts_dir: PathBuf::from("./fonts"),
            bootstrap_admin_password: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&settings.database_url)
            .unwrap();
        build_router(AppState::from_pool(pool, &settings))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn inventory_requires_a_bearer_token() {
        let response = test_app()
            .oneshot(Request::get("/api/inventory").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::post("/api/inventory/sync")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"itemIds": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_validates_before_touching_the_database() {
        let response = test_app()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username": "", "password": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["details"].get("username").is_some());
    }

    #[tokio::test]
    async fn public_request_form_checks_the_email() {
        let payload = serde_json::json!({
            "requesterEmail": "nao-e-email",
            "campusId": uuid::Uuid::new_v4(),
            "details": "Projetor não liga"
        });
        let response = test_app()
            .oneshot(
                Request::post("/api/requests")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["details"].get("requester_email").is_some());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_app()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
