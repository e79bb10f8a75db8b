//! API handlers for the guild REST endpoints

pub mod adventurers;
pub mod auth;
pub mod availability;
pub mod consumables;
pub mod equipment;
pub mod extract;
pub mod finances;
pub mod health;
pub mod openapi;
pub mod quests;
pub mod reference;
pub mod upload;
pub mod users;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{complete_error_body, AppError},
    models::{
        reference::{ConsumableType, EquipmentType, RoleKind, Speciality, Status},
        user::UserClaims,
    },
    services::storage::MAX_UPLOAD_BYTES,
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.services.auth.decode_token(token)?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Token from the `Authorization: Bearer ...` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        // Users
        .route("/users", get(users::list_users).post(users::register))
        // Quests
        .route("/quests", get(quests::list_quests).post(quests::create_quest))
        .route("/quests/:id", get(quests::get_quest).patch(quests::update_quest))
        .route("/quests/:id/status", patch(quests::update_status))
        .route("/quests/:id/validate", patch(quests::validate_quest))
        .route("/quests/:id/invalidate", patch(quests::invalidate_quest))
        .route("/quests/:id/refuse", patch(quests::refuse_quest))
        .route("/quests/:id/abandon", patch(quests::abandon_quest))
        .route("/quests/:id/start", patch(quests::start_quest))
        .route("/quests/:id/finish", patch(quests::finish_quest))
        .route("/quests/:id/adventurers/attach", patch(quests::attach_adventurers))
        .route("/quests/:id/adventurers/detach", patch(quests::detach_adventurers))
        .route("/quests/:id/adventurers/set", patch(quests::set_adventurers))
        .route("/quests/:id/equipment-stocks/attach", patch(quests::attach_equipment_stocks))
        .route("/quests/:id/equipment-stocks/detach", patch(quests::detach_equipment_stocks))
        .route("/quests/:id/equipment-stocks/set", patch(quests::set_equipment_stocks))
        .route("/quests/:id/consumables/attach", patch(quests::attach_consumables))
        .route("/quests/:id/consumables/detach", patch(quests::detach_consumables))
        .route("/quests/:id/consumables/set", patch(quests::set_consumables))
        // Adventurers
        .route("/adventurers", get(adventurers::list_adventurers).post(adventurers::create_adventurer))
        .route(
            "/adventurers/:id",
            get(adventurers::get_adventurer)
                .patch(adventurers::update_adventurer)
                .delete(adventurers::delete_adventurer),
        )
        // Availability
        .route("/adventurer-availability/available", get(availability::available_adventurers))
        .route("/adventurer-availability/rests", post(availability::create_rest))
        .route(
            "/adventurer-availability/rests/:id",
            patch(availability::update_rest).delete(availability::delete_rest),
        )
        .route("/adventurer-availability/:adventurer_id/check", get(availability::check_availability))
        .route("/adventurer-availability/:adventurer_id/schedule", get(availability::get_schedule))
        .route("/adventurer-availability/:adventurer_id/rests", get(availability::list_rests))
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route("/equipment/stocks", get(equipment::list_stocks))
        .route("/equipment/stocks/:id", delete(equipment::delete_stock))
        .route("/equipment/stocks/:id/repair", patch(equipment::repair_stock))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .patch(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route(
            "/equipment/:id/stocks",
            get(equipment::list_equipment_stocks).post(equipment::create_stock),
        )
        // Consumables
        .route("/consumables", get(consumables::list_consumables).post(consumables::create_consumable))
        .route(
            "/consumables/:id",
            get(consumables::get_consumable)
                .patch(consumables::update_consumable)
                .delete(consumables::delete_consumable),
        )
        .route("/consumables/:id/restock", patch(consumables::restock_consumable))
        // Reference data
        .nest("/specialities", reference::routes::<Speciality>())
        .nest("/equipment-types", reference::routes::<EquipmentType>())
        .nest("/consumable-types", reference::routes::<ConsumableType>())
        .nest("/statuses", reference::routes::<Status>())
        .nest("/roles", reference::routes::<RoleKind>())
        // Finances
        .route("/finances/balance", get(finances::get_balance))
        .route("/finances/transactions", post(finances::post_transaction))
        .route("/finances/statistics", get(finances::get_statistics))
        .route("/finances/history", get(finances::get_history))
        // Upload
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), complete_error_body))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        models::user::Role,
        repository::Repository,
        services::{storage::MockBlobStorage, Services},
    };

    fn test_state_with(blob_storage: MockBlobStorage) -> AppState {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let services = Services::with_storage(
            Repository::new(pool),
            config.auth.clone(),
            Arc::new(blob_storage),
        );
        AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    fn test_state() -> AppState {
        test_state_with(MockBlobStorage::new())
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: 1,
            email: "sam@guild.test".to_string(),
            role_id: role.id(),
            exp: now + 3600,
            iat: now,
        };
        let secret = if role.is_admin_tier() {
            &state.config.auth.jwt_secret_admin
        } else {
            &state.config.auth.jwt_secret
        };
        claims.create_token(secret).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = router(test_state());
        let request = Request::get("/api/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_with_path() {
        let app = router(test_state());
        let request = Request::get("/api/quests").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["path"], "/api/quests");
    }

    #[tokio::test]
    async fn malformed_authorization_header_is_unauthorized() {
        let app = router(test_state());
        let request = Request::get("/api/finances/balance")
            .header("Authorization", "Token abc")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn client_is_forbidden_on_staff_routes() {
        let state = test_state();
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let request = Request::get("/api/finances/balance")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["path"], "/api/finances/balance");
    }

    #[tokio::test]
    async fn client_cannot_start_a_quest() {
        let state = test_state();
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let request = Request::patch("/api/quests/1/start")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn verify_returns_role_of_either_token_kind() {
        let state = test_state();
        let staff = token_for(&state, Role::Assistant);
        let client = token_for(&state, Role::Client);

        for (token, role) in [(staff, Role::Assistant), (client, Role::Client)] {
            let app = router(state.clone());
            let request = Request::get("/api/auth/verify")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap();

            let (status, body) = send(app, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["roleId"], role.id());
        }
    }

    #[tokio::test]
    async fn upload_passes_the_file_to_blob_storage() {
        let mut storage = MockBlobStorage::new();
        storage
            .expect_put()
            .withf(|name, content_type, data| {
                name.ends_with(".png") && content_type == "image/png" && data.as_slice() == b"fake-png"
            })
            .times(1)
            .returning(|name, _, _| Ok(format!("http://blobs.test/images/{}", name)));

        let state = test_state_with(storage);
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let boundary = "guild-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"shield.png\"\r\n\
             Content-Type: image/png\r\n\r\nfake-png\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::post("/api/upload")
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert!(body["blobName"].as_str().unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn upload_without_file_field_is_bad_request() {
        let state = test_state();
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let boundary = "guild-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::post("/api/upload")
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["path"], "/api/upload");
    }

    #[tokio::test]
    async fn client_cannot_validate_through_status_route() {
        let state = test_state();
        let token = token_for(&state, Role::Client);

        for status in ["validated", "refused", "waiting"] {
            let request = Request::patch("/api/quests/1/status")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(format!(r#"{{"statusName":"{}"}}"#, status)))
                .unwrap();

            let (code, body) = send(router(state.clone()), request).await;
            assert_eq!(code, StatusCode::FORBIDDEN, "client moved a quest to {}", status);
            assert_eq!(body["path"], "/api/quests/1/status");
        }
    }

    #[tokio::test]
    async fn malformed_json_body_gets_error_body() {
        let state = test_state();
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let request = Request::post("/api/quests")
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"name": 5"#))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["path"], "/api/quests");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_id_gets_error_body() {
        let state = test_state();
        let token = token_for(&state, Role::Client);
        let app = router(state);

        let request = Request::get("/api/quests/abc")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["path"], "/api/quests/abc");
    }

    #[tokio::test]
    async fn invalid_query_string_gets_error_body() {
        let state = test_state();
        let token = token_for(&state, Role::Assistant);
        let app = router(state);

        let request = Request::get("/api/finances/history?take=many")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["path"], "/api/finances/history");
    }
}
