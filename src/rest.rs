use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::guard::{require_admin, require_auth};
use crate::handlers::{auth, concerts, images, users};
use crate::AppState;

const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    // Guard ordering matters: the authentication layer is added last so it
    // runs first and the admin check sees an attached identity.
    let admin_routes = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id", delete(users::delete_user))
        .route(
            "/images",
            post(images::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/images/:image_name", delete(images::delete_image))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/concerts", get(concerts::list_concerts))
        .route("/images/:image_name", get(images::get_image))
        .merge(admin_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthService, TokenIssuer};
    use crate::db;
    use crate::seed;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn test_app() -> Router {
        let pool = db::connect_memory().await;
        seed::run(&pool).await.unwrap();

        let state = AppState {
            db: pool.clone(),
            auth: AuthService::new(pool, TokenIssuer::new("test-secret")),
            files_dir: std::env::temp_dir()
                .join(format!("stagepass-test-{}", uuid::Uuid::new_v4())),
        };
        router(state)
    }

    async fn admin_token(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "admin@example.com", "password": "admin123"}),
            ))
            .await
            .unwrap();
        body_json(response).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const BOUNDARY: &str = "------stagepass-test-boundary";

    fn multipart_body(filename: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                    name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"image\"\r\n".as_slice(),
            ),
        }
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/images")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(body))
            .unwrap()
    }

    fn delete_request(token: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn login_returns_tokens_and_user() {
        let app = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "admin@example.com", "password": "admin123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "admin@example.com");
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["sessionToken"].as_str().unwrap().len(), 128);
        assert!(!body["accessToken"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_with_bad_password_is_401() {
        let app = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "admin@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn refresh_with_corrupt_token_is_401() {
        let app = test_app().await;

        let response = app
            .oneshot(post_json(
                "/auth/refresh",
                json!({"sessionToken": "not-a-real-token"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid session token");
    }

    #[tokio::test]
    async fn protected_route_requires_bearer() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"name": "N", "email": "n@example.com", "password": "pw"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_can_create_user_and_non_admin_cannot() {
        let app = test_app().await;

        let admin_token = admin_token(&app).await;

        let mut create = post_json(
            "/users",
            json!({"name": "Fan", "email": "fan@example.com", "password": "ticket1"}),
        );
        create.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", admin_token).parse().unwrap(),
        );
        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["role"], "user");

        // The fresh standard user is authenticated but not authorized
        let login = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "fan@example.com", "password": "ticket1"}),
            ))
            .await
            .unwrap();
        let fan_token = body_json(login).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string();

        let mut create = post_json(
            "/users",
            json!({"name": "X", "email": "x@example.com", "password": "pw"}),
        );
        create.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", fan_token).parse().unwrap(),
        );
        let response = app.oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn concerts_are_listed_publicly() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/concerts").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["artist"], "Kessoku Band");
    }

    #[tokio::test]
    async fn upload_rejects_non_image_content_type() {
        let app = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .oneshot(upload_request(
                &token,
                multipart_body(Some("notes.txt"), "text/plain", b"not artwork"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "File is not an image");
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let app = test_app().await;
        let token = admin_token(&app).await;

        // A plain text field carries no filename, so no file is found
        let response = app
            .oneshot(upload_request(
                &token,
                multipart_body(None, "text/plain", b"just a value"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "No image file provided");
    }

    #[tokio::test]
    async fn upload_serve_delete_roundtrip() {
        let app = test_app().await;
        let token = admin_token(&app).await;

        let artwork = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let response = app
            .clone()
            .oneshot(upload_request(
                &token,
                multipart_body(Some("cover.png"), "image/png", &artwork),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let filename = body["filename"].as_str().unwrap().to_string();
        let stem = filename.strip_suffix(".png").unwrap();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(body["url"], format!("/images/{}", filename));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/images/{}", filename))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let uri = format!("/images/{}", filename);
        let response = app
            .clone()
            .oneshot(delete_request(&token, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Second delete finds nothing
        let response = app.oneshot(delete_request(&token, &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_missing_image_is_404() {
        let app = test_app().await;
        let token = admin_token(&app).await;

        let response = app
            .oneshot(delete_request(&token, "/images/nope.png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_image_is_404() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/images/nope.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
