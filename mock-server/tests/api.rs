use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use mock_server::{app, Echo, PASSWORD, USERNAME};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &axum::response::Response) -> &str {
    response.headers()[http::header::CONTENT_TYPE].to_str().unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_get_query_and_headers() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/echo?value=store+this")
                .header(http::header::ACCEPT, "text/plain,text/html")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("application/json"));
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("value=store+this"));
    assert_eq!(echo.headers["accept"], "text/plain,text/html");
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echo_reflects_post_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("value=store+this".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "value=store+this");
    assert_eq!(echo.headers["content-type"], "application/x-www-form-urlencoded");
}

#[tokio::test]
async fn echo_accepts_nested_paths() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/echo/items/7")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.path, "/echo/items/7");
}

// --- fixed bodies ---

#[tokio::test]
async fn json_route_declares_json() {
    let resp = app()
        .oneshot(Request::builder().uri("/json").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(content_type(&resp), "application/json");
    assert_eq!(&body_bytes(resp).await[..], br#"{"a": 1}"#);
}

#[tokio::test]
async fn text_routes_serve_plain_text() {
    for (kind, expected) in [
        ("plain", "Simple response"),
        ("list", "[1,2,3]"),
        ("object", r#"{"a": 1}"#),
        ("broken", "{not json}"),
    ] {
        let resp = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/text/{kind}"))
                    .body(String::new())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK, "{kind}");
        assert_eq!(content_type(&resp), "text/plain", "{kind}");
        assert_eq!(&body_bytes(resp).await[..], expected.as_bytes(), "{kind}");
    }
}

#[tokio::test]
async fn unknown_text_kind_returns_404() {
    let resp = app()
        .oneshot(Request::builder().uri("/text/nope").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth ---

#[tokio::test]
async fn protected_rejects_missing_credentials() {
    let resp = app()
        .oneshot(Request::builder().uri("/protected").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_accepts_basic_credentials() {
    let token = STANDARD.encode(format!("{USERNAME}:{PASSWORD}"));
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/protected")
                .header(http::header::AUTHORIZATION, format!("Basic {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"welcome");
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/status/503")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
