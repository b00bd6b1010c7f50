use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, seed, Post, SEEDED_POSTS};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_posts_returns_seeded_posts_in_id_order() {
    let resp = app().oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts.len() as i64, SEEDED_POSTS);
    assert!(posts.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn list_posts_empty_store() {
    let resp = app_with(Vec::new()).oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"[]");
}

// --- get ---

#[tokio::test]
async fn get_post_returns_json() {
    let resp = app().oneshot(get("/posts/7")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/json"
    );
    let post: Post = body_json(resp).await;
    assert_eq!(post, seed(7).remove(6));
}

#[tokio::test]
async fn get_post_out_of_range_is_404() {
    for uri in ["/posts/0", "/posts/101", "/posts/-5"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn get_post_non_numeric_id_is_400() {
    let resp = app().oneshot(get("/posts/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_method_not_allowed() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
