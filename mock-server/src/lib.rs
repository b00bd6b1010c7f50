use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Number of posts the default store is seeded with.
pub const SEEDED_POSTS: i64 = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub body: String,
}

pub type Db = Arc<BTreeMap<i64, Post>>;

/// Posts 1..=n, ten per user, the way JSONPlaceholder lays them out.
pub fn seed(n: i64) -> Vec<Post> {
    (1..=n)
        .map(|id| Post {
            user_id: (id - 1) / 10 + 1,
            id,
            title: format!("post {id}"),
            body: format!("body of post {id}"),
        })
        .collect()
}

pub fn app() -> Router {
    app_with(seed(SEEDED_POSTS))
}

pub fn app_with(posts: Vec<Post>) -> Router {
    let db: Db = Arc::new(posts.into_iter().map(|p| (p.id, p)).collect());
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    Json(db.values().cloned().collect())
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Post>, StatusCode> {
    db.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_with_camel_case_user_id() {
        let post = seed(1).remove(0);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "post 1");
    }

    #[test]
    fn seed_assigns_ten_posts_per_user() {
        let posts = seed(21);
        assert_eq!(posts.len(), 21);
        assert_eq!(posts[9].user_id, 1);
        assert_eq!(posts[10].user_id, 2);
        assert_eq!(posts[20].user_id, 3);
    }

    #[test]
    fn seed_zero_is_empty() {
        assert!(seed(0).is_empty());
    }
}
