use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DELETE_ACK: &str = "Item deleted successfully";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct ItemDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// PUT body. Every field is overwritten; omitted ones fall back to defaults.
#[derive(Deserialize)]
pub struct ItemFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Clone, Default)]
pub struct AppState {
    items: Arc<RwLock<BTreeMap<i64, Item>>>,
    next_id: Arc<AtomicI64>,
}

impl AppState {
    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/items/", get(list_items).post(create_item))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", put(update_item).delete(delete_item))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    let items = state.items.read().await;
    Json(items.values().cloned().collect())
}

async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<ItemDraft>,
) -> Result<(StatusCode, Json<Item>), (StatusCode, String)> {
    if input.title.trim().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty".to_string()));
    }
    let item = Item {
        id: state.allocate_id(),
        title: input.title,
        description: input.description,
        completed: input.completed,
    };
    tracing::debug!(id = item.id, "created item");
    state.items.write().await.insert(item.id, item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ItemFields>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = state.items.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.title = input.title;
    item.description = input.description;
    item.completed = input.completed;
    tracing::debug!(id, "updated item");
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, StatusCode> {
    let mut items = state.items.write().await;
    items.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    tracing::debug!(id, "deleted item");
    Ok(Json(Message {
        message: DELETE_ACK.to_string(),
    }))
}
