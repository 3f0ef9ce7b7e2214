use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use album_core::{OwnedSticker, ServiceError, Sticker, StickerInput};

use crate::routes::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stickers", get(list_catalog).post(create_sticker))
        .route("/stickers/{number}", get(get_sticker))
        .route("/users/{id}/stickers", get(get_album).post(collect_sticker))
        .route(
            "/users/{id}/stickers/{number}",
            get(get_owned_sticker).delete(return_sticker),
        )
        .route("/users/{id}/duplicates", get(get_duplicates))
}

async fn create_sticker(
    State(state): State<AppState>,
    Json(input): Json<StickerInput>,
) -> Result<impl IntoResponse, ApiError> {
    let sticker = state.stickers.create(input).await?;
    Ok((StatusCode::CREATED, Json(sticker)))
}

async fn list_catalog(State(state): State<AppState>) -> Result<Json<Vec<Sticker>>, ApiError> {
    Ok(Json(state.stickers.get_all().await?))
}

async fn get_sticker(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> Result<Json<Sticker>, ApiError> {
    match state.stickers.get_by_number(number).await? {
        Some(sticker) => Ok(Json(sticker)),
        None => Err(ServiceError::Query(format!("Sticker not found: {number}")).into()),
    }
}

#[derive(Deserialize)]
struct CollectRequest {
    number: i64,
}

async fn collect_sticker(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<CollectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owned = state.user_stickers.create(user_id, request.number).await?;
    Ok((StatusCode::CREATED, Json(owned)))
}

async fn return_sticker(
    State(state): State<AppState>,
    Path((user_id, number)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.user_stickers.delete_by_number(user_id, number).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_owned_sticker(
    State(state): State<AppState>,
    Path((user_id, number)): Path<(i64, i64)>,
) -> Result<Json<OwnedSticker>, ApiError> {
    Ok(Json(
        state.user_stickers.get_sticker_by_user(user_id, number).await?,
    ))
}

async fn get_album(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<OwnedSticker>>, ApiError> {
    Ok(Json(
        state.user_stickers.get_all_stickers_by_user(user_id).await?,
    ))
}

async fn get_duplicates(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<OwnedSticker>>, ApiError> {
    Ok(Json(
        state.user_stickers.get_all_duplicates_by_user(user_id).await?,
    ))
}
