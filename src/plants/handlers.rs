use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::CurrentUser, repo::User},
    error::AppError,
    state::AppState,
};

use super::dto::{
    CreatePlantRequest, LikerUser, MessageResponse, PlantLikesResponse, PlantResponse,
};
use super::repo::Plant;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/plants", get(list_plants))
        .route("/plants/my", get(my_plants))
        .route("/plants/:id/likes", get(plant_likes))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/plants", post(create_plant))
        .route("/plants/:id/like", post(like_plant).delete(unlike_plant))
}

fn validate_listing(payload: &CreatePlantRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    if payload.photo_url.trim().is_empty() {
        return Err(AppError::Validation("Photo URL must not be empty".into()));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(AppError::Validation("Price must be non-negative".into()));
    }
    Ok(())
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_plant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePlantRequest>,
) -> Result<Json<PlantResponse>, AppError> {
    validate_listing(&payload)?;

    let plant = Plant::new(
        &user,
        payload.name.trim(),
        payload.description.trim(),
        payload.price,
        payload.photo_url.trim(),
    );
    plant.insert(&state.db).await?;

    info!(plant_id = %plant.id, owner_id = %user.id, "plant created");
    Ok(Json(PlantResponse::from_record(plant, false)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_plants(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PlantResponse>>, AppError> {
    let plants = Plant::find_all(&state.db).await?;
    let items = plants
        .into_iter()
        .map(|p| {
            let is_liked = p.liked_by.iter().any(|id| id == &user.id);
            PlantResponse::from_record(p, is_liked)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn my_plants(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PlantResponse>>, AppError> {
    let plants = Plant::find_by_owner(&state.db, &user.id).await?;
    let items = plants
        .into_iter()
        .map(|p| PlantResponse::from_record(p, false))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, user), fields(user_id = %user.id, plant_id = %id))]
pub async fn like_plant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    // Existence read only picks the error; the conditional update below is
    // the sole guard against duplicate likes.
    if Plant::find_by_id(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("Plant not found".into()));
    }

    if !Plant::add_like(&state.db, &id, &user.id).await? {
        warn!("plant already liked");
        return Err(AppError::Conflict("Plant already liked".into()));
    }

    info!("plant liked");
    Ok(Json(MessageResponse {
        message: "Plant liked successfully".into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, plant_id = %id))]
pub async fn unlike_plant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if Plant::find_by_id(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("Plant not found".into()));
    }

    if !Plant::remove_like(&state.db, &id, &user.id).await? {
        warn!("plant not liked yet");
        return Err(AppError::Conflict("Plant not liked yet".into()));
    }

    info!("plant unliked");
    Ok(Json(MessageResponse {
        message: "Plant unliked successfully".into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, plant_id = %id))]
pub async fn plant_likes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PlantLikesResponse>, AppError> {
    let plant = Plant::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".into()))?;

    if plant.owner_id != user.id {
        warn!(owner_id = %plant.owner_id, "likes requested by non-owner");
        return Err(AppError::Forbidden("Only plant owner can view likes".into()));
    }

    let likers = User::find_by_ids(&state.db, &plant.liked_by).await?;
    let liked_by = likers
        .into_iter()
        .map(|u| LikerUser {
            id: u.id,
            username: u.username,
        })
        .collect();

    Ok(Json(PlantLikesResponse {
        plant_id: plant.id,
        likes_count: plant.likes_count,
        liked_by,
    }))
}
