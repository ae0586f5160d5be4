use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::plants::repo::Plant;

#[derive(Debug, Deserialize)]
pub struct CreatePlantRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
    pub owner_id: String,
    pub owner_username: String,
    pub likes_count: i64,
    pub liked_by: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Derived per requester at response time, never stored.
    pub is_liked_by_user: bool,
}

impl PlantResponse {
    pub fn from_record(plant: Plant, is_liked_by_user: bool) -> Self {
        Self {
            id: plant.id,
            name: plant.name,
            description: plant.description,
            price: plant.price,
            photo_url: plant.photo_url,
            owner_id: plant.owner_id,
            owner_username: plant.owner_username,
            likes_count: plant.likes_count,
            liked_by: plant.liked_by,
            created_at: plant.created_at,
            is_liked_by_user,
        }
    }
}

/// One entry in the owner-only likes report.
#[derive(Debug, Serialize)]
pub struct LikerUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct PlantLikesResponse {
    pub plant_id: String,
    pub likes_count: i64,
    pub liked_by: Vec<LikerUser>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
