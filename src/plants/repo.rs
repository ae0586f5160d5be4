use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::repo::User, error::AppError};

/// Plant listing in the `plants` collection.
///
/// `owner_username` is a snapshot taken at creation time and is never
/// synced afterwards. Invariant: `likes_count` equals `liked_by.len()`;
/// both are only ever changed together, by one conditional update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: String,
    pub owner_id: String,
    pub owner_username: String,
    pub likes_count: i64,
    pub liked_by: Vec<String>,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub created_at: OffsetDateTime,
}

fn plants(db: &Database) -> Collection<Plant> {
    db.collection::<Plant>("plants")
}

/// Matches the plant only while the user is absent from its liker set,
/// so the push and the increment cannot apply twice for one user even
/// under concurrent identical requests.
fn like_filter(plant_id: &str, user_id: &str) -> Document {
    doc! { "id": plant_id, "liked_by": { "$ne": user_id } }
}

fn like_update(user_id: &str) -> Document {
    doc! { "$push": { "liked_by": user_id }, "$inc": { "likes_count": 1_i64 } }
}

/// Mirror of `like_filter`: matches only while the user is present.
fn unlike_filter(plant_id: &str, user_id: &str) -> Document {
    doc! { "id": plant_id, "liked_by": user_id }
}

fn unlike_update(user_id: &str) -> Document {
    doc! { "$pull": { "liked_by": user_id }, "$inc": { "likes_count": -1_i64 } }
}

impl Plant {
    pub fn new(
        owner: &User,
        name: &str,
        description: &str,
        price: f64,
        photo_url: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            photo_url: photo_url.to_string(),
            owner_id: owner.id.clone(),
            owner_username: owner.username.clone(),
            likes_count: 0,
            liked_by: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub async fn insert(&self, db: &Database) -> Result<(), AppError> {
        plants(db).insert_one(self).await?;
        Ok(())
    }

    pub async fn find_all(db: &Database) -> Result<Vec<Plant>, AppError> {
        let cursor = plants(db).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_owner(db: &Database, owner_id: &str) -> Result<Vec<Plant>, AppError> {
        let cursor = plants(db).find(doc! { "owner_id": owner_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_id(db: &Database, id: &str) -> Result<Option<Plant>, AppError> {
        let plant = plants(db).find_one(doc! { "id": id }).await?;
        Ok(plant)
    }

    /// Atomically add `user_id` to the liker set and bump the count.
    /// Returns false when nothing matched, i.e. the plant is missing or
    /// the user had already liked it.
    pub async fn add_like(db: &Database, id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = plants(db)
            .update_one(like_filter(id, user_id), like_update(user_id))
            .await?;
        Ok(result.matched_count == 1)
    }

    /// Atomically remove `user_id` from the liker set and drop the count.
    /// Returns false when the plant is missing or the user was not a liker.
    pub async fn remove_like(db: &Database, id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = plants(db)
            .update_one(unlike_filter(id, user_id), unlike_update(user_id))
            .await?;
        Ok(result.matched_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> User {
        User::new("alice", "alice@example.com", "hash".into())
    }

    #[test]
    fn new_plant_starts_unliked() {
        let plant = Plant::new(&owner(), "Fern", "leafy", 9.99, "https://img/fern.jpg");
        assert_eq!(plant.likes_count, 0);
        assert!(plant.liked_by.is_empty());
        assert!(Uuid::parse_str(&plant.id).is_ok());
    }

    #[test]
    fn new_plant_snapshots_owner() {
        let owner = owner();
        let plant = Plant::new(&owner, "Fern", "leafy", 9.99, "https://img/fern.jpg");
        assert_eq!(plant.owner_id, owner.id);
        assert_eq!(plant.owner_username, "alice");
    }

    #[test]
    fn like_filter_guards_against_repeat_likes() {
        let filter = like_filter("plant-1", "user-1");
        assert_eq!(filter.get_str("id").unwrap(), "plant-1");
        let guard = filter.get_document("liked_by").unwrap();
        assert_eq!(guard.get_str("$ne").unwrap(), "user-1");
    }

    #[test]
    fn like_update_pairs_push_with_increment() {
        let update = like_update("user-1");
        let push = update.get_document("$push").unwrap();
        assert_eq!(push.get_str("liked_by").unwrap(), "user-1");
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i64("likes_count").unwrap(), 1);
    }

    #[test]
    fn unlike_filter_requires_existing_like() {
        let filter = unlike_filter("plant-1", "user-1");
        assert_eq!(filter.get_str("id").unwrap(), "plant-1");
        assert_eq!(filter.get_str("liked_by").unwrap(), "user-1");
    }

    #[test]
    fn unlike_update_pairs_pull_with_decrement() {
        let update = unlike_update("user-1");
        let pull = update.get_document("$pull").unwrap();
        assert_eq!(pull.get_str("liked_by").unwrap(), "user-1");
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i64("likes_count").unwrap(), -1);
    }
}
