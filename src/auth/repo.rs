use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// User record in the `users` collection. Addressed by the `id` field,
/// never by the store's own `_id`. Created on registration, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub created_at: OffsetDateTime,
}

fn users(db: &Database) -> Collection<User> {
    db.collection::<User>("users")
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub async fn find_by_id(db: &Database, id: &str) -> Result<Option<User>, AppError> {
        let user = users(db).find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &Database, username: &str) -> Result<Option<User>, AppError> {
        let user = users(db).find_one(doc! { "username": username }).await?;
        Ok(user)
    }

    /// Duplicate probe for registration: one query covering both unique fields.
    pub async fn username_or_email_taken(
        db: &Database,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let existing = users(db)
            .find_one(doc! { "$or": [ { "username": username }, { "email": email } ] })
            .await?;
        Ok(existing.is_some())
    }

    pub async fn insert(&self, db: &Database) -> Result<(), AppError> {
        users(db).insert_one(self).await?;
        Ok(())
    }

    /// Resolve a set of user ids to records, e.g. a plant's liker set.
    pub async fn find_by_ids(db: &Database, ids: &[String]) -> Result<Vec<User>, AppError> {
        let cursor = users(db)
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_unique_opaque_id() {
        let a = User::new("alice", "alice@example.com", "hash-a".into());
        let b = User::new("alice", "alice@example.com", "hash-a".into());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn record_serializes_password_hash_for_store() {
        // The record serializes the hash (it must reach the store);
        // client-facing DTOs are responsible for omitting it.
        let user = User::new("bob", "bob@example.com", "secret-hash".into());
        let doc = bson::to_document(&user).expect("to_document");
        assert_eq!(doc.get_str("password_hash").unwrap(), "secret-hash");
        assert!(doc.get_str("id").is_ok());
    }
}
