use crate::database::DbPool;
use crate::entities::document_entity as documents;
use crate::error::AppResult;
use crate::models::Stored;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// JSON documents grouped by collection, one row each in `documents`.
#[derive(Clone)]
pub struct DocumentStore {
    pool: DbPool,
}

impl DocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, collection: &str, body: Value) -> AppResult<documents::Model> {
        let now = Utc::now();
        let model = documents::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            collection: Set(collection.to_string()),
            body: Set(body),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.pool).await?)
    }

    /// Oldest first.
    pub async fn find_all(&self, collection: &str) -> AppResult<Vec<documents::Model>> {
        let docs = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .order_by_asc(documents::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(docs)
    }

    pub async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> AppResult<Option<documents::Model>> {
        let doc = documents::Entity::find_by_id(id.to_string())
            .filter(documents::Column::Collection.eq(collection))
            .one(&self.pool)
            .await?;
        Ok(doc)
    }

    /// Documents whose top-level `field` is the string `value`, matched in SQL.
    pub async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Vec<documents::Model>> {
        let docs = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .filter(Expr::cust_with_values(
                "json_extract(body, ?) = ?",
                [format!("$.\"{field}\""), value.to_string()],
            ))
            .order_by_asc(documents::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(docs)
    }

    /// Last write wins; there is no version check.
    pub async fn replace(
        &self,
        collection: &str,
        id: &str,
        body: Value,
    ) -> AppResult<Option<documents::Model>> {
        let Some(existing) = self.find_by_id(collection, id).await? else {
            return Ok(None);
        };
        let mut model = existing.into_active_model();
        model.body = Set(body);
        model.updated_at = Set(Utc::now());
        Ok(Some(model.update(&self.pool).await?))
    }

    pub async fn delete(&self, collection: &str, id: &str) -> AppResult<Option<documents::Model>> {
        let Some(existing) = self.find_by_id(collection, id).await? else {
            return Ok(None);
        };
        existing.clone().delete(&self.pool).await?;
        Ok(Some(existing))
    }
}

pub fn decode<T: DeserializeOwned>(doc: documents::Model) -> AppResult<Stored<T>> {
    Ok(Stored {
        id: doc.id,
        record: serde_json::from_value(doc.body)?,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}
