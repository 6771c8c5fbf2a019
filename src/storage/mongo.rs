use crate::storage::collection::DocumentCollection;
use crate::storage::document::*;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection,
    bson::{self, Bson, doc, oid::ObjectId},
};

/// MongoDB-backed collection
pub struct MongoCollection {
    inner: Collection<bson::Document>,
}

impl MongoCollection {
    pub fn new(inner: Collection<bson::Document>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, mut document: Document) -> Result<InsertResult, StoreError> {
        document.remove(ID_FIELD);
        let mut stored = to_bson(&document)?;
        let id = ObjectId::new();
        stored.insert(ID_FIELD, id);

        let result = self.inner.insert_one(stored).await?;
        let inserted_id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            _ => id.to_hex(),
        };

        Ok(InsertResult {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError> {
        let filter = match &query.filter {
            Some((field, value)) => doc! { field.as_str(): value.as_str() },
            None => doc! {},
        };

        let mut action = self.inner.find(filter);
        if let Some(field) = &query.sort_descending {
            action = action.sort(doc! { field.as_str(): -1 });
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        let documents: Vec<bson::Document> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(from_bson).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        let found = self.inner.find_one(doc! { ID_FIELD: id }).await?;
        Ok(found.map(from_bson))
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteResult, StoreError> {
        let result = self.inner.delete_one(doc! { ID_FIELD: id }).await?;
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn update_by_id(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, StoreError> {
        if fields.contains_key(ID_FIELD) {
            return Err(StoreError::ImmutableField(ID_FIELD));
        }

        let fields = to_bson(&fields)?;
        let result = self
            .inner
            .update_one(doc! { ID_FIELD: id }, doc! { "$set": fields })
            .await?;

        let upserted_id = result
            .upserted_id
            .map(|id| match id {
                Bson::ObjectId(oid) => Ok(oid.to_hex()),
                other => Err(StoreError::UnsupportedValue(format!("{ID_FIELD}: {other}"))),
            })
            .transpose()?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        })
    }
}
