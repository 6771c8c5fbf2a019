use crate::storage::document::{
    DeleteResult, Document, FindQuery, InsertResult, StoreError, UpdateResult,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

/// A named collection of schemaless documents.
///
/// Each method maps to exactly one storage operation.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Insert a document under a freshly generated identifier.
    async fn insert_one(&self, document: Document) -> Result<InsertResult, StoreError>;

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError>;

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteResult, StoreError>;

    /// `$set` the supplied fields on one document, leaving the rest untouched.
    async fn update_by_id(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, StoreError>;
}
