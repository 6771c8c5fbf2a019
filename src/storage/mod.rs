pub mod collection;
pub mod context;
pub mod document;
pub mod memory;
pub mod mongo;

pub use collection::DocumentCollection;
pub use context::{Collections, StorageContext};
pub use document::{
    DeleteResult, Document, FindQuery, InsertResult, StoreError, UpdateResult, parse_id,
};
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;
