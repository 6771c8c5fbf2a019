use crate::storage::collection::DocumentCollection;
use crate::storage::document::*;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tokio::sync::RwLock;

/// In-process collection with the same contract as the MongoDB one.
///
/// Documents are kept in insertion order, which doubles as the natural order
/// for unsorted finds. Field names in filters, sorts and updates are dotted
/// paths into nested objects, and an equality filter also matches an array
/// holding the value, as MongoDB does. Numeric path segments are taken as
/// object keys, not array positions.
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

fn has_id(doc: &Document, id: &str) -> bool {
    matches!(doc.get(ID_FIELD), Some(Value::String(s)) if s == id)
}

/// Value at a dotted path.
fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at a dotted path, creating intermediate objects.
///
/// Returns whether the stored value changed.
fn set_path(doc: &mut Document, path: &str, value: Value) -> Result<bool, StoreError> {
    let invalid = || StoreError::UnsupportedValue(path.to_string());

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }
    let (last, parents) = segments.split_last().ok_or_else(invalid)?;

    let mut current = doc;
    for segment in parents {
        current = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Document::new()))
            .as_object_mut()
            .ok_or_else(invalid)?;
    }

    if current.get(*last) == Some(&value) {
        return Ok(false);
    }
    current.insert(last.to_string(), value);
    Ok(true)
}

/// Equality as a MongoDB filter sees it: the field itself, or any element of it.
fn field_equals(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Value::String(s) if s == expected)),
        _ => false,
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut document: Document) -> Result<InsertResult, StoreError> {
        let id = ObjectId::new().to_hex();
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        self.documents.write().await.push(document);

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;

        let mut found: Vec<Document> = documents
            .iter()
            .filter(|doc| match &query.filter {
                Some((field, value)) => field_equals(get_path(doc, field), value),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(field) = &query.sort_descending {
            found.sort_by(|a, b| compare_values(get_path(b, field), get_path(a, field)));
        }

        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }

        Ok(found)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        let id = id.to_hex();
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|doc| has_id(doc, &id)).cloned())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteResult, StoreError> {
        let id = id.to_hex();
        let mut documents = self.documents.write().await;

        let deleted_count = match documents.iter().position(|doc| has_id(doc, &id)) {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn update_by_id(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, StoreError> {
        if fields.contains_key(ID_FIELD) {
            return Err(StoreError::ImmutableField(ID_FIELD));
        }

        let id = id.to_hex();
        let mut documents = self.documents.write().await;

        let (matched_count, modified_count) =
            match documents.iter_mut().find(|doc| has_id(doc, &id)) {
                Some(doc) => {
                    // Applied to a copy so a bad path leaves the document untouched.
                    let mut updated = doc.clone();
                    let mut modified = false;
                    for (path, value) in fields {
                        modified |= set_path(&mut updated, &path, value)?;
                    }
                    *doc = updated;
                    (1, u64::from(modified))
                }
                None => (0, 0),
            };

        Ok(UpdateResult {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_fresh_identifier() {
        let coll = MemoryCollection::new("properties");
        let result = coll
            .insert_one(doc(json!({ "_id": "caller-chosen", "title": "Loft" })))
            .await
            .unwrap();

        assert_ne!(result.inserted_id, "caller-chosen");
        let id = parse_id(&result.inserted_id).unwrap();
        let stored = coll.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored["title"], json!("Loft"));
        assert_eq!(coll.len().await, 1);
    }

    #[tokio::test]
    async fn find_sorts_newest_first_and_limits() {
        let coll = MemoryCollection::new("properties");
        for date in [3, 9, 1, 7, 5, 8, 2, 6] {
            coll.insert_one(doc(json!({ "postedDate": date }))).await.unwrap();
        }

        let latest = coll
            .find(FindQuery::all().newest_first("postedDate").limit(6))
            .await
            .unwrap();
        let dates: Vec<i64> = latest
            .iter()
            .map(|d| d["postedDate"].as_i64().unwrap())
            .collect();
        assert_eq!(dates, vec![9, 8, 7, 6, 5, 3]);
    }

    #[tokio::test]
    async fn find_filters_on_exact_string_match() {
        let coll = MemoryCollection::new("ratings");
        coll.insert_one(doc(json!({ "reviewerEmail": "a@x.com", "stars": 4 }))).await.unwrap();
        coll.insert_one(doc(json!({ "reviewerEmail": "b@x.com", "stars": 2 }))).await.unwrap();
        coll.insert_one(doc(json!({ "stars": 5 }))).await.unwrap();

        let found = coll
            .find(FindQuery::matching("reviewerEmail", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["stars"], json!(4));
    }

    #[tokio::test]
    async fn update_sets_only_supplied_fields() {
        let coll = MemoryCollection::new("properties");
        let inserted = coll
            .insert_one(doc(json!({ "price": 400, "title": "X" })))
            .await
            .unwrap();
        let id = parse_id(&inserted.inserted_id).unwrap();

        let result = coll.update_by_id(id, doc(json!({ "price": 500 }))).await.unwrap();
        assert_eq!((result.matched_count, result.modified_count), (1, 1));

        let again = coll.update_by_id(id, doc(json!({ "price": 500 }))).await.unwrap();
        assert_eq!((again.matched_count, again.modified_count), (1, 0));

        let stored = coll.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored["price"], json!(500));
        assert_eq!(stored["title"], json!("X"));
    }

    #[tokio::test]
    async fn update_writes_dotted_paths_into_nested_objects() {
        let coll = MemoryCollection::new("properties");
        let inserted = coll
            .insert_one(doc(json!({ "address": { "city": "Dhaka", "zip": "1207" } })))
            .await
            .unwrap();
        let id = parse_id(&inserted.inserted_id).unwrap();

        let result = coll
            .update_by_id(id, doc(json!({ "address.city": "Sylhet", "meta.views": 3 })))
            .await
            .unwrap();
        assert_eq!(result.modified_count, 1);

        let stored = coll.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored["address"], json!({ "city": "Sylhet", "zip": "1207" }));
        assert_eq!(stored["meta"], json!({ "views": 3 }));
        assert!(!stored.contains_key("address.city"));
    }

    #[tokio::test]
    async fn update_through_scalar_fails_without_partial_write() {
        let coll = MemoryCollection::new("properties");
        let inserted = coll
            .insert_one(doc(json!({ "price": 400, "title": "X" })))
            .await
            .unwrap();
        let id = parse_id(&inserted.inserted_id).unwrap();

        let err = coll
            .update_by_id(id, doc(json!({ "title": "Y", "price.amount": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedValue(p) if p == "price.amount"));

        let stored = coll.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored["title"], json!("X"));
        assert_eq!(stored["price"], json!(400));
    }

    #[tokio::test]
    async fn filter_matches_array_elements_and_nested_paths() {
        let coll = MemoryCollection::new("properties");
        coll.insert_one(doc(json!({ "owner_email": ["a@x.com", "b@x.com"] }))).await.unwrap();
        coll.insert_one(doc(json!({ "owner_email": "c@x.com" }))).await.unwrap();
        coll.insert_one(doc(json!({ "contact": { "email": "a@x.com" } }))).await.unwrap();

        let shared = coll.find(FindQuery::matching("owner_email", "b@x.com")).await.unwrap();
        assert_eq!(shared.len(), 1);

        let nested = coll.find(FindQuery::matching("contact.email", "a@x.com")).await.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0]["contact"]["email"], json!("a@x.com"));
    }

    #[tokio::test]
    async fn update_rejects_identifier_change() {
        let coll = MemoryCollection::new("properties");
        let inserted = coll.insert_one(doc(json!({ "title": "X" }))).await.unwrap();
        let id = parse_id(&inserted.inserted_id).unwrap();

        let err = coll
            .update_by_id(id, doc(json!({ "_id": ObjectId::new().to_hex() })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ImmutableField("_id")));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let coll = MemoryCollection::new("ratings");
        let inserted = coll.insert_one(doc(json!({ "stars": 3 }))).await.unwrap();
        let id = parse_id(&inserted.inserted_id).unwrap();

        assert_eq!(coll.delete_by_id(id).await.unwrap().deleted_count, 1);
        assert_eq!(coll.delete_by_id(id).await.unwrap().deleted_count, 0);
        assert!(coll.find_by_id(id).await.unwrap().is_none());
    }
}
