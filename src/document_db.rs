use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableMultimapTable,
    ReadableTable, ReadableTableMetadata, TableDefinition,
};
use tracing::{debug, info, warn};

use crate::{
    doc_id::DocumentId,
    document::{Category, Document, DocumentPatch, NewDocument},
    error::{Error, Result},
};

const DOCUMENTS: TableDefinition<u64, &[u8]> =
    TableDefinition::new("documents");
const CATEGORIES: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("categories");
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

const NEXT_ID: &str = "next_document_id";

/// Durable document storage backed by a single redb file.
///
/// Every mutation runs in its own write transaction. redb admits one
/// writer at a time, which also serializes identifier assignment.
pub struct DocumentDb {
    db: Database,
}

impl DocumentDb {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(DOCUMENTS)?;
        txn.open_multimap_table(CATEGORIES)?;
        txn.open_table(COUNTERS)?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    // -- Documents --

    /// Persist a new document, assigning its id and creation time.
    pub fn create(&self, new: NewDocument) -> Result<Document> {
        new.validate()?;

        let txn = self.db.begin_write()?;
        let doc = {
            let mut counters = txn.open_table(COUNTERS)?;
            let next = counters.get(NEXT_ID)?.map(|v| v.value()).unwrap_or(1);
            counters.insert(NEXT_ID, next + 1)?;

            let doc = Document {
                id: DocumentId::new(next),
                title: new.title,
                category: new.category,
                content: new.content,
                created_at: now_millis(),
            };

            let mut documents = txn.open_table(DOCUMENTS)?;
            documents.insert(next, serde_json::to_vec(&doc)?.as_slice())?;

            let mut categories = txn.open_multimap_table(CATEGORIES)?;
            categories.insert(doc.category.as_str(), next)?;
            doc
        };
        txn.commit()?;

        info!(
            id = %doc.id,
            title = %doc.title,
            category = %doc.category,
            "created document"
        );
        Ok(doc)
    }

    pub fn get(&self, id: DocumentId) -> Result<Document> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let bytes = table
            .get(id.get())?
            .map(|v| v.value().to_vec())
            .ok_or_else(|| not_found(id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// All live documents in insertion order.
    pub fn list(&self) -> Result<Vec<Document>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_k, v) = entry?;
            result.push(serde_json::from_slice(v.value())?);
        }
        debug!(count = result.len(), "listed documents");
        Ok(result)
    }

    /// Documents of one category, via the secondary index.
    pub fn list_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Document>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_multimap_table(CATEGORIES)?;
        let documents = txn.open_table(DOCUMENTS)?;

        let mut result = Vec::new();
        for id in index.get(category.as_str())? {
            let id = id?.value();
            let Some(bytes) = documents.get(id)?.map(|v| v.value().to_vec())
            else {
                warn!(
                    id,
                    %category,
                    "category index points at a missing document"
                );
                continue;
            };
            result.push(serde_json::from_slice(&bytes)?);
        }
        Ok(result)
    }

    pub fn count(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        Ok(table.len()?)
    }

    /// Number of documents per category, in [`Category::ALL`] order.
    pub fn count_by_category(&self) -> Result<Vec<(Category, usize)>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_multimap_table(CATEGORIES)?;
        let mut result = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let mut count = 0;
            for id in index.get(category.as_str())? {
                id?;
                count += 1;
            }
            result.push((category, count));
        }
        Ok(result)
    }

    /// Merge `patch` into the stored document and return the result.
    pub fn update(
        &self,
        id: DocumentId,
        patch: DocumentPatch,
    ) -> Result<Document> {
        patch.validate()?;

        let txn = self.db.begin_write()?;
        let doc = {
            let mut documents = txn.open_table(DOCUMENTS)?;
            let bytes = documents
                .get(id.get())?
                .map(|v| v.value().to_vec())
                .ok_or_else(|| not_found(id))?;
            let mut doc: Document = serde_json::from_slice(&bytes)?;
            let previous = doc.category;

            patch.apply(&mut doc);
            documents.insert(id.get(), serde_json::to_vec(&doc)?.as_slice())?;

            if doc.category != previous {
                let mut categories = txn.open_multimap_table(CATEGORIES)?;
                categories.remove(previous.as_str(), id.get())?;
                categories.insert(doc.category.as_str(), id.get())?;
            }
            doc
        };
        txn.commit()?;

        info!(%id, "updated document");
        Ok(doc)
    }

    /// Remove a document. Deleting an id that is not stored is an error,
    /// including a second delete of the same id.
    pub fn delete(&self, id: DocumentId) -> Result<Document> {
        let txn = self.db.begin_write()?;
        let doc = {
            let mut documents = txn.open_table(DOCUMENTS)?;
            let bytes = documents
                .remove(id.get())?
                .map(|v| v.value().to_vec())
                .ok_or_else(|| not_found(id))?;
            let doc: Document = serde_json::from_slice(&bytes)?;

            let mut categories = txn.open_multimap_table(CATEGORIES)?;
            categories.remove(doc.category.as_str(), id.get())?;
            doc
        };
        txn.commit()?;

        info!(%id, "deleted document");
        Ok(doc)
    }

    // -- Settings --

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn remove_setting(&self, key: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SETTINGS)?;
            table.remove(key)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_settings(&self) -> Result<Vec<(String, String)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            result.push((k.value().to_string(), v.value().to_string()));
        }
        Ok(result)
    }
}

impl std::fmt::Debug for DocumentDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDb").finish_non_exhaustive()
    }
}

fn not_found(id: DocumentId) -> Error {
    Error::NotFound {
        kind: "document",
        name: id.to_string(),
    }
}

#[cfg(test)]
impl DocumentDb {
    /// Write raw record bytes, bypassing encoding and the category index.
    pub(crate) fn insert_raw(&self, id: u64, bytes: &[u8]) {
        let txn = self.db.begin_write().unwrap();
        txn.open_table(DOCUMENTS).unwrap().insert(id, bytes).unwrap();
        txn.commit().unwrap();
    }

    pub(crate) fn delete_raw(&self, id: u64) {
        let txn = self.db.begin_write().unwrap();
        txn.open_table(DOCUMENTS).unwrap().remove(id).unwrap();
        txn.commit().unwrap();
    }

    pub(crate) fn index_raw(&self, category: Category, id: u64) {
        let txn = self.db.begin_write().unwrap();
        txn.open_multimap_table(CATEGORIES)
            .unwrap()
            .insert(category.as_str(), id)
            .unwrap();
        txn.commit().unwrap();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
