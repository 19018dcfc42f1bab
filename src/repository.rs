use std::path::Path;

use tracing::{debug, error, warn};

use crate::{
    classifier::{Classifier, KeywordClassifier},
    doc_id::DocumentId,
    document::{Category, Document, DocumentPatch, NewDocument},
    document_db::DocumentDb,
    error::{Error, Result},
    fuzzy::{SearchHit, Threshold},
    index_sync::IndexSync,
    settings::Settings,
};

/// A document that failed to ingest, with the reason.
#[derive(Debug)]
pub struct IngestFailure {
    pub name: String,
    pub error: Error,
}

/// Outcome of a batch ingestion: one entry per input, split by result.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub created: Vec<Document>,
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.failed.len()
    }
}

/// The document repository: storage, classification and search behind
/// one owned handle.
///
/// Every mutation invalidates the search index after its write commits,
/// and the next search rebuilds it before scoring.
pub struct Repository {
    db: DocumentDb,
    classifier: Box<dyn Classifier>,
    index: IndexSync,
}

impl Repository {
    /// Open (or create) the repository database at `path` with the
    /// default keyword classifier.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: DocumentDb::open(path)?,
            classifier: Box::new(KeywordClassifier::default()),
            index: IndexSync::new(),
        })
    }

    /// Replace the classifier used by [`Repository::ingest`].
    pub fn with_classifier(
        mut self,
        classifier: impl Classifier + 'static,
    ) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// The underlying store, for settings writes and raw inspection.
    pub fn store(&self) -> &DocumentDb {
        &self.db
    }

    /// Stored search settings, with defaults for unset keys.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.db)
    }

    pub fn classify(&self, text: &str) -> Category {
        self.classifier.classify(text)
    }

    pub fn create(&self, new: NewDocument) -> Result<Document> {
        let doc = self.db.create(new)?;
        self.index.invalidate();
        Ok(doc)
    }

    pub fn get(&self, id: DocumentId) -> Result<Document> {
        self.db.get(id)
    }

    /// Every document, in insertion order.
    pub fn list(&self) -> Result<Vec<Document>> {
        self.db.list()
    }

    pub fn list_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Document>> {
        self.db.list_by_category(category)
    }

    pub fn count(&self) -> Result<u64> {
        self.db.count()
    }

    /// Document count per category, every category listed.
    pub fn count_by_category(&self) -> Result<Vec<(Category, usize)>> {
        self.db.count_by_category()
    }

    pub fn update(
        &self,
        id: DocumentId,
        patch: DocumentPatch,
    ) -> Result<Document> {
        let doc = self.db.update(id, patch)?;
        self.index.invalidate();
        Ok(doc)
    }

    pub fn delete(&self, id: DocumentId) -> Result<Document> {
        let doc = self.db.delete(id)?;
        self.index.invalidate();
        Ok(doc)
    }

    /// Classify `text` and store it under `name`.
    pub fn ingest(&self, name: &str, text: &str) -> Result<Document> {
        let category = self.classifier.classify(text);
        debug!(name, %category, "classified document");
        self.create(NewDocument {
            title: name.to_string(),
            category,
            content: text.to_string(),
        })
    }

    /// Ingest each `(name, text)` pair independently. A failing item is
    /// recorded and the rest of the batch continues.
    pub fn ingest_batch<I, N, T>(&self, items: I) -> IngestReport
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut report = IngestReport::default();
        for (name, text) in items {
            let name = name.as_ref();
            match self.ingest(name, text.as_ref()) {
                Ok(doc) => report.created.push(doc),
                Err(error) => {
                    if error.is_storage_fault() {
                        error!(name, %error, "storage rejected document");
                    } else {
                        warn!(name, %error, "failed to ingest document");
                    }
                    report.failed.push(IngestFailure {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    /// Rank documents against `query`. An empty query lists everything.
    pub fn search(
        &self,
        query: &str,
        threshold: Threshold,
    ) -> Result<Vec<SearchHit>> {
        let index = self.index.snapshot(&self.db)?;
        let hits = index.search(query, threshold);
        debug!(
            query,
            threshold = threshold.get(),
            hits = hits.len(),
            "searched"
        );
        Ok(hits)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("db", &self.db)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
