//! docshelf - a local document shelf with fuzzy search.
//!
//! docshelf imports free-text documents, sorts each into a category
//! (`rules`, `cases` or `concepts`), stores them in a
//! [redb](https://github.com/cberner/redb) database and finds them again
//! with an approximate search that tolerates typos.
//!
//! # Quick start
//!
//! ```no_run
//! use docshelf::{DataDir, Repository, Threshold};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let repo = Repository::open(&data_dir.documents_db()).unwrap();
//!
//! repo.ingest("A.txt", "contains rule text").unwrap();
//! repo.ingest("B.txt", "contains case text").unwrap();
//!
//! let hits = repo.search("cades", Threshold::default()).unwrap();
//! for hit in &hits {
//!     let doc = &hit.document;
//!     println!("{} {} ({:?})", doc.id, doc.title, hit.score);
//! }
//! ```

pub mod classifier;
pub mod cli;
pub mod context;
pub mod data_dir;
pub mod doc_id;
pub mod document;
pub mod document_db;
pub mod error;
pub mod fuzzy;
pub mod index_sync;
pub mod ingestion;
pub mod repository;
pub mod search;
pub mod settings;
pub mod text_util;
pub mod walker;

pub use classifier::{Classifier, KeywordClassifier};
pub use data_dir::DataDir;
pub use doc_id::DocumentId;
pub use document::{Category, Document, DocumentPatch, NewDocument};
pub use document_db::DocumentDb;
pub use error::{Error, Result};
pub use fuzzy::{FuzzyIndex, MatchField, SearchHit, Threshold};
pub use repository::{IngestFailure, IngestReport, Repository};
pub use settings::Settings;
