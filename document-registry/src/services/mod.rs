pub mod database;
pub mod documents;
pub mod error;
pub mod metrics;
pub mod store;

pub use database::MongoDb;
pub use documents::{DocumentDownload, DocumentService, UploadRequest, UploadedFile};
pub use error::ServiceError;
pub use metrics::{get_metrics, init_metrics};
pub use store::{DocumentStore, InMemoryDocumentStore};
