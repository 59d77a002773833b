use crate::models::{DocumentRecord, DocumentSummary, NewDocument, UpdateFields};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Persistence seam for document records.
///
/// Implementations own id assignment, ordering and single-document
/// atomicity. Reads that return [`DocumentSummary`] must not load `fileData`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, document: NewDocument) -> Result<DocumentSummary, anyhow::Error>;

    /// All records, or those of one department, newest `date` first.
    async fn list(&self, department: Option<&str>) -> Result<Vec<DocumentSummary>, anyhow::Error>;

    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, anyhow::Error>;

    /// Applies `fields` and returns the updated summary, `None` if no record matched.
    async fn update(
        &self,
        id: &str,
        fields: &UpdateFields,
    ) -> Result<Option<DocumentSummary>, anyhow::Error>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, anyhow::Error>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

pub(crate) fn newest_first(documents: &mut [DocumentSummary]) {
    documents.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Process-local store used by tests and local runs without MongoDB.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<String, DocumentRecord>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, DocumentRecord>>, anyhow::Error> {
        self.documents
            .lock()
            .map_err(|e| anyhow::anyhow!("In-memory store mutex poisoned: {}", e))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: NewDocument) -> Result<DocumentSummary, anyhow::Error> {
        let record = document.into_record(Uuid::new_v4().to_string());
        let summary = record.summary();
        self.lock()?.insert(record.id.clone(), record);
        Ok(summary)
    }

    async fn list(&self, department: Option<&str>) -> Result<Vec<DocumentSummary>, anyhow::Error> {
        let mut documents: Vec<DocumentSummary> = self
            .lock()?
            .values()
            .filter(|doc| department.map_or(true, |d| doc.department == d))
            .map(DocumentRecord::summary)
            .collect();
        newest_first(&mut documents);
        Ok(documents)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, anyhow::Error> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        fields: &UpdateFields,
    ) -> Result<Option<DocumentSummary>, anyhow::Error> {
        let mut documents = self.lock()?;
        let Some(record) = documents.get_mut(id) else {
            return Ok(None);
        };

        if let Some(notes) = &fields.notes {
            record.notes = notes.clone();
        }
        if let Some(department) = &fields.department {
            record.department = department.clone();
        }

        Ok(Some(record.summary()))
    }

    async fn delete(&self, id: &str) -> Result<bool, anyhow::Error> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.lock().map(|_| ())
    }
}
