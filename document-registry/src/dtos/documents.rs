use crate::models::{DocumentRecord, DocumentSummary, DocumentType};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// JSON shape of a record. `fileData` (base64) is only present on the
/// single-record fetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub size: String,
    pub uploader: String,
    pub date: String,
    pub department: String,
    pub notes: String,
    #[serde(rename = "fileData", default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
}

impl From<DocumentSummary> for DocumentResponse {
    fn from(doc: DocumentSummary) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            doc_type: doc.doc_type,
            size: doc.size,
            uploader: doc.uploader,
            date: doc.date.to_rfc3339(),
            department: doc.department,
            notes: doc.notes,
            file_data: None,
        }
    }
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(doc: DocumentRecord) -> Self {
        let file_data = STANDARD.encode(doc.bytes());
        Self {
            file_data: Some(file_data),
            ..Self::from(doc.summary())
        }
    }
}
