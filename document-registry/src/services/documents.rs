use crate::models::{DocumentRecord, DocumentSummary, DocumentType, NewDocument, UpdateFields};
use crate::services::{metrics, DocumentStore, ServiceError};
use chrono::Utc;
use std::sync::Arc;

/// A file part as received from the client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Raw upload form. Everything is optional here so that validation happens
/// in one place, [`DocumentService::create`].
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
    pub uploader: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

/// What a download needs to build a file response.
#[derive(Debug, Clone)]
pub struct DocumentDownload {
    pub file_data: Vec<u8>,
    pub file_name: String,
    pub file_type: DocumentType,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, upload: UploadRequest) -> Result<DocumentSummary, ServiceError> {
        let Some(file) = upload.file else {
            metrics::record_upload_rejected("missing_file");
            return Err(ServiceError::Validation("No file uploaded".to_string()));
        };

        if file.data.is_empty() {
            metrics::record_upload_rejected("empty_file");
            return Err(ServiceError::Validation("Uploaded file is empty".to_string()));
        }

        if file.file_name.trim().is_empty() {
            metrics::record_upload_rejected("missing_name");
            return Err(ServiceError::Validation("File name is required".to_string()));
        }

        let (Some(uploader), Some(department)) =
            (non_blank(upload.uploader), non_blank(upload.department))
        else {
            metrics::record_upload_rejected("missing_fields");
            return Err(ServiceError::Validation(
                "Uploader and department are required".to_string(),
            ));
        };

        let Some(doc_type) = DocumentType::from_mime(&file.content_type) else {
            metrics::record_upload_rejected("invalid_type");
            tracing::warn!(
                file_name = %file.file_name,
                content_type = %file.content_type,
                "Rejected upload with unsupported file type"
            );
            return Err(ServiceError::Validation("Invalid file type".to_string()));
        };

        let document = NewDocument {
            name: file.file_name,
            doc_type,
            uploader,
            department,
            notes: upload.notes.unwrap_or_default(),
            date: Utc::now(),
            file_data: file.data,
        };

        let created = self.store.insert(document).await?;

        metrics::record_upload(doc_type);
        tracing::info!(
            document_id = %created.id,
            name = %created.name,
            doc_type = %created.doc_type,
            size = %created.size,
            department = %created.department,
            "Document uploaded"
        );

        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<DocumentSummary>, ServiceError> {
        Ok(self.store.list(None).await?)
    }

    pub async fn list_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<DocumentSummary>, ServiceError> {
        Ok(self.store.list(Some(department)).await?)
    }

    pub async fn get(&self, id: &str) -> Result<DocumentRecord, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn update(
        &self,
        id: &str,
        fields: UpdateFields,
    ) -> Result<DocumentSummary, ServiceError> {
        if fields
            .department
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(ServiceError::Validation(
                "department must not be empty".to_string(),
            ));
        }

        let updated = self
            .store
            .update(id, &fields)
            .await?
            .ok_or(ServiceError::NotFound)?;

        tracing::info!(
            document_id = %id,
            notes_changed = fields.notes.is_some(),
            department_changed = fields.department.is_some(),
            "Document updated"
        );

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound);
        }

        metrics::record_delete();
        tracing::info!(document_id = %id, "Document deleted");
        Ok(())
    }

    pub async fn download(&self, id: &str) -> Result<DocumentDownload, ServiceError> {
        let record = self.get(id).await?;
        Ok(DocumentDownload {
            file_data: record.file_data.bytes,
            file_name: record.name,
            file_type: record.doc_type,
        })
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(self.store.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryDocumentStore;

    fn service() -> (DocumentService, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (DocumentService::new(store.clone()), store)
    }

    fn upload(content_type: &str, len: usize) -> UploadRequest {
        UploadRequest {
            file: Some(UploadedFile {
                file_name: "report.pdf".to_string(),
                content_type: content_type.to_string(),
                data: vec![7; len],
            }),
            uploader: Some("alice".to_string()),
            department: Some("finance".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_derives_type_and_size() {
        let (service, _) = service();

        let created = service.create(upload("application/pdf", 2048)).await.unwrap();

        assert_eq!(created.doc_type, DocumentType::Pdf);
        assert_eq!(created.size, "2.00KB");
        assert_eq!(created.notes, "");
        assert_eq!(created.name, "report.pdf");
    }

    #[tokio::test]
    async fn create_rejects_missing_file() {
        let (service, store) = service();
        let mut request = upload("application/pdf", 10);
        request.file = None;

        let err = service.create(request).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(ref m) if m == "No file uploaded"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let (service, store) = service();

        let mut no_uploader = upload("application/pdf", 10);
        no_uploader.uploader = None;
        let mut blank_department = upload("application/pdf", 10);
        blank_department.department = Some("  ".to_string());

        for request in [no_uploader, blank_department] {
            let err = service.create(request).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_file_and_blank_name() {
        let (service, store) = service();

        let empty = upload("application/pdf", 0);
        let mut unnamed = upload("application/pdf", 10);
        if let Some(file) = unnamed.file.as_mut() {
            file.file_name = " ".to_string();
        }

        let err = service.create(empty).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Uploaded file is empty"));

        let err = service.create(unnamed).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "File name is required"));

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_disallowed_type() {
        let (service, store) = service();

        let err = service.create(upload("image/png", 10)).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Invalid file type"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_rejects_blank_department() {
        let (service, _) = service();
        let created = service.create(upload("application/pdf", 10)).await.unwrap();

        let err = service
            .update(
                &created.id,
                UpdateFields {
                    notes: None,
                    department: Some(" ".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn download_returns_bytes_name_and_type() {
        let (service, _) = service();
        let created = service.create(upload("application/pdf", 3)).await.unwrap();

        let download = service.download(&created.id).await.unwrap();

        assert_eq!(download.file_data, vec![7, 7, 7]);
        assert_eq!(download.file_name, "report.pdf");
        assert_eq!(download.file_type, DocumentType::Pdf);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let (service, _) = service();

        assert!(matches!(service.get("nope").await, Err(ServiceError::NotFound)));
        assert!(matches!(service.delete("nope").await, Err(ServiceError::NotFound)));
        assert!(matches!(
            service.update("nope", UpdateFields::default()).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(service.download("nope").await, Err(ServiceError::NotFound)));
    }
}
