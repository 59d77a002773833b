use crate::models::{DocumentRecord, DocumentSummary, NewDocument, UpdateFields};
use crate::services::store::DocumentStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use uuid::Uuid;

const DOCUMENTS_COLLECTION: &str = "documents";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for document-registry");

        let documents = self.documents();

        // Department listing sorts by date, so the compound index covers both.
        let department_index = IndexModel::builder()
            .keys(doc! { "department": 1, "date": -1 })
            .options(
                IndexOptions::builder()
                    .name("department_date_lookup".to_string())
                    .build(),
            )
            .build();

        documents
            .create_index(department_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create department index on documents collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on documents.(department, date)");

        let date_index = IndexModel::builder()
            .keys(doc! { "date": -1 })
            .options(IndexOptions::builder().name("date_desc".to_string()).build())
            .build();

        documents.create_index(date_index, None).await.map_err(|e| {
            tracing::error!("Failed to create date index on documents collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on documents.date");

        Ok(())
    }

    /// Full records, `fileData` included.
    pub fn documents(&self) -> Collection<DocumentRecord> {
        self.db.collection(DOCUMENTS_COLLECTION)
    }

    /// Same collection read through the metadata projection.
    fn summaries(&self) -> Collection<DocumentSummary> {
        self.db.collection(DOCUMENTS_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

fn without_file_data() -> Document {
    doc! { "fileData": 0 }
}

fn set_clause(fields: &UpdateFields) -> Document {
    let mut set = Document::new();
    if let Some(notes) = &fields.notes {
        set.insert("notes", notes.as_str());
    }
    if let Some(department) = &fields.department {
        set.insert("department", department.as_str());
    }
    set
}

#[async_trait]
impl DocumentStore for MongoDb {
    async fn insert(&self, document: NewDocument) -> Result<DocumentSummary, anyhow::Error> {
        let record = document.into_record(Uuid::new_v4().to_string());

        self.documents().insert_one(&record, None).await.map_err(|e| {
            tracing::error!(
                document_id = %record.id,
                "Failed to insert document into database: {}",
                e
            );
            anyhow::Error::new(e)
        })?;

        Ok(record.summary())
    }

    async fn list(&self, department: Option<&str>) -> Result<Vec<DocumentSummary>, anyhow::Error> {
        let filter = match department {
            Some(department) => doc! { "department": department },
            None => doc! {},
        };

        let find_options = FindOptions::builder()
            .sort(doc! { "date": -1 })
            .projection(without_file_data())
            .build();

        let cursor = self.summaries().find(filter, find_options).await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, anyhow::Error> {
        Ok(self.documents().find_one(doc! { "_id": id }, None).await?)
    }

    async fn update(
        &self,
        id: &str,
        fields: &UpdateFields,
    ) -> Result<Option<DocumentSummary>, anyhow::Error> {
        let set = set_clause(fields);

        // `$set` with no fields is rejected by the server; nothing to change anyway.
        if set.is_empty() {
            let options = FindOneOptions::builder()
                .projection(without_file_data())
                .build();
            return Ok(self.summaries().find_one(doc! { "_id": id }, options).await?);
        }

        let options = FindOneAndUpdateOptions::builder()
            .projection(without_file_data())
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .summaries()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, anyhow::Error> {
        let result = self.documents().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                anyhow::Error::new(e)
            })?;
        Ok(())
    }
}
