use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Document not found")]
    NotFound,

    #[error("File exceeds the {0} byte upload limit")]
    PayloadTooLarge(usize),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ServiceError::NotFound => AppError::NotFound(anyhow::anyhow!("Document not found")),
            e @ ServiceError::PayloadTooLarge(_) => {
                AppError::PayloadTooLarge(anyhow::anyhow!(e.to_string()))
            }
            ServiceError::Store(e) => AppError::DatabaseError(e),
        }
    }
}
