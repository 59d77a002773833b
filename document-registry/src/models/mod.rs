pub mod document;

pub use document::{
    format_size, DocumentRecord, DocumentSummary, DocumentType, NewDocument, UpdateFields,
};
