use chrono::{DateTime, Utc};
use mongodb::bson::{spec::BinarySubtype, Binary};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Long-form subtype the legacy service persisted for `.docx` uploads.
const OOXML_WORD_SUBTYPE: &str = "VND.OPENXMLFORMATS-OFFICEDOCUMENT.WORDPROCESSINGML.DOCUMENT";
const OOXML_SHEET_SUBTYPE: &str = "VND.OPENXMLFORMATS-OFFICEDOCUMENT.SPREADSHEETML.SHEET";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "DOC")]
    Doc,
    #[serde(rename = "DOCX")]
    Docx,
    #[serde(rename = "XLS")]
    Xls,
    #[serde(rename = "XLSX")]
    Xlsx,
    #[serde(
        rename = "DOCX_OOXML",
        alias = "VND.OPENXMLFORMATS-OFFICEDOCUMENT.WORDPROCESSINGML.DOCUMENT"
    )]
    DocxOoxml,
    #[serde(rename = "PLAIN")]
    Plain,
}

impl DocumentType {
    /// Derive the type from a MIME string such as `application/pdf` or
    /// `text/plain; charset=utf-8`. The subtype is upper-cased and matched
    /// against the allowed set; `None` means the upload must be rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let (_, subtype) = essence.split_once('/')?;

        match subtype.trim().to_uppercase().as_str() {
            "PDF" => Some(Self::Pdf),
            "DOC" | "MSWORD" => Some(Self::Doc),
            "DOCX" => Some(Self::Docx),
            "XLS" | "VND.MS-EXCEL" => Some(Self::Xls),
            "XLSX" | OOXML_SHEET_SUBTYPE => Some(Self::Xlsx),
            OOXML_WORD_SUBTYPE => Some(Self::DocxOoxml),
            "PLAIN" => Some(Self::Plain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Doc => "DOC",
            Self::Docx => "DOCX",
            Self::Xls => "XLS",
            Self::Xlsx => "XLSX",
            Self::DocxOoxml => "DOCX_OOXML",
            Self::Plain => "PLAIN",
        }
    }

    /// MIME type used when serving the stored bytes back.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx | Self::DocxOoxml => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xls => "application/vnd.ms-excel",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Plain => "text/plain",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable size, kilobytes with two decimals (`2048` bytes -> `"2.00KB"`).
pub fn format_size(byte_len: usize) -> String {
    format!("{:.2}KB", byte_len as f64 / 1024.0)
}

/// A stored document, binary payload included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub size: String,
    pub uploader: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub department: String,
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "fileData")]
    pub file_data: Binary,
}

impl DocumentRecord {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            doc_type: self.doc_type,
            size: self.size.clone(),
            uploader: self.uploader.clone(),
            date: self.date,
            department: self.department.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.file_data.bytes
    }
}

/// The metadata projection of a [`DocumentRecord`]: everything but `fileData`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub size: String,
    pub uploader: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub department: String,
    #[serde(default)]
    pub notes: String,
}

/// A validated upload waiting for the store to assign an id.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: DocumentType,
    pub uploader: String,
    pub department: String,
    pub notes: String,
    pub date: DateTime<Utc>,
    pub file_data: Vec<u8>,
}

impl NewDocument {
    pub fn into_record(self, id: String) -> DocumentRecord {
        DocumentRecord {
            id,
            size: format_size(self.file_data.len()),
            name: self.name,
            doc_type: self.doc_type,
            uploader: self.uploader,
            date: self.date,
            department: self.department,
            notes: self.notes,
            file_data: Binary {
                subtype: BinarySubtype::Generic,
                bytes: self.file_data,
            },
        }
    }
}

/// The only mutable fields of a record. `None` leaves the stored value alone;
/// any other key in the incoming payload is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct UpdateFields {
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "department must not be empty"))]
    pub department: Option<String>,
}

impl UpdateFields {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.department.is_none()
    }
}
