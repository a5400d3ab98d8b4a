use crate::error::ClientError;
use derivative::Derivative;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Success(Value),
    Failure { status: u16, detail: String },
}

impl ResponseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<Value, ClientError> {
        match self {
            ResponseOutcome::Success(value) => Ok(value),
            ResponseOutcome::Failure { status, detail } => Err(ClientError::Status { status, detail }),
        }
    }
}

/// Where the content of a file part lives.
///
/// Cloning never copies the content: in-memory bytes are shared and disk
/// files are only opened when the request is sent.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub enum FileSource {
    Memory(#[derivative(Debug = "ignore")] Arc<[u8]>),
    Disk { path: PathBuf, size: u64 },
}

impl FileSource {
    pub fn size(&self) -> u64 {
        match self {
            FileSource::Memory(bytes) => bytes.len() as u64,
            FileSource::Disk { size, .. } => *size,
        }
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        FileSource::Memory(bytes.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    File {
        field: String,
        file_name: String,
        mime: String,
        source: FileSource,
    },
    Text {
        field: String,
        value: String,
    },
}

impl FormPart {
    pub fn field(&self) -> &str {
        match self {
            FormPart::File { field, .. } | FormPart::Text { field, .. } => field,
        }
    }
}

/// Transport-neutral multipart body, converted to a real form by the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartPayload {
    parts: Vec<FormPart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        source: impl Into<FileSource>,
    ) -> Self {
        self.parts.push(FormPart::File {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            source: source.into(),
        });
        self
    }

    pub fn text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.parts.iter().any(|p| p.field() == field)
    }

    pub fn text_value(&self, field: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            FormPart::Text { field: f, value } if f == field => Some(value.as_str()),
            _ => None,
        })
    }
}
