use crate::api::{FileSource, MultipartPayload};
use crate::error::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const FILE_FIELD: &str = "file";
pub const PATIENT_FIELD: &str = "patient_id";
pub const EXERCISE_FIELD: &str = "exercise_id";

/// A user-chosen binary resource, replaced wholesale on every selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub source: FileSource,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            source: bytes.into(),
        }
    }

    /// Describes a file on disk without reading it; the content is streamed
    /// when the upload is sent.
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            mime,
            source: FileSource::Disk {
                path: path.to_path_buf(),
                size,
            },
        })
    }

    pub fn size(&self) -> u64 {
        self.source.size()
    }
}

/// Optional form fields sent along with the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFields {
    pub patient_id: String,
    pub exercise_id: String,
}

impl UploadFields {
    pub fn build_payload(&self, file: &SelectedFile) -> MultipartPayload {
        let mut payload =
            MultipartPayload::new().file(FILE_FIELD, file.name.clone(), file.mime.clone(), file.source.clone());
        if !self.patient_id.is_empty() {
            payload = payload.text(PATIENT_FIELD, self.patient_id.clone());
        }
        if !self.exercise_id.is_empty() {
            payload = payload.text(EXERCISE_FIELD, self.exercise_id.clone());
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Idle,
    AwaitingSelection,
    Submitting,
    Succeeded(Value),
    Failed(String),
}

impl Default for UploadStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Analysis feedback returned by the service. Its shape is not fixed, so
/// fields are probed rather than deserialized.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn repetitions(&self) -> Option<&Value> {
        self.get_field("Repetitions")
    }

    /// Name under which the service stored the video, when it reports one.
    pub fn stored_filename(&self) -> Option<&str> {
        self.get_field("filename")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
