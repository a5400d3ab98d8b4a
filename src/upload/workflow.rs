use super::preview::{PreviewHandle, PreviewStore};
use super::types::{AnalysisResult, SelectedFile, UploadFields, UploadStatus};
use crate::api::{Api, MultipartPayload, ResponseOutcome, UPLOAD_PATH};
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SELECT_FIRST_MESSAGE: &str = "Selecione um arquivo primeiro.";

/// Single-file upload state machine.
///
/// Holds at most one selected file and at most one live preview derived
/// from it. The preview is released whenever the file changes, when the
/// upload succeeds, and when the workflow is dropped.
pub struct UploadWorkflow {
    previews: Arc<dyn PreviewStore>,
    file: Option<SelectedFile>,
    preview: Option<PreviewHandle>,
    status: UploadStatus,
    notice: Option<String>,
    analysis: Option<AnalysisResult>,
}

impl UploadWorkflow {
    pub fn new(previews: Arc<dyn PreviewStore>) -> Self {
        Self {
            previews,
            file: None,
            preview: None,
            status: UploadStatus::Idle,
            notice: None,
            analysis: None,
        }
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status, UploadStatus::Submitting)
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_submitting()
    }

    pub fn status_text(&self) -> String {
        if let Some(notice) = &self.notice {
            return notice.clone();
        }
        match &self.status {
            UploadStatus::Idle | UploadStatus::AwaitingSelection => String::new(),
            UploadStatus::Submitting => "Enviando...".to_string(),
            UploadStatus::Succeeded(response) => {
                format!("Upload concluído: {}", response_filename(response))
            }
            UploadStatus::Failed(message) => format!("Erro: {}", message),
        }
    }

    pub fn select(&mut self, file: SelectedFile) {
        if self.is_submitting() {
            warn!(name = %file.name, "selection ignored while an upload is in flight");
            return;
        }

        self.release_preview();
        match self.previews.create(&file) {
            Ok(handle) => self.preview = Some(handle),
            Err(e) => warn!(name = %file.name, error = %e, "could not create preview"),
        }

        info!(name = %file.name, mime = %file.mime, size = file.size(), "file selected");
        self.file = Some(file);
        self.status = UploadStatus::AwaitingSelection;
        self.notice = None;
        self.analysis = None;
    }

    /// Drops the current selection, e.g. when the picker is dismissed.
    pub fn clear_selection(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.release_preview();
        self.file = None;
        self.status = UploadStatus::Idle;
        self.notice = None;
        self.analysis = None;
    }

    /// Moves to `Submitting` and returns the payload to send, or `None` when
    /// there is nothing to send or an upload is already in flight.
    pub fn begin_submit(&mut self, fields: &UploadFields) -> Option<MultipartPayload> {
        if self.is_submitting() {
            warn!("submit ignored: upload already in flight");
            return None;
        }

        let Some(file) = &self.file else {
            self.notice = Some(SELECT_FIRST_MESSAGE.to_string());
            return None;
        };

        let payload = fields.build_payload(file);
        info!(name = %file.name, "submitting upload");
        self.status = UploadStatus::Submitting;
        self.notice = None;
        Some(payload)
    }

    pub fn finish_submit(&mut self, result: Result<ResponseOutcome>) {
        if !self.is_submitting() {
            warn!("upload result arrived with no upload in flight");
            return;
        }

        match result {
            Ok(ResponseOutcome::Success(response)) => {
                info!(filename = %response_filename(&response), "upload succeeded");
                self.analysis = response
                    .get("analysis")
                    .filter(|a| !a.is_null())
                    .cloned()
                    .map(AnalysisResult::new);
                self.status = UploadStatus::Succeeded(response);
                self.file = None;
                self.release_preview();
            }
            Ok(ResponseOutcome::Failure { status, detail }) => {
                error!(status, %detail, "upload failed");
                self.status = UploadStatus::Failed(detail);
            }
            Err(e) => {
                error!(error = %e, "upload failed");
                self.status = UploadStatus::Failed(e.to_string());
            }
        }
    }

    pub async fn submit<A>(&mut self, api: &A, fields: &UploadFields)
    where
        A: Api + ?Sized,
    {
        let Some(payload) = self.begin_submit(fields) else {
            return;
        };
        let result = api.post_multipart(UPLOAD_PATH, payload).await;
        self.finish_submit(result);
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.previews.revoke(handle);
        }
    }
}

impl Drop for UploadWorkflow {
    fn drop(&mut self) {
        self.release_preview();
    }
}

fn response_filename(response: &Value) -> String {
    match response.get("filename") {
        Some(Value::String(name)) => name.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => String::new(),
    }
}
