mod preview;
mod types;
mod workflow;

pub use preview::{PreviewHandle, PreviewStore, TempFilePreviewStore};
pub use types::{
    AnalysisResult, SelectedFile, UploadFields, UploadStatus, EXERCISE_FIELD, FILE_FIELD, PATIENT_FIELD,
};
pub use workflow::{UploadWorkflow, SELECT_FIRST_MESSAGE};
