mod state;
mod ui;

use crate::api::{Api, HEALTH_PATH, ITEMS_PATH, UPLOAD_PATH};
use crate::config::Config;
use crate::error::ClientError;
use crate::upload::{SelectedFile, TempFilePreviewStore, UploadWorkflow};
use eframe::{egui, App};
use std::future::Future;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

pub use state::{
    health_text, sum_text, AppState, Item, ItemForm, SumForm, UiMessage, LOADING_TEXT, SUM_MISSING_TEXT,
};

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "avi", "mkv", "webm", "m4v"];

pub struct FisioUploader {
    config: Config,
    api: Arc<dyn Api>,
    runtime: Runtime,
    state: AppState,
    sender: std_mpsc::Sender<UiMessage>,
    receiver: std_mpsc::Receiver<UiMessage>,
}

impl FisioUploader {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, api: Arc<dyn Api>, runtime: Runtime) -> Self {
        info!(api_url = %config.api_url, "initializing uploader");
        let app = Self::with_api(config, api, runtime);
        app.check_health(&cc.egui_ctx);
        app
    }

    pub fn with_api(config: Config, api: Arc<dyn Api>, runtime: Runtime) -> Self {
        let (sender, receiver) = std_mpsc::channel();
        let workflow = UploadWorkflow::new(Arc::new(TempFilePreviewStore::new()));
        Self {
            config,
            api,
            runtime,
            state: AppState::new(workflow),
            sender,
            receiver,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn dispatch<F>(&self, ctx: &egui::Context, task: F)
    where
        F: Future<Output = UiMessage> + Send + 'static,
    {
        let sender = self.sender.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let message = task.await;
            if sender.send(message).is_err() {
                debug!("window closed before the response arrived");
            }
            ctx.request_repaint();
        });
    }

    pub fn check_health(&self, ctx: &egui::Context) {
        let api = self.api.clone();
        self.dispatch(ctx, async move { UiMessage::Health(api.get_json(HEALTH_PATH).await) });
    }

    pub fn request_sum(&mut self, ctx: &egui::Context) {
        let Some(path) = self.state.sum_form.query_path() else {
            self.state.sum_result = SUM_MISSING_TEXT.to_string();
            return;
        };

        self.state.sum_pending = true;
        let api = self.api.clone();
        self.dispatch(ctx, async move { UiMessage::Sum(api.get_json(&path).await) });
    }

    pub fn create_item(&mut self, ctx: &egui::Context) {
        let Some(item) = self.state.item_form.to_item() else {
            return;
        };

        let body = match serde_json::to_value(&item) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "could not encode item");
                return;
            }
        };

        self.state.item_pending = true;
        let api = self.api.clone();
        self.dispatch(ctx, async move {
            let result = api.post_json(ITEMS_PATH, &body).await;
            UiMessage::ItemCreated { item, result }
        });
    }

    pub fn pick_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Vídeo", &VIDEO_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        // metadata only; the content is streamed by the upload task
        match SelectedFile::from_path(&path) {
            Ok(file) => {
                self.state.error_message = None;
                self.state.workflow.select(file);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not read selected file");
                self.state.error_message = Some(format!("Não foi possível ler {}: {}", path.display(), e));
            }
        }
    }

    pub fn start_upload(&mut self, ctx: &egui::Context) {
        let Some(payload) = self.state.workflow.begin_submit(&self.state.upload_fields) else {
            return;
        };

        let api = self.api.clone();
        self.dispatch(ctx, async move {
            UiMessage::Upload(api.post_multipart(UPLOAD_PATH, payload).await)
        });
    }

    pub fn open_preview(&mut self) {
        let Some(preview) = self.state.workflow.preview() else {
            return;
        };
        if let Err(e) = open::that(preview.url()) {
            error!(url = %preview.url(), error = %e, "could not open preview");
            self.state.error_message = Some(ClientError::Preview(e.to_string()).to_string());
        }
    }

    pub fn update_state(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            self.state.apply(message);
        }
    }
}

impl App for FisioUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state();
        self.render(ctx);
    }
}
