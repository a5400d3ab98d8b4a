use fisio_uploader::api::{Api, RequestClient};
use fisio_uploader::app::FisioUploader;
use fisio_uploader::config::Config;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env in the working directory first, then one level up
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,fisio_uploader=info")),
        )
        .init();

    let config = Config::from_env()?;
    let api: Arc<dyn Api> = Arc::new(RequestClient::new(&config)?);
    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 760.0])
            .with_min_inner_size([420.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fisio Uploader",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| -> Box<dyn eframe::App> {
            Box::new(FisioUploader::new(cc, config, api, runtime))
        }),
    )?;

    Ok(())
}
