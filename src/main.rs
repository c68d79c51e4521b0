use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use clap::Parser;

use lunar_seg_rs::server::{startup, AppState};
use lunar_seg_rs::{Config, InferenceService, Model};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure!(config.model_path.exists(), "Model path does not exist");

    let model = Model::new(&config.model_path, config.device_id)
        .with_context(|| format!("Failed to load model: {}", config.model_path.display()))?;
    let state = AppState::new(
        InferenceService::new(Arc::new(model)),
        config.max_upload_bytes(),
    );

    actix_web::rt::System::new().block_on(startup(config, state))?;

    Ok(())
}
