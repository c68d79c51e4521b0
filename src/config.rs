use clap::Parser;
use std::path::PathBuf;

/// Default CORS allow-list entry: the deployed browser UI.
const DEFAULT_UI_ORIGIN: &str = "https://segmend-moon-terrain.streamlit.app";

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the segmentation model in ONNX format
    #[arg(short, long, default_value = "model/lunar_model.onnx")]
    pub model_path: PathBuf,

    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// GPU device id for the CUDA/TensorRT execution providers
    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    /// Origin allowed to call the API cross-origin; repeatable
    #[arg(long = "allowed-origin", default_value = DEFAULT_UI_ORIGIN)]
    pub allowed_origins: Vec<String>,

    /// Upper bound on uploaded request bodies, in mebibytes
    #[arg(long, default_value_t = 25)]
    pub max_upload_mb: usize,
}

impl Config {
    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}
