pub mod color_map;
pub mod config;
pub mod errors;
pub mod model;
pub mod preprocess;
pub mod server;
pub mod service;
pub mod traits;

pub mod mocks;

pub use config::Config;
pub use errors::{LunarSegError, Result};
pub use model::Model;
pub use service::InferenceService;
pub use traits::SegmentationModel;
