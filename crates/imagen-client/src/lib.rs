//! Image generation client for the prediction API.
//!
//! This crate provides:
//! - `ImageGenerationModel` for text-to-image requests
//! - Watermark verification of generated images
//! - `Image` with a pluggable byte store
//! - The `PredictClient` seam for the remote call
//!
//! Transport, retries and image codecs are left to the collaborators.

pub mod config;
pub mod error;
pub mod generation;
pub mod image;
pub mod options;
pub mod predict;
pub mod watermark;

pub use config::VisionConfig;
pub use error::{VisionError, VisionResult};
pub use generation::{
    GenerateImagesOptions, GeneratedImage, ImageGenerationModel, ImageGenerationResponse,
};
pub use image::{Image, ImageStore, LocalImageStore};
pub use options::{AspectRatio, OutputMimeType, PersonGeneration, SafetyFilterLevel};
pub use predict::{PredictClient, PredictRequest, PredictResponse};
pub use watermark::{check_watermark, CheckWatermarkResult};
