//! Client configuration.

/// Default image generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "imagegeneration@002";

/// Default watermark verification model.
pub const DEFAULT_WATERMARK_MODEL: &str = "models/image-verification-001";

/// Configuration for the vision client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionConfig {
    /// Model used by `ImageGenerationModel::from_config`
    pub generation_model: String,
    /// Model used for watermark verification
    pub watermark_model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            watermark_model: DEFAULT_WATERMARK_MODEL.to_string(),
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            generation_model: std::env::var("IMAGEN_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            watermark_model: std::env::var("IMAGEN_WATERMARK_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WATERMARK_MODEL.to_string()),
        }
    }
}

/// Prefix a model id with `models/` unless it already has it.
pub fn model_path(model_id: &str) -> String {
    if model_id.starts_with("models/") {
        model_id.to_string()
    } else {
        format!("models/{}", model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = VisionConfig::default();
        assert_eq!(config.generation_model, "imagegeneration@002");
        assert_eq!(config.watermark_model, "models/image-verification-001");
    }

    #[test]
    fn test_model_path() {
        assert_eq!(model_path("imagegeneration@002"), "models/imagegeneration@002");
        assert_eq!(model_path("models/image-verification-001"), "models/image-verification-001");
    }
}
