//! Text-to-image generation.

use std::ops::Index;
use std::path::Path;

use imagen_wire::{Struct, ToWireValue, Value};
use serde_json::{json, Map, Value as Json};
use tracing::{debug, info};

use crate::config::{model_path, VisionConfig};
use crate::error::{VisionError, VisionResult};
use crate::image::{Image, ImageStore, LocalImageStore};
use crate::options::{AspectRatio, OutputMimeType, PersonGeneration, SafetyFilterLevel};
use crate::predict::{PredictClient, PredictRequest};

/// Options for [`ImageGenerationModel::generate_images`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateImagesOptions {
    /// What to leave out of the images
    pub negative_prompt: Option<String>,
    /// Number of images to generate (the service accepts 1..=8)
    pub number_of_images: u32,
    /// Requested width; only the larger side is sent as the sample size
    pub width: Option<u32>,
    /// Requested height
    pub height: Option<u32>,
    /// Takes precedence over width/height
    pub aspect_ratio: Option<AspectRatio>,
    /// Prompt strength: 0-9 low, 10-20 medium, 21+ high
    pub guidance_scale: Option<f64>,
    pub output_mime_type: Option<OutputMimeType>,
    /// JPEG compression quality, 0 to 100
    pub compression_quality: Option<f64>,
    /// Prompt language, e.g. `en`, `ja`, or `auto`
    pub language: Option<String>,
    pub safety_filter_level: Option<SafetyFilterLevel>,
    pub person_generation: Option<PersonGeneration>,
}

impl Default for GenerateImagesOptions {
    fn default() -> Self {
        Self {
            negative_prompt: None,
            number_of_images: 1,
            width: None,
            height: None,
            aspect_ratio: None,
            guidance_scale: None,
            output_mime_type: None,
            compression_quality: None,
            language: None,
            safety_filter_level: None,
            person_generation: None,
        }
    }
}

impl GenerateImagesOptions {
    pub fn with_number_of_images(mut self, n: u32) -> Self {
        self.number_of_images = n;
        self
    }

    pub fn with_negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(prompt.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    pub fn with_guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = Some(scale);
        self
    }

    pub fn with_output_mime_type(mut self, mime: OutputMimeType) -> Self {
        self.output_mime_type = Some(mime);
        self
    }

    pub fn with_compression_quality(mut self, quality: f64) -> Self {
        self.compression_quality = Some(quality);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_safety_filter_level(mut self, level: SafetyFilterLevel) -> Self {
        self.safety_filter_level = Some(level);
        self
    }

    pub fn with_person_generation(mut self, policy: PersonGeneration) -> Self {
        self.person_generation = Some(policy);
        self
    }
}

/// An image produced by the model together with the parameters that made it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    image: Option<Image>,
    generation_parameters: Map<String, Json>,
}

impl GeneratedImage {
    pub fn new(image: Option<Image>, generation_parameters: Map<String, Json>) -> Self {
        Self {
            image,
            generation_parameters,
        }
    }

    /// `None` when the service returned no bytes, e.g. a filtered result.
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn generation_parameters(&self) -> &Map<String, Json> {
        &self.generation_parameters
    }

    pub fn save(&self, path: impl AsRef<Path>) -> VisionResult<()> {
        self.save_with(&LocalImageStore, path)
    }

    pub fn save_with(&self, store: &dyn ImageStore, path: impl AsRef<Path>) -> VisionResult<()> {
        self.image
            .as_ref()
            .ok_or(VisionError::MissingImageBytes)?
            .save_with(store, path)
    }
}

/// Images returned by one generation call, in service order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageGenerationResponse {
    pub images: Vec<GeneratedImage>,
}

impl ImageGenerationResponse {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedImage> {
        self.images.iter()
    }
}

impl Index<usize> for ImageGenerationResponse {
    type Output = GeneratedImage;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.images[idx]
    }
}

impl IntoIterator for ImageGenerationResponse {
    type Item = GeneratedImage;
    type IntoIter = std::vec::IntoIter<GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImageGenerationResponse {
    type Item = &'a GeneratedImage;
    type IntoIter = std::slice::Iter<'a, GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

/// Text-to-image model backed by a prediction client.
pub struct ImageGenerationModel<C> {
    model_name: String,
    client: C,
}

impl<C: PredictClient> ImageGenerationModel<C> {
    pub fn new(model_id: &str, client: C) -> Self {
        Self {
            model_name: model_path(model_id),
            client,
        }
    }

    pub fn from_pretrained(model_name: &str, client: C) -> Self {
        Self::new(model_name, client)
    }

    pub fn from_config(config: &VisionConfig, client: C) -> Self {
        Self::new(&config.generation_model, client)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Generate images for a single prompt.
    pub async fn generate_images(
        &self,
        prompt: &str,
        options: &GenerateImagesOptions,
    ) -> VisionResult<ImageGenerationResponse> {
        let (request, shared_parameters) = self.build_request(prompt, options)?;

        debug!(
            "Requesting {} image(s) from {}",
            options.number_of_images, self.model_name
        );
        let response = self.client.predict(request).await?;

        let mut images = Vec::with_capacity(response.predictions.len());
        for (idx, prediction) in response.records()?.into_iter().enumerate() {
            let mut generation_parameters = shared_parameters.clone();
            generation_parameters.insert("index_of_image_in_batch".to_string(), json!(idx));

            let image = match prediction.get("bytesBase64Encoded") {
                None | Some(Json::Null) => None,
                Some(Json::String(encoded)) if encoded.is_empty() => None,
                Some(Json::String(encoded)) => Some(Image::from_base64(encoded)?),
                Some(other) => {
                    return Err(VisionError::invalid_response(format!(
                        "bytesBase64Encoded must be a string, got {}",
                        other
                    )))
                }
            };
            images.push(GeneratedImage::new(image, generation_parameters));
        }

        info!(
            "Generated {} image(s) with {}",
            images.len(),
            self.model_name
        );
        Ok(ImageGenerationResponse { images })
    }

    /// Assemble the predict request and the parameters recorded on each image.
    fn build_request(
        &self,
        prompt: &str,
        options: &GenerateImagesOptions,
    ) -> VisionResult<(PredictRequest, Map<String, Json>)> {
        // Only a single prompt per request is supported by the service.
        let instance = Struct::from_iter([("prompt".to_string(), prompt.to_wire_value()?)]);

        let mut shared = Map::new();
        shared.insert("prompt".to_string(), json!(prompt));
        shared.insert(
            "number_of_images_in_batch".to_string(),
            json!(options.number_of_images),
        );

        let mut parameters = Struct::default();
        let max_size = options.width.unwrap_or(0).max(options.height.unwrap_or(0));
        if let Some(ratio) = options.aspect_ratio {
            parameters.insert("aspectRatio", ratio.as_str().to_wire_value()?);
        } else if max_size > 0 {
            // The service expects the size as a string.
            parameters.insert("sampleImageSize", max_size.to_string().to_wire_value()?);
            if let (Some(width), Some(height)) = (options.width, options.height) {
                if width != height {
                    parameters.insert("aspectRatio", format!("{}:{}", width, height).to_wire_value()?);
                }
            }
        }

        parameters.insert("sampleCount", options.number_of_images.to_wire_value()?);

        if let Some(negative) = options.negative_prompt.as_deref().filter(|s| !s.is_empty()) {
            parameters.insert("negativePrompt", negative.to_wire_value()?);
            shared.insert("negative_prompt".to_string(), json!(negative));
        }

        if let Some(scale) = options.guidance_scale {
            parameters.insert("guidanceScale", scale.to_wire_value()?);
            shared.insert("guidance_scale".to_string(), json!(scale));
        }

        if let Some(language) = &options.language {
            parameters.insert("language", language.to_wire_value()?);
            shared.insert("language".to_string(), json!(language));
        }

        let mut output_options = Struct::default();
        if let Some(mime) = options.output_mime_type {
            output_options.insert("mimeType", mime.as_str().to_wire_value()?);
            shared.insert("mime_type".to_string(), json!(mime.as_str()));
        }
        if let Some(quality) = options.compression_quality {
            output_options.insert("compressionQuality", quality.to_wire_value()?);
            shared.insert("compression_quality".to_string(), json!(quality));
        }
        parameters.insert("outputOptions", Value::StructValue(output_options));

        if let Some(level) = options.safety_filter_level {
            parameters.insert("safetySetting", level.as_str().to_wire_value()?);
            shared.insert("safety_filter_level".to_string(), json!(level.as_str()));
        }

        if let Some(policy) = options.person_generation {
            parameters.insert("personGeneration", policy.as_str().to_wire_value()?);
            shared.insert("person_generation".to_string(), json!(policy.as_str()));
        }

        let request = PredictRequest::new(
            self.model_name.clone(),
            vec![Value::StructValue(instance)],
            parameters,
        );
        Ok((request, shared))
    }
}
