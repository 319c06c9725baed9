//! Watermark verification.

use std::fmt;

use imagen_wire::{Struct, Value};
use serde_json::Value as Json;
use tracing::debug;

use crate::config::{model_path, VisionConfig, DEFAULT_WATERMARK_MODEL};
use crate::error::{VisionError, VisionResult};
use crate::image::Image;
use crate::predict::{PredictClient, PredictRequest};

/// Ask the verification model whether `image` carries a generated-content
/// watermark.
pub async fn check_watermark<C: PredictClient + ?Sized>(
    client: &C,
    image: &Image,
    model_id: &str,
) -> VisionResult<CheckWatermarkResult> {
    let model = model_path(model_id);

    let instance = Struct::from_iter([("image".to_string(), image.to_wire_instance())]);
    let parameters = Struct::from_iter([(
        "watermarkVerification".to_string(),
        Value::BoolValue(true),
    )]);
    let request = PredictRequest::new(model.clone(), vec![Value::StructValue(instance)], parameters);

    debug!("Checking watermark of {} byte image with {}", image.len(), model);
    let response = client.predict(request).await?;

    Ok(CheckWatermarkResult::new(response.records()?))
}

impl Image {
    /// Check this image with the default verification model.
    pub async fn check_watermark<C: PredictClient + ?Sized>(
        &self,
        client: &C,
    ) -> VisionResult<CheckWatermarkResult> {
        check_watermark(client, self, DEFAULT_WATERMARK_MODEL).await
    }

    /// Check this image with the model named in `config`.
    pub async fn check_watermark_with_config<C: PredictClient + ?Sized>(
        &self,
        client: &C,
        config: &VisionConfig,
    ) -> VisionResult<CheckWatermarkResult> {
        check_watermark(client, self, &config.watermark_model).await
    }
}

/// Verdict of the verification model.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckWatermarkResult {
    predictions: Vec<Json>,
}

impl CheckWatermarkResult {
    pub fn new(predictions: Vec<Json>) -> Self {
        Self { predictions }
    }

    pub fn predictions(&self) -> &[Json] {
        &self.predictions
    }

    /// Raw decision string of the first prediction.
    pub fn decision(&self) -> VisionResult<&str> {
        self.predictions
            .first()
            .and_then(|p| p.get("decision"))
            .and_then(Json::as_str)
            .ok_or_else(|| VisionError::invalid_response("prediction has no decision"))
    }

    /// `ACCEPT` means watermarked, `REJECT` means not.
    pub fn is_watermarked(&self) -> VisionResult<bool> {
        match self.decision()? {
            "ACCEPT" => Ok(true),
            "REJECT" => Ok(false),
            other => Err(VisionError::UnrecognizedDecision(other.to_string())),
        }
    }
}

impl fmt::Display for CheckWatermarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decision() {
            Ok(decision) => write!(f, "CheckWatermarkResult([{{'decision': '{}'}}])", decision),
            Err(_) => write!(f, "CheckWatermarkResult({})", Json::Array(self.predictions.clone())),
        }
    }
}
