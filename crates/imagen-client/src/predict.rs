//! Prediction service collaborator and its request/response types.

use std::sync::Arc;

use async_trait::async_trait;
use imagen_wire::{from_wire_value, Struct, Value};
use serde::{Deserialize, Serialize};

use crate::error::VisionResult;

/// Request sent to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Full model resource name, e.g. `models/imagegeneration@002`
    pub model: String,
    /// One wire value per instance
    pub instances: Vec<Value>,
    /// Struct-typed parameters shared by all instances
    pub parameters: Value,
}

impl PredictRequest {
    pub fn new(model: impl Into<String>, instances: Vec<Value>, parameters: Struct) -> Self {
        Self {
            model: model.into(),
            instances,
            parameters: Value::StructValue(parameters),
        }
    }
}

/// Response from the prediction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Value>,
}

impl PredictResponse {
    pub fn new(predictions: Vec<Value>) -> Self {
        Self { predictions }
    }

    /// Predictions as native JSON records, in response order.
    pub fn records(&self) -> VisionResult<Vec<serde_json::Value>> {
        let records = self
            .predictions
            .iter()
            .map(from_wire_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Remote prediction call. Transport, authentication and retries belong to
/// the implementor.
#[async_trait]
pub trait PredictClient: Send + Sync {
    async fn predict(&self, request: PredictRequest) -> VisionResult<PredictResponse>;
}

#[async_trait]
impl<T: PredictClient + ?Sized> PredictClient for Arc<T> {
    async fn predict(&self, request: PredictRequest) -> VisionResult<PredictResponse> {
        (**self).predict(request).await
    }
}

#[async_trait]
impl<T: PredictClient + ?Sized> PredictClient for &T {
    async fn predict(&self, request: PredictRequest) -> VisionResult<PredictResponse> {
        (**self).predict(request).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;
    use crate::error::VisionError;

    /// Returns a canned response and records every request.
    pub(crate) struct FakePredictClient {
        response: Result<PredictResponse, (String, bool)>,
        pub(crate) requests: Mutex<Vec<PredictRequest>>,
    }

    impl FakePredictClient {
        pub(crate) fn returning(response: PredictResponse) -> Self {
            Self {
                response: Ok(response),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(message: &str, retryable: bool) -> Self {
            Self {
                response: Err((message.to_string(), retryable)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_request(&self) -> PredictRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl PredictClient for FakePredictClient {
        async fn predict(&self, request: PredictRequest) -> VisionResult<PredictResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.response {
                Ok(response) => Ok(response.clone()),
                Err((message, retryable)) => {
                    Err(VisionError::predict_failed(message.clone(), *retryable))
                }
            }
        }
    }
}
