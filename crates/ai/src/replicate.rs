//! Replicate predictions client for hosted image models.
//!
//! A prediction is created with `Prefer: wait`, which usually returns the
//! finished output. If it is still running, `urls.get` is polled once per
//! second until it reaches a terminal status or `max_wait` elapses.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::http::{download, parse_json, sniff_mime};
use crate::{AiError, GeneratedImage, ImageModel, ImageRequest};

const PROVIDER: &str = "replicate";

/// Delay between status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct ReplicateClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    /// `owner/name` of the model, e.g. `black-forest-labs/flux-schnell`.
    model: String,
    label: String,
    max_wait: Duration,
}

/// Prediction lifecycle as reported by Replicate.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PredictionState {
    Pending { poll_url: String },
    Succeeded { output_url: String },
    Failed(String),
}

impl ReplicateClient {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_token: String,
        model: String,
        max_wait: Duration,
    ) -> Self {
        Self {
            label: format!("{PROVIDER}:{model}"),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            model,
            max_wait,
        }
    }

    async fn create_prediction(&self, request: &ImageRequest) -> Result<Value, AiError> {
        let mut input = json!({
            "prompt": request.prompt,
            "aspect_ratio": request.aspect_ratio,
            "output_format": "png",
            "num_outputs": 1,
        });
        if let Some(negative) = &request.negative_prompt {
            input["negative_prompt"] = json!(negative);
        }

        let response = self
            .client
            .post(format!("{}/v1/models/{}/predictions", self.base_url, self.model))
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({ "input": input }))
            .send()
            .await?;
        parse_json(PROVIDER, response).await
    }

    async fn poll(&self, url: &str) -> Result<Value, AiError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        parse_json(PROVIDER, response).await
    }
}

#[async_trait]
impl ImageModel for ReplicateClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, AiError> {
        let started = tokio::time::Instant::now();
        let mut prediction = self.create_prediction(request).await?;

        let output_url = loop {
            match prediction_state(&prediction)? {
                PredictionState::Succeeded { output_url } => break output_url,
                PredictionState::Failed(reason) => {
                    return Err(AiError::InvalidResponse(format!(
                        "Replicate prediction failed: {reason}"
                    )));
                }
                PredictionState::Pending { poll_url } => {
                    if started.elapsed() >= self.max_wait {
                        return Err(AiError::Timeout(format!(
                            "Replicate prediction still running after {}s",
                            self.max_wait.as_secs()
                        )));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                    prediction = self.poll(&poll_url).await?;
                }
            }
        };

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Replicate prediction finished",
        );

        let (bytes, content_type) = download(PROVIDER, &self.client, &output_url).await?;
        Ok(GeneratedImage {
            mime_type: sniff_mime(&bytes)
                .map(str::to_string)
                .or(content_type)
                .unwrap_or_else(|| "image/png".into()),
            bytes,
            provider: self.label.clone(),
            revised_prompt: None,
        })
    }
}

fn prediction_state(prediction: &Value) -> Result<PredictionState, AiError> {
    let status = prediction["status"]
        .as_str()
        .ok_or_else(|| AiError::InvalidResponse("prediction has no status".into()))?;

    match status {
        "succeeded" => {
            // Output is a single URL or a list of URLs depending on the model.
            let output = &prediction["output"];
            let url = output
                .as_str()
                .or_else(|| output[0].as_str())
                .ok_or_else(|| AiError::InvalidResponse("prediction has no output URL".into()))?;
            Ok(PredictionState::Succeeded {
                output_url: url.to_string(),
            })
        }
        "failed" | "canceled" => Ok(PredictionState::Failed(
            prediction["error"]
                .as_str()
                .unwrap_or(status)
                .to_string(),
        )),
        _ => {
            let poll_url = prediction["urls"]["get"]
                .as_str()
                .ok_or_else(|| AiError::InvalidResponse("pending prediction has no poll URL".into()))?;
            Ok(PredictionState::Pending {
                poll_url: poll_url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_with_list_output() {
        let p = json!({ "status": "succeeded", "output": ["https://cdn/x.png"] });
        assert_eq!(
            prediction_state(&p).unwrap(),
            PredictionState::Succeeded {
                output_url: "https://cdn/x.png".into()
            }
        );
    }

    #[test]
    fn succeeded_with_string_output() {
        let p = json!({ "status": "succeeded", "output": "https://cdn/y.png" });
        assert!(matches!(
            prediction_state(&p).unwrap(),
            PredictionState::Succeeded { output_url } if output_url.ends_with("y.png")
        ));
    }

    #[test]
    fn processing_exposes_poll_url() {
        let p = json!({ "status": "processing", "urls": { "get": "https://api/p/1" } });
        assert_eq!(
            prediction_state(&p).unwrap(),
            PredictionState::Pending {
                poll_url: "https://api/p/1".into()
            }
        );
    }

    #[test]
    fn failed_carries_error() {
        let p = json!({ "status": "failed", "error": "NSFW content detected" });
        assert_eq!(
            prediction_state(&p).unwrap(),
            PredictionState::Failed("NSFW content detected".into())
        );
    }

    #[test]
    fn missing_status_is_invalid() {
        assert!(prediction_state(&json!({})).is_err());
    }
}
