//! Google Generative Language API client: Gemini text and Imagen images.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::http::{decode_base64, parse_json, parse_json_text, sniff_mime};
use crate::{AiError, GeneratedImage, ImageModel, ImageRequest, TextModel};

const PROVIDER: &str = "gemini";

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    text_label: String,
    image_label: String,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        text_model: String,
        image_model: String,
    ) -> Self {
        Self {
            text_label: format!("{PROVIDER}:{text_model}"),
            image_label: format!("{PROVIDER}:{image_model}"),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            text_model,
            image_model,
        }
    }

    async fn call(&self, model: &str, method: &str, body: &Value) -> Result<Value, AiError> {
        let response = self
            .client
            .post(format!("{}/v1beta/models/{model}:{method}", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        parse_json(PROVIDER, response).await
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.text_label
    }

    async fn complete_json(&self, system: &str, user: &str) -> Result<Value, AiError> {
        let body = json!({
            "systemInstruction": { "parts": [ { "text": system } ] },
            "contents": [ { "role": "user", "parts": [ { "text": user } ] } ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.8,
            },
        });
        let response = self.call(&self.text_model, "generateContent", &body).await?;
        parse_json_text(&extract_candidate_text(&response)?)
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    fn name(&self) -> &str {
        &self.image_label
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, AiError> {
        let mut parameters = json!({
            "sampleCount": 1,
            "aspectRatio": request.aspect_ratio,
        });
        if let Some(negative) = &request.negative_prompt {
            parameters["negativePrompt"] = json!(negative);
        }
        let body = json!({
            "instances": [ { "prompt": request.prompt } ],
            "parameters": parameters,
        });

        let response = self.call(&self.image_model, "predict", &body).await?;
        let (b64, mime) = parse_prediction(&response)?;
        let bytes = decode_base64(&b64)?;

        Ok(GeneratedImage {
            mime_type: mime
                .or_else(|| sniff_mime(&bytes).map(str::to_string))
                .unwrap_or_else(|| "image/png".into()),
            bytes,
            provider: self.image_label.clone(),
            revised_prompt: None,
        })
    }
}

/// Concatenated text parts of the first candidate.
fn extract_candidate_text(response: &Value) -> Result<String, AiError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = response["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("no candidates");
            AiError::InvalidResponse(format!("Gemini returned no content ({reason})"))
        })?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(AiError::InvalidResponse("Gemini returned empty text".into()));
    }
    Ok(text)
}

fn parse_prediction(response: &Value) -> Result<(String, Option<String>), AiError> {
    let prediction = &response["predictions"][0];
    let b64 = prediction["bytesBase64Encoded"].as_str().ok_or_else(|| {
        AiError::InvalidResponse("Imagen response has no image (possibly filtered)".into())
    })?;
    Ok((
        b64.to_string(),
        prediction["mimeType"].as_str().map(str::to_string),
    ))
}
