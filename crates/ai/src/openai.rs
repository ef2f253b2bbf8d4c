//! OpenAI REST client: chat completions, image generation and moderation.

use async_trait::async_trait;
use covergen_core::moderation::{ModerationSource, ModerationVerdict};
use serde_json::{json, Value};

use crate::http::{decode_base64, ensure_success, parse_json, parse_json_text, sniff_mime};
use crate::{AiError, GeneratedImage, ImageModel, ImageRequest, ModerationModel, TextModel};

const PROVIDER: &str = "openai";

/// HTTP client for the OpenAI API.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    moderation_model: String,
    text_label: String,
    image_label: String,
}

impl OpenAiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        text_model: String,
        image_model: String,
        moderation_model: String,
    ) -> Self {
        Self {
            text_label: format!("{PROVIDER}:{text_model}"),
            image_label: format!("{PROVIDER}:{image_model}"),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            text_model,
            image_model,
            moderation_model,
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, AiError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        parse_json(PROVIDER, response).await
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.text_label
    }

    async fn complete_json(&self, system: &str, user: &str) -> Result<Value, AiError> {
        let body = json!({
            "model": self.text_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8,
        });
        let response = self.post("/v1/chat/completions", &body).await?;
        let content = extract_chat_content(&response)?;
        parse_json_text(&content)
    }
}

#[async_trait]
impl ImageModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.image_label
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, AiError> {
        let mut body = json!({
            "model": self.image_model,
            "prompt": request.prompt,
            "n": 1,
            "size": image_size(&self.image_model, request),
        });
        // gpt-image models always answer with b64_json and reject the field.
        if self.image_model.starts_with("dall-e") {
            body["response_format"] = json!("b64_json");
        }

        let response = self.post("/v1/images/generations", &body).await?;
        let (b64, revised_prompt) = parse_image_response(&response)?;
        let bytes = decode_base64(&b64)?;

        Ok(GeneratedImage {
            mime_type: sniff_mime(&bytes).unwrap_or("image/png").to_string(),
            bytes,
            provider: self.image_label.clone(),
            revised_prompt,
        })
    }
}

#[async_trait]
impl ModerationModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.moderation_model
    }

    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, AiError> {
        let body = json!({ "model": self.moderation_model, "input": text });
        let response = self
            .client
            .post(format!("{}/v1/moderations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;
        parse_moderation(&response.json::<Value>().await?)
    }
}

/// `choices[0].message.content` of a chat completion.
fn extract_chat_content(response: &Value) -> Result<String, AiError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AiError::InvalidResponse("chat completion has no message content".into()))
}

/// Base64 image and optional revised prompt from an images response.
fn parse_image_response(response: &Value) -> Result<(String, Option<String>), AiError> {
    let first = &response["data"][0];
    let b64 = first["b64_json"]
        .as_str()
        .ok_or_else(|| AiError::InvalidResponse("image response has no b64_json".into()))?;
    let revised = first["revised_prompt"].as_str().map(str::to_string);
    Ok((b64.to_string(), revised))
}

/// Map a moderation response to a verdict listing the flagged categories.
fn parse_moderation(response: &Value) -> Result<ModerationVerdict, AiError> {
    let result = &response["results"][0];
    let flagged = result["flagged"]
        .as_bool()
        .ok_or_else(|| AiError::InvalidResponse("moderation result has no flagged field".into()))?;

    let mut categories: Vec<String> = result["categories"]
        .as_object()
        .map(|cats| {
            cats.iter()
                .filter(|(_, hit)| hit.as_bool() == Some(true))
                .map(|(name, _)| name.replace(['/', '-'], "_"))
                .collect()
        })
        .unwrap_or_default();
    categories.sort();
    categories.dedup();

    Ok(ModerationVerdict {
        flagged,
        categories,
        matched_terms: Vec::new(),
        source: ModerationSource::Provider,
    })
}

/// Nearest size the model accepts for the requested orientation.
fn image_size(model: &str, request: &ImageRequest) -> &'static str {
    let dalle3 = model == "dall-e-3";
    if request.is_square() {
        "1024x1024"
    } else if request.is_portrait() {
        if dalle3 {
            "1024x1792"
        } else {
            "1024x1536"
        }
    } else if dalle3 {
        "1792x1024"
    } else {
        "1536x1024"
    }
}
