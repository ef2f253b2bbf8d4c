//! Response helpers shared by the provider clients.

use base64::Engine;

use crate::AiError;

/// Build the shared HTTP client with a request timeout.
pub fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, AiError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or [`AiError::Api`] with the status and body text.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(AiError::Api {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body.
pub(crate) async fn parse_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, AiError> {
    let response = ensure_success(provider, response).await?;
    Ok(response.json::<serde_json::Value>().await?)
}

/// Download a binary body, returning bytes and the reported content type.
pub(crate) async fn download(
    provider: &'static str,
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, Option<String>), AiError> {
    let response = ensure_success(provider, client.get(url).send().await?).await?;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Ok((response.bytes().await?.to_vec(), content_type))
}

/// Decode standard base64, mapping failures to [`AiError::InvalidResponse`].
pub(crate) fn decode_base64(data: &str) -> Result<Vec<u8>, AiError> {
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AiError::InvalidResponse(format!("image payload is not valid base64: {e}")))
}

/// Parse model text as JSON, tolerating a surrounding Markdown code fence.
pub(crate) fn parse_json_text(text: &str) -> Result<serde_json::Value, AiError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .map_err(|e| AiError::InvalidResponse(format!("model did not return JSON: {e}")))
}

/// Sniff PNG/JPEG/WebP magic bytes.
pub(crate) fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_plain_and_fenced_json() {
        assert_eq!(parse_json_text(r#"{"a":1}"#).unwrap()["a"], 1);
        assert_eq!(parse_json_text("```json\n{\"a\":2}\n```").unwrap()["a"], 2);
        assert_eq!(parse_json_text("```\n{\"a\":3}\n```").unwrap()["a"], 3);
        assert_matches!(parse_json_text("sure! here you go"), Err(AiError::InvalidResponse(_)));
    }

    #[test]
    fn decodes_base64() {
        assert_eq!(decode_base64("aGk=").unwrap(), b"hi");
        assert!(decode_base64("***").is_err());
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(sniff_mime(&[0x89, b'P', b'N', b'G', 0x0D]), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"GIF89a"), None);
    }
}
