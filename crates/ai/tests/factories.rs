//! The model factories are reachable from the crate root, the way the
//! server binary wires them up.

use std::time::Duration;

use covergen_ai::config::{ImageProvider, TextProvider};
use covergen_ai::{build_image_model, build_moderation_model, build_text_model, AiConfig};

fn openai_config() -> AiConfig {
    AiConfig {
        text_provider: TextProvider::OpenAi,
        image_provider: ImageProvider::OpenAi,
        openai_api_key: Some("sk-test".into()),
        openai_base_url: "https://api.openai.com".into(),
        openai_text_model: "gpt-4o-mini".into(),
        openai_image_model: "gpt-image-1".into(),
        openai_moderation_model: "omni-moderation-latest".into(),
        gemini_api_key: None,
        gemini_base_url: "https://generativelanguage.googleapis.com".into(),
        gemini_text_model: "gemini-2.0-flash".into(),
        gemini_image_model: "imagen-3.0-generate-002".into(),
        replicate_api_token: None,
        replicate_base_url: "https://api.replicate.com".into(),
        replicate_image_model: "black-forest-labs/flux-schnell".into(),
        request_timeout: Duration::from_secs(5),
        replicate_max_wait: Duration::from_secs(5),
        remote_moderation: true,
    }
}

#[test]
fn root_factories_build_every_model() {
    let config = openai_config();

    assert!(build_text_model(&config).is_ok());
    assert!(build_image_model(&config).is_ok());
    assert!(build_moderation_model(&config).unwrap().is_some());
}
