use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use bs_core::{ContentModel, Error, GeneratedImage, Result, TextOptions};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl GeminiConfig {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config
                .model_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            text_model: config.text_model.clone().unwrap_or(defaults.text_model),
            image_model: config.image_model.clone().unwrap_or(defaults.image_model),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Maps a non-2xx Gemini response onto the error taxonomy.
fn classify_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let key_rejected = message.contains("API key not valid")
        || body.contains("API_KEY_INVALID")
        || parsed.iter().any(|e| {
            e.error
                .details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
        });

    if key_rejected {
        Error::InvalidCredentials
    } else {
        Error::Api { status, message }
    }
}

pub struct GeminiModel {
    client: Arc<Client>,
    config: GeminiConfig,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        Ok(Self {
            client: Arc::new(Client::new()),
            config,
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);
        tracing::debug!("POST {}", url);

        let response = self.client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = classify_error(status.as_u16(), &body);
            tracing::warn!("Gemini request to {} failed: {}", model, error);
            return Err(error);
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

#[async_trait]
impl ContentModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate_text(&self, prompt: &str, options: TextOptions) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: if options.search {
                vec![Tool { google_search: GoogleSearch {} }]
            } else {
                Vec::new()
            },
            generation_config: options.temperature.map(|temperature| GenerationConfig {
                temperature: Some(temperature),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.config.text_model, &request).await?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(text)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE"]),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.config.image_model, &request).await?;
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
            .map(|inline| GeneratedImage {
                mime_type: inline.mime_type,
                data: inline.data,
            })
            .ok_or(Error::NoImageReturned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(server: &MockServer) -> GeminiModel {
        GeminiModel::new(GeminiConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(GeminiConfig::default());
        assert!(matches!(result, Err(Error::MissingApiKey)));

        let result = GeminiModel::new(GeminiConfig {
            api_key: "   ".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_config_from_inference_config() {
        let config = Config {
            api_key: Some("k".to_string()),
            model_url: Some("http://localhost:9999/v1beta/".to_string()),
            ..Default::default()
        };
        let gemini = GeminiConfig::from_config(&config);
        assert_eq!(gemini.base_url, "http://localhost:9999/v1beta");
        assert_eq!(gemini.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(gemini.image_model, DEFAULT_IMAGE_MODEL);
        assert!(!format!("{:?}", gemini).contains("\"k\""));
    }

    #[tokio::test]
    async fn test_generate_text_with_search() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"tools": [{"google_search": {}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "# Title\n"}, {"text": "Body"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = model_for(&server);
        let text = model
            .generate_text("write", TextOptions::grounded())
            .await
            .unwrap();
        assert_eq!(text, "# Title\nBody");
    }

    #[tokio::test]
    async fn test_generate_text_sends_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .and(body_partial_json(json!({"generationConfig": {"temperature": 0.0}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "https://youtu.be/abc12345678"}]}}]
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let text = model
            .generate_text("find", TextOptions::grounded().with_temperature(0.0))
            .await
            .unwrap();
        assert_eq!(text, "https://youtu.be/abc12345678");
    }

    #[tokio::test]
    async fn test_invalid_key_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model.generate_text("write", TextOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_other_api_errors_keep_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        match model.generate_text("write", TextOptions::default()).await {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource has been exhausted");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model.generate_text("write", TextOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_image() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-image:generateContent"))
            .and(body_partial_json(json!({"generationConfig": {"responseModalities": ["IMAGE"]}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]}
                }]
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let image = model.generate_image("a calm lake").await.unwrap();
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[tokio::test]
    async fn test_image_without_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "I can't draw that."}]}}]
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model.generate_image("something").await.unwrap_err();
        assert!(matches!(err, Error::NoImageReturned));
    }
}
