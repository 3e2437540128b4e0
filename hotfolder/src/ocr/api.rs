use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::engine::{OcrEngine, PageImage};
use super::preprocessing::encode_jpeg;
use crate::config::OcrConfig;
use crate::error::{HotFolderError, Result};

const PROMPT: &str = "Extract all text from this image and convert the document to markdown.";

/// Recognition through a vision model served by Ollama.
#[derive(Clone, Debug)]
pub struct OllamaEngine {
    client: Client,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
    images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

impl OllamaEngine {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let base_url = config.host.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(HotFolderError::Config(
                "ocr.host must not be empty for the ollama backend".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| HotFolderError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            base_url,
        })
    }

    async fn encode(page: PageImage) -> Result<String> {
        let bytes = match page {
            PageImage::File(path) => tokio::fs::read(&path).await?,
            PageImage::Rendered(img) => tokio::task::spawn_blocking(move || encode_jpeg(&img))
                .await
                .map_err(|e| HotFolderError::Ocr(format!("Encoding task panicked: {e}")))??,
        };
        Ok(STANDARD.encode(bytes))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HotFolderError::Ocr(format!(
                "API request failed: {status} - {body}"
            )));
        }

        let body = resp.bytes().await?;
        let chat_response: ChatResponse = serde_json::from_slice(&body)?;

        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl OcrEngine for OllamaEngine {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn recognize(&self, page: PageImage) -> Result<String> {
        let encoded_image = Self::encode(page).await?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: PROMPT.to_string(),
                images: vec![encoded_image],
            }],
            stream: false,
        };

        self.chat(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(host: String) -> OcrConfig {
        OcrConfig {
            model: "deepseek-ocr:latest".to_string(),
            host,
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_empty_host_is_rejected() {
        let result = OllamaEngine::new(&config_for(String::new()));
        assert!(matches!(result, Err(HotFolderError::Config(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = config_for("http://localhost:11434/".to_string());
        let engine = OllamaEngine::new(&config).unwrap();
        assert_eq!(engine.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_recognize_sends_file_bytes_and_returns_content() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("scan.png");
        std::fs::write(&image_path, b"not really a png").unwrap();

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "deepseek-ocr:latest",
                "stream": false,
                "messages": [{
                    "role": "user",
                    "content": PROMPT,
                    "images": [STANDARD.encode(b"not really a png")],
                }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "deepseek-ocr:latest",
                "message": { "role": "assistant", "content": "# Invoice\nTotal: 51.98" },
                "done": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(&config_for(server.uri())).unwrap();
        let text = engine.recognize(PageImage::File(image_path)).await.unwrap();

        assert_eq!(text, "# Invoice\nTotal: 51.98");
    }

    #[tokio::test]
    async fn test_rendered_page_is_sent_as_jpeg() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": { "role": "assistant", "content": "page text" },
            })))
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(&config_for(server.uri())).unwrap();
        let text = engine
            .recognize(PageImage::Rendered(image::DynamicImage::new_rgba8(8, 8)))
            .await
            .unwrap();
        assert_eq!(text, "page text");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let encoded = body["messages"][0]["images"][0].as_str().unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(&config_for(server.uri())).unwrap();
        let err = engine
            .recognize(PageImage::Rendered(image::DynamicImage::new_rgb8(4, 4)))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("model not loaded"), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_response_is_a_json_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(&config_for(server.uri())).unwrap();
        let result = engine
            .recognize(PageImage::Rendered(image::DynamicImage::new_rgb8(4, 4)))
            .await;

        assert!(matches!(result, Err(HotFolderError::Json(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let config = config_for("http://127.0.0.1:9".to_string());
        let engine = OllamaEngine::new(&config).unwrap();
        let result = engine
            .recognize(PageImage::File("/nonexistent/scan.png".into()))
            .await;

        assert!(matches!(result, Err(HotFolderError::Io(_))));
    }
}
