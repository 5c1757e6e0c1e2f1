use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::{ModelRequest, TextGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

const JSON_MIME: &str = "application/json";

/// Schema-constrained JSON generation over Gemini `generateContent`.
pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(request: &ModelRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.instruction.clone(),
        }];

        if let Some(attachment) = &request.attachment {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&attachment.data),
                },
            });
        }

        GenerateContentRequest {
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part::Text { text: text.clone() }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME.to_string(),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_json(&self, request: &ModelRequest) -> Result<String> {
        tracing::debug!(
            model = self.model(),
            attachment_bytes = request.attachment.as_ref().map(|a| a.data.len()),
            "Sending generateContent request to Gemini"
        );

        let body = Self::build_request(request);
        let response: GenerateContentResponse = self.http.generate_content(&body).await?;

        if let Some(text) = response.text() {
            return Ok(text.trim().to_string());
        }

        let block_reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone());
        let finish_reason = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone());

        Err(match (block_reason, finish_reason) {
            (Some(reason), _) => Error::AiProvider(format!("Gemini blocked the prompt: {}", reason)),
            (None, Some(reason)) => Error::AiProvider(format!(
                "No text in Gemini response (finish reason: {})",
                reason
            )),
            (None, None) => Error::AiProvider("No text in Gemini response".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::ai::Attachment;
    use crate::models::StudyContentType;
    use crate::schema::{drug_card_schema, study_content_schema};
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_client(server: &MockServer, model: &str) -> GeminiTextClient {
        GeminiTextClient::new("test-key".to_string(), model.to_string())
            .with_base_url(server.uri())
    }

    fn text_request() -> ModelRequest {
        ModelRequest {
            instruction: "Generate a detailed study card for the drug: Metformin.".to_string(),
            system_instruction: None,
            attachment: None,
            response_schema: drug_card_schema(),
        }
    }

    #[tokio::test]
    async fn test_generate_json_returns_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })))
            .respond_with(test_support::text_response("  {\"drugName\": \"Metformin\"}\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let text = client.generate_json(&text_request()).await.unwrap();
        assert_eq!(text, "{\"drugName\": \"Metformin\"}");
    }

    #[test]
    fn test_text_request_omits_system_instruction() {
        let request = GeminiTextClient::build_request(&text_request());
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system_instruction").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_document_request_sends_inline_data_and_system_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\":\"application/pdf\""))
            .and(body_string_contains("JVBERi0xLjQ="))
            .and(body_string_contains("\"system_instruction\""))
            .respond_with(test_support::text_response(
                "{\"title\":\"t\",\"summaryPoints\":[\"p\"]}",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let request = ModelRequest {
            instruction: "Summarize".to_string(),
            system_instruction: Some("You are a study assistant.".to_string()),
            attachment: Some(Attachment {
                mime_type: "application/pdf".to_string(),
                data: b"%PDF-1.4".to_vec(),
            }),
            response_schema: study_content_schema(StudyContentType::SummaryNotes),
        };

        let client = make_client(&server, DEFAULT_MODEL);
        client.generate_json(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_generate_content()
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let err = client.generate_json(&text_request()).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_blocked_prompt_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_generate_content()
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let err = client.generate_json(&text_request()).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_empty_candidates_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_generate_content()
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, DEFAULT_MODEL);
        let err = client.generate_json(&text_request()).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(test_support::text_response("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "models/gemini-2.5-pro");
        assert_eq!(client.model(), "gemini-2.5-pro");
        client.generate_json(&text_request()).await.unwrap();
    }
}
