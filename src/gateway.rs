//! Generation gateway
//!
//! Maps a [`GenerationKind`] and its input to one schema-constrained model
//! call, then validates the returned JSON into a typed shape. Every failure
//! after input checks becomes [`Error::Generation`] carrying a stable,
//! kind-specific message; the provider's own error is only logged.

use crate::ai::{Attachment, ModelRequest, TextGenerationService};
use crate::models::{
    DrugCard, GeneratedContent, OtcRecommendation, QuizQuestion, StudyContent, StudyContentType,
};
use crate::quiz::QUIZ_LENGTH;
use crate::schema::{self, Schema, SchemaViolation};
use crate::{prompts, Error, Result};
use serde_json::Value;
use std::fmt;
use thiserror::Error as ThisError;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    DrugCard,
    Quiz,
    OtcRecommendation,
    StudyContent(StudyContentType),
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationKind::DrugCard => f.write_str("drug card"),
            GenerationKind::Quiz => f.write_str("quiz"),
            GenerationKind::OtcRecommendation => f.write_str("OTC recommendation"),
            GenerationKind::StudyContent(content_type) => {
                write!(f, "study content ({})", content_type)
            }
        }
    }
}

/// What the caller hands to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationInput {
    Text(String),
    Document { data: Vec<u8>, mime_type: String },
}

impl GenerationInput {
    pub fn text(value: impl Into<String>) -> Self {
        GenerationInput::Text(value.into())
    }

    pub fn document(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        GenerationInput::Document {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// Why a model response was not accepted.
#[derive(Debug, ThisError)]
enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response does not match schema at {0}")]
    Schema(#[from] SchemaViolation),
    #[error("{0}")]
    Invariant(String),
}

impl GenerationKind {
    pub fn response_schema(&self) -> Schema {
        match self {
            GenerationKind::DrugCard => schema::drug_card_schema(),
            GenerationKind::Quiz => schema::quiz_schema(),
            GenerationKind::OtcRecommendation => schema::otc_recommendation_schema(),
            GenerationKind::StudyContent(content_type) => {
                schema::study_content_schema(*content_type)
            }
        }
    }

    pub fn system_instruction(&self) -> Option<&'static str> {
        match self {
            GenerationKind::DrugCard | GenerationKind::Quiz => None,
            GenerationKind::OtcRecommendation => Some(prompts::OTC_SYSTEM.trim_end()),
            GenerationKind::StudyContent(_) => Some(prompts::STUDY_SYSTEM.trim_end()),
        }
    }

    /// User-facing text shown when a request of this kind fails.
    pub fn failure_message(&self) -> String {
        match self {
            GenerationKind::DrugCard => {
                "Failed to generate drug card from AI. Please check the drug name and try again."
                    .to_string()
            }
            GenerationKind::Quiz => {
                "Failed to generate quiz from AI. Please select another category.".to_string()
            }
            GenerationKind::OtcRecommendation => {
                "Failed to generate an OTC recommendation. Please check the patient case and try again."
                    .to_string()
            }
            GenerationKind::StudyContent(content_type) => format!(
                "Failed to generate {} from the document. The file might be corrupted, unreadable, or very large.",
                content_type
            ),
        }
    }

    fn build_request(&self, input: GenerationInput) -> Result<ModelRequest> {
        let (instruction, attachment) = match (self, input) {
            (GenerationKind::DrugCard, GenerationInput::Text(drug_name)) => (
                prompts::render(prompts::DRUG_CARD_USER, &[("drug_name", &drug_name)]),
                None,
            ),
            (GenerationKind::Quiz, GenerationInput::Text(drug_class)) => (
                prompts::render(
                    prompts::QUIZ_USER,
                    &[
                        ("count", &QUIZ_LENGTH.to_string()),
                        ("drug_class", &drug_class),
                    ],
                ),
                None,
            ),
            (GenerationKind::OtcRecommendation, GenerationInput::Text(patient_case)) => (
                prompts::render(prompts::OTC_USER, &[("patient_case", &patient_case)]),
                None,
            ),
            (
                GenerationKind::StudyContent(content_type),
                GenerationInput::Document { data, mime_type },
            ) => (
                prompts::render(
                    prompts::STUDY_USER,
                    &[("content_type", content_type.label())],
                ),
                Some(Attachment { mime_type, data }),
            ),
            (GenerationKind::StudyContent(_), GenerationInput::Text(_)) => {
                return Err(Error::InvalidInput(
                    "Study content requires a document".to_string(),
                ));
            }
            (kind, GenerationInput::Document { .. }) => {
                return Err(Error::InvalidInput(format!(
                    "A {} request takes text input, not a document",
                    kind
                )));
            }
        };

        Ok(ModelRequest {
            instruction,
            system_instruction: self.system_instruction().map(str::to_string),
            attachment,
            response_schema: self.response_schema(),
        })
    }

    fn decode(&self, text: &str) -> std::result::Result<GeneratedContent, DecodeError> {
        let value: Value = serde_json::from_str(text.trim())?;
        self.response_schema().validate(&value)?;

        let content = match self {
            GenerationKind::DrugCard => GeneratedContent::DrugCard(serde_json::from_value(value)?),
            GenerationKind::Quiz => {
                let questions: Vec<QuizQuestion> = serde_json::from_value(value)?;
                check_quiz(&questions)?;
                GeneratedContent::Quiz(questions)
            }
            GenerationKind::OtcRecommendation => {
                GeneratedContent::OtcRecommendation(serde_json::from_value(value)?)
            }
            GenerationKind::StudyContent(content_type) => {
                let study = match content_type {
                    StudyContentType::Flashcards => {
                        StudyContent::Flashcards(serde_json::from_value(value)?)
                    }
                    StudyContentType::SummaryNotes => {
                        StudyContent::SummaryNotes(serde_json::from_value(value)?)
                    }
                    StudyContentType::LearningObjectives => {
                        StudyContent::LearningObjectives(serde_json::from_value(value)?)
                    }
                };
                GeneratedContent::StudyContent(study)
            }
        };

        Ok(content)
    }
}

fn check_quiz(questions: &[QuizQuestion]) -> std::result::Result<(), DecodeError> {
    for (index, question) in questions.iter().enumerate() {
        if !question.has_valid_answer() {
            return Err(DecodeError::Invariant(format!(
                "question {} answer '{}' is not one of its options",
                index + 1,
                question.correct_answer
            )));
        }
    }

    if questions.len() != QUIZ_LENGTH {
        tracing::warn!(
            "Model returned {} quiz questions, requested {}",
            questions.len(),
            QUIZ_LENGTH
        );
    }

    Ok(())
}

/// Entry point for all four generation workflows.
pub struct Gateway {
    model: Box<dyn TextGenerationService>,
}

impl Gateway {
    pub fn new(model: Box<dyn TextGenerationService>) -> Self {
        Self { model }
    }

    /// Run one generation request. No retries; a failure is terminal.
    pub async fn generate(
        &self,
        kind: GenerationKind,
        input: GenerationInput,
    ) -> Result<GeneratedContent> {
        let request = kind.build_request(input)?;
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate", %request_id, %kind);

        async move {
            tracing::info!("Requesting {} from model", kind);

            let text = self
                .model
                .generate_json(&request)
                .await
                .map_err(|e| Self::failure(kind, e))?;

            let content = kind.decode(&text).map_err(|e| Self::failure(kind, e))?;
            tracing::info!("Generated {}", kind);
            Ok::<GeneratedContent, Error>(content)
        }
        .instrument(span)
        .await
    }

    fn failure(kind: GenerationKind, cause: impl fmt::Display) -> Error {
        tracing::error!("Error generating {}: {}", kind, cause);
        Error::Generation {
            kind,
            message: kind.failure_message(),
        }
    }

    fn unexpected(kind: GenerationKind, content: &GeneratedContent) -> Error {
        Self::failure(kind, format!("unexpected content variant {:?}", content))
    }

    pub async fn drug_card(&self, drug_name: &str) -> Result<DrugCard> {
        let kind = GenerationKind::DrugCard;
        match self.generate(kind, GenerationInput::text(drug_name)).await? {
            GeneratedContent::DrugCard(card) => Ok(card),
            other => Err(Self::unexpected(kind, &other)),
        }
    }

    pub async fn quiz(&self, drug_class: &str) -> Result<Vec<QuizQuestion>> {
        let kind = GenerationKind::Quiz;
        match self.generate(kind, GenerationInput::text(drug_class)).await? {
            GeneratedContent::Quiz(questions) => Ok(questions),
            other => Err(Self::unexpected(kind, &other)),
        }
    }

    pub async fn otc_recommendation(&self, patient_case: &str) -> Result<OtcRecommendation> {
        let kind = GenerationKind::OtcRecommendation;
        match self.generate(kind, GenerationInput::text(patient_case)).await? {
            GeneratedContent::OtcRecommendation(recommendation) => Ok(recommendation),
            other => Err(Self::unexpected(kind, &other)),
        }
    }

    pub async fn study_content(
        &self,
        document: Vec<u8>,
        mime_type: &str,
        content_type: StudyContentType,
    ) -> Result<StudyContent> {
        let kind = GenerationKind::StudyContent(content_type);
        match self
            .generate(kind, GenerationInput::document(document, mime_type))
            .await?
        {
            GeneratedContent::StudyContent(study) => Ok(study),
            other => Err(Self::unexpected(kind, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockTextGenerationClient;
    use serde_json::json;

    fn gateway(model: &MockTextGenerationClient) -> Gateway {
        Gateway::new(Box::new(model.clone()))
    }

    fn statin_card() -> Value {
        json!({
            "drugName": "Atorvastatin",
            "drugClass": "HMG-CoA reductase inhibitor (statin)",
            "mechanismOfAction": "Competitively inhibits HMG-CoA reductase, lowering hepatic cholesterol synthesis.",
            "commonUses": ["Primary hyperlipidemia", "Prevention of cardiovascular events"],
            "sideEffects": ["Myalgia", "Elevated liver enzymes"],
            "contraindications": "Active liver disease, pregnancy.",
            "mnemonic": "ATOR-vastatin: Arteries Thank One Reductase blocker"
        })
    }

    fn quiz_question(answer: &str) -> Value {
        json!({
            "question": "Which enzyme do statins inhibit?",
            "options": ["HMG-CoA reductase", "ACE", "COX-1", "Xanthine oxidase"],
            "correctAnswer": answer
        })
    }

    #[tokio::test]
    async fn test_drug_card_success() {
        let model = MockTextGenerationClient::new().with_json_response(statin_card());
        let card = gateway(&model).drug_card("Atorvastatin").await.unwrap();

        assert!(card.drug_class.to_lowercase().contains("statin"));
        assert!(!card.common_uses.is_empty());
        assert!(!card.side_effects.is_empty());

        let request = model.last_request().unwrap();
        assert!(request.instruction.contains("Atorvastatin"));
        assert!(request.system_instruction.is_none());
        assert!(request.attachment.is_none());
        assert_eq!(request.response_schema, schema::drug_card_schema());
    }

    #[tokio::test]
    async fn test_malformed_json_becomes_generation_failure() {
        let model = MockTextGenerationClient::new().with_response("{\"drugName\": \"Atorv");
        let err = gateway(&model).drug_card("Atorvastatin").await.unwrap_err();

        assert!(err.is_generation_failure());
        assert_eq!(
            err.to_string(),
            "Failed to generate drug card from AI. Please check the drug name and try again."
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_not_propagated_raw() {
        let model = MockTextGenerationClient::new().with_failure("503 backend overloaded");
        let err = gateway(&model).otc_recommendation("Adult with a cold").await.unwrap_err();

        match err {
            Error::Generation { kind, message } => {
                assert_eq!(kind, GenerationKind::OtcRecommendation);
                assert!(!message.contains("503"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(model.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_becomes_generation_failure() {
        let mut card = statin_card();
        card.as_object_mut().unwrap().remove("mnemonic");
        let model = MockTextGenerationClient::new().with_json_response(card);

        let err = gateway(&model).drug_card("Atorvastatin").await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn test_empty_list_becomes_generation_failure() {
        let mut card = statin_card();
        card["commonUses"] = json!([]);
        let model = MockTextGenerationClient::new().with_json_response(card);

        let err = gateway(&model).drug_card("Atorvastatin").await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn test_quiz_success_answers_are_members_of_options() {
        let questions: Vec<Value> = (0..5).map(|_| quiz_question("HMG-CoA reductase")).collect();
        let model = MockTextGenerationClient::new().with_json_response(Value::Array(questions));

        let quiz = gateway(&model).quiz("Statins").await.unwrap();
        assert_eq!(quiz.len(), 5);
        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            assert!(question.options.contains(&question.correct_answer));
        }

        let request = model.last_request().unwrap();
        assert!(request.instruction.contains("Statins"));
        assert!(request.instruction.contains("5-question"));
    }

    #[tokio::test]
    async fn test_quiz_answer_outside_options_fails() {
        let model = MockTextGenerationClient::new().with_json_response(json!([
            quiz_question("HMG-CoA reductase"),
            quiz_question("Lipoprotein lipase")
        ]));

        let err = gateway(&model).quiz("Statins").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate quiz from AI. Please select another category."
        );
    }

    #[tokio::test]
    async fn test_quiz_with_three_options_fails() {
        let model = MockTextGenerationClient::new().with_json_response(json!([{
            "question": "Which is a loop diuretic?",
            "options": ["Furosemide", "Spironolactone", "Hydrochlorothiazide"],
            "correctAnswer": "Furosemide"
        }]));

        assert!(gateway(&model).quiz("Diuretics").await.is_err());
    }

    #[tokio::test]
    async fn test_otc_request_carries_safety_system_instruction() {
        let model = MockTextGenerationClient::new().with_json_response(json!({
            "recommendedDrug": "Loratadine",
            "reasoning": "Non-sedating antihistamine suitable for seasonal allergies.",
            "counselingPoints": ["Take once daily"],
            "warnings": ["Use caution with hepatic impairment"],
            "whenToSeeDoctor": "If symptoms persist beyond 7 days."
        }));

        let recommendation = gateway(&model)
            .otc_recommendation("25-year-old with sneezing and itchy eyes every spring")
            .await
            .unwrap();
        assert_eq!(recommendation.recommended_drug, "Loratadine");

        let request = model.last_request().unwrap();
        assert!(request
            .system_instruction
            .unwrap()
            .contains("prioritize patient safety"));
        assert!(request.instruction.contains("itchy eyes"));
    }

    #[tokio::test]
    async fn test_study_content_variant_follows_requested_type() {
        let model = MockTextGenerationClient::new().with_json_response(json!({
            "mainTopic": "Anticoagulation",
            "learningObjectives": ["Explain the mechanism of warfarin"]
        }));

        let study = gateway(&model)
            .study_content(
                b"%PDF-1.4".to_vec(),
                "application/pdf",
                StudyContentType::LearningObjectives,
            )
            .await
            .unwrap();
        assert_eq!(study.content_type(), StudyContentType::LearningObjectives);

        let request = model.last_request().unwrap();
        let attachment = request.attachment.unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(attachment.data, b"%PDF-1.4".to_vec());
        assert!(request.instruction.contains("Learning Objectives"));
        assert!(request.system_instruction.is_some());
    }

    #[tokio::test]
    async fn test_study_content_shape_mismatch_fails() {
        // Objectives JSON returned for a notes request must not be accepted.
        let model = MockTextGenerationClient::new().with_json_response(json!({
            "mainTopic": "Anticoagulation",
            "learningObjectives": ["Explain the mechanism of warfarin"]
        }));

        let err = gateway(&model)
            .study_content(
                b"%PDF-1.4".to_vec(),
                "application/pdf",
                StudyContentType::SummaryNotes,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate Summary Notes from the document. The file might be corrupted, unreadable, or very large."
        );
    }

    #[tokio::test]
    async fn test_flashcards_decode_as_list() {
        let model = MockTextGenerationClient::new().with_json_response(json!([
            { "question": "First-line drug for type 2 diabetes?", "answer": "Metformin" }
        ]));

        let content = gateway(&model)
            .generate(
                GenerationKind::StudyContent(StudyContentType::Flashcards),
                GenerationInput::document(b"%PDF-1.4".to_vec(), "application/pdf"),
            )
            .await
            .unwrap();

        match content {
            GeneratedContent::StudyContent(StudyContent::Flashcards(cards)) => {
                assert_eq!(cards[0].answer, "Metformin");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mismatched_input_is_rejected_without_provider_call() {
        let model = MockTextGenerationClient::new().with_json_response(statin_card());
        let gateway = gateway(&model);

        let err = gateway
            .generate(
                GenerationKind::StudyContent(StudyContentType::Flashcards),
                GenerationInput::text("notes"),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = gateway
            .generate(
                GenerationKind::DrugCard,
                GenerationInput::document(vec![1, 2, 3], "application/pdf"),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(model.get_call_count(), 0);
    }

    #[test]
    fn test_only_otc_and_study_have_system_instructions() {
        assert!(GenerationKind::DrugCard.system_instruction().is_none());
        assert!(GenerationKind::Quiz.system_instruction().is_none());
        assert!(GenerationKind::OtcRecommendation
            .system_instruction()
            .is_some());
        for content_type in StudyContentType::ALL {
            assert!(GenerationKind::StudyContent(content_type)
                .system_instruction()
                .is_some());
        }
    }
}
