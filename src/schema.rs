//! Response schemas sent to the model and checked against its output.
//!
//! [`Schema`] serializes to the OpenAPI subset accepted by Gemini's
//! `responseSchema`, and the same tree validates the returned JSON locally.

use crate::models::StudyContentType;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Declaration order of `properties`; the map itself is sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

/// First mismatch found between a JSON value and a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl Schema {
    fn bare(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
            min_items: None,
            max_items: None,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::bare(SchemaType::String).describe(description)
    }

    /// Array of `items` that must contain at least one element.
    pub fn list(items: Schema, description: &str) -> Self {
        let mut schema = Self::bare(SchemaType::Array).describe(description);
        schema.items = Some(Box::new(items));
        schema.min_items = Some(1);
        schema
    }

    /// Object whose properties are all required, kept in the given order.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let mut schema = Self::bare(SchemaType::Object);
        for (name, property) in properties {
            schema.property_ordering.push(name.to_string());
            schema.required.push(name.to_string());
            schema.properties.insert(name.to_string(), property);
        }
        schema
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn exact_items(mut self, count: usize) -> Self {
        self.min_items = Some(count);
        self.max_items = Some(count);
        self
    }

    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        let violation = |reason: String| SchemaViolation {
            path: path.to_string(),
            reason,
        };

        match self.schema_type {
            SchemaType::String => {
                if !value.is_string() {
                    return Err(violation(format!("expected string, got {}", kind_of(value))));
                }
            }
            SchemaType::Array => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| violation(format!("expected array, got {}", kind_of(value))))?;

                if let Some(min) = self.min_items {
                    if elements.len() < min {
                        return Err(violation(format!(
                            "expected at least {} item(s), got {}",
                            min,
                            elements.len()
                        )));
                    }
                }
                if let Some(max) = self.max_items {
                    if elements.len() > max {
                        return Err(violation(format!(
                            "expected at most {} item(s), got {}",
                            max,
                            elements.len()
                        )));
                    }
                }
                if let Some(items) = &self.items {
                    for (index, element) in elements.iter().enumerate() {
                        items.validate_at(&format!("{}[{}]", path, index), element)?;
                    }
                }
            }
            SchemaType::Object => {
                let fields = value
                    .as_object()
                    .ok_or_else(|| violation(format!("expected object, got {}", kind_of(value))))?;

                for name in &self.required {
                    if !fields.contains_key(name) {
                        return Err(violation(format!("missing required field '{}'", name)));
                    }
                }
                for (name, property) in &self.properties {
                    if let Some(field) = fields.get(name) {
                        property.validate_at(&format!("{}.{}", path, name), field)?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_list(description: &str) -> Schema {
    Schema::list(Schema::bare(SchemaType::String), description)
}

pub const QUIZ_OPTION_COUNT: usize = 4;

pub fn drug_card_schema() -> Schema {
    Schema::object(vec![
        ("drugName", Schema::string("The official name of the drug.")),
        ("drugClass", Schema::string("The pharmacological class of the drug.")),
        (
            "mechanismOfAction",
            Schema::string("A concise explanation of how the drug works."),
        ),
        (
            "commonUses",
            string_list("A list of common clinical uses or indications for the drug."),
        ),
        (
            "sideEffects",
            string_list("A list of major or common side effects."),
        ),
        (
            "contraindications",
            Schema::string("Key contraindications or warnings for the drug."),
        ),
        (
            "mnemonic",
            Schema::string(
                "A creative and memorable mnemonic to help remember key information about the drug.",
            ),
        ),
    ])
}

pub fn quiz_schema() -> Schema {
    let question = Schema::object(vec![
        ("question", Schema::string("The multiple-choice question.")),
        (
            "options",
            string_list("An array of 4 possible answers.").exact_items(QUIZ_OPTION_COUNT),
        ),
        (
            "correctAnswer",
            Schema::string("The correct answer, copied exactly from the options list."),
        ),
    ]);
    Schema::list(question, "The quiz questions.")
}

pub fn otc_recommendation_schema() -> Schema {
    Schema::object(vec![
        (
            "recommendedDrug",
            Schema::string("The recommended Over-the-Counter (OTC) drug or active ingredient."),
        ),
        (
            "reasoning",
            Schema::string(
                "A clear and concise rationale for why this drug is recommended for the presented symptoms.",
            ),
        ),
        (
            "counselingPoints",
            string_list(
                "A list of key counseling points for the patient, such as how to take the medication, what to expect, and non-drug advice.",
            ),
        ),
        (
            "warnings",
            string_list(
                "A list of important warnings, potential side effects, or contraindications, especially considering any patient-specific conditions mentioned.",
            ),
        ),
        (
            "whenToSeeDoctor",
            Schema::string(
                "Clear criteria on when the patient should stop using the OTC and consult a doctor.",
            ),
        ),
    ])
}

pub fn study_content_schema(content_type: StudyContentType) -> Schema {
    match content_type {
        StudyContentType::Flashcards => {
            let card = Schema::object(vec![
                (
                    "question",
                    Schema::string(
                        "A concise question derived from the text, suitable for a flashcard.",
                    ),
                ),
                (
                    "answer",
                    Schema::string("A concise answer to the question, derived from the text."),
                ),
            ]);
            Schema::list(card, "An array of question-answer pairs for flashcards.")
        }
        StudyContentType::SummaryNotes => Schema::object(vec![
            (
                "title",
                Schema::string(
                    "A suitable title for the summary notes, derived from the document's content.",
                ),
            ),
            (
                "summaryPoints",
                string_list("A list of key summary points, in bullet-point format."),
            ),
        ])
        .describe("A title and a list of key summary points from the document."),
        StudyContentType::LearningObjectives => Schema::object(vec![
            (
                "mainTopic",
                Schema::string("The main topic or subject of the document."),
            ),
            (
                "learningObjectives",
                string_list(
                    "A list of clear, actionable learning objectives based on the document's content.",
                ),
            ),
        ])
        .describe("The main topic and a list of learning objectives."),
    }
}
