//! Data models and structures
//!
//! Defines the study shapes returned by the model and the runtime
//! configuration read from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugCard {
    pub drug_name: String,
    pub drug_class: String,
    pub mechanism_of_action: String,
    pub common_uses: Vec<String>,
    pub side_effects: Vec<String>,
    pub contraindications: String,
    pub mnemonic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    /// True when `correct_answer` is exactly one of `options`.
    pub fn has_valid_answer(&self) -> bool {
        self.options.iter().any(|o| o == &self.correct_answer)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtcRecommendation {
    pub recommended_drug: String,
    pub reasoning: String,
    pub counseling_points: Vec<String>,
    pub warnings: Vec<String>,
    pub when_to_see_doctor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryNotes {
    pub title: String,
    pub summary_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjectives {
    pub main_topic: String,
    pub learning_objectives: Vec<String>,
}

/// Kind of study material extracted from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StudyContentType {
    #[default]
    Flashcards,
    SummaryNotes,
    LearningObjectives,
}

impl StudyContentType {
    pub const ALL: [StudyContentType; 3] = [
        StudyContentType::Flashcards,
        StudyContentType::SummaryNotes,
        StudyContentType::LearningObjectives,
    ];

    /// Human-readable label, also used inside prompts and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            StudyContentType::Flashcards => "Flashcards",
            StudyContentType::SummaryNotes => "Summary Notes",
            StudyContentType::LearningObjectives => "Learning Objectives",
        }
    }
}

impl fmt::Display for StudyContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StudyContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "flashcards" | "flashcard" => Ok(StudyContentType::Flashcards),
            "notes" | "summary notes" | "summary" => Ok(StudyContentType::SummaryNotes),
            "objectives" | "learning objectives" => Ok(StudyContentType::LearningObjectives),
            _ => Err(format!(
                "Unknown content type '{}'. Expected one of: flashcards, notes, objectives",
                s
            )),
        }
    }
}

/// Study material in the variant chosen by the caller's [`StudyContentType`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StudyContent {
    Flashcards(Vec<Flashcard>),
    SummaryNotes(SummaryNotes),
    LearningObjectives(LearningObjectives),
}

impl StudyContent {
    pub fn content_type(&self) -> StudyContentType {
        match self {
            StudyContent::Flashcards(_) => StudyContentType::Flashcards,
            StudyContent::SummaryNotes(_) => StudyContentType::SummaryNotes,
            StudyContent::LearningObjectives(_) => StudyContentType::LearningObjectives,
        }
    }
}

/// Result of a single gateway call. Serializes exactly as the model's JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum GeneratedContent {
    DrugCard(DrugCard),
    Quiz(Vec<QuizQuestion>),
    OtcRecommendation(OtcRecommendation),
    StudyContent(StudyContent),
}

// Configuration
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let request_timeout = match non_empty("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!("Invalid GEMINI_TIMEOUT_SECS '{}'", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
        })
    }
}
