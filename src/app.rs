//! Application orchestration: validate input, call the gateway, emit JSON.

use crate::ai::{GeminiTextClient, TextGenerationService};
use crate::models::{Config, GeneratedContent, StudyContentType};
use crate::{validation, Error, Gateway, GenerationInput, GenerationKind, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MISSING_DOCUMENT: &str = "Please select a file to generate study materials.";

/// One user request, as collected by the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DrugCard {
        name: String,
    },
    Quiz {
        drug_class: String,
    },
    Otc {
        patient_case: String,
    },
    Study {
        path: PathBuf,
        content_type: StudyContentType,
    },
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub model: Box<dyn TextGenerationService>,
}

pub struct App {
    gateway: Gateway,
    output_path: Option<PathBuf>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, output_path: Option<PathBuf>) -> Self {
        Self {
            gateway: Gateway::new(services.model),
            output_path,
        }
    }

    pub fn from_config(config: &Config, output_path: Option<PathBuf>) -> Self {
        info!("Model provider: Gemini (model: {})", config.gemini_model);

        let model = GeminiTextClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )
        .with_base_url(config.gemini_base_url.clone())
        .with_timeout(config.request_timeout);

        Self::with_services(
            AppServices {
                model: Box::new(model),
            },
            output_path,
        )
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new(output_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config, output_path))
    }

    /// Validate the command's input locally, then run one generation.
    pub async fn generate(&self, command: Command) -> Result<GeneratedContent> {
        let (kind, input) = match command {
            Command::DrugCard { name } => (
                GenerationKind::DrugCard,
                GenerationInput::Text(validation::drug_name(&name)?),
            ),
            Command::Quiz { drug_class } => (
                GenerationKind::Quiz,
                GenerationInput::Text(validation::drug_class(&drug_class)?),
            ),
            Command::Otc { patient_case } => (
                GenerationKind::OtcRecommendation,
                GenerationInput::Text(validation::patient_case(&patient_case)?),
            ),
            Command::Study { path, content_type } => {
                let data = read_document(&path).await?;
                let mime_type = validation::pdf_document(&data)?;
                info!(
                    "Loaded {} ({} bytes) for {}",
                    path.display(),
                    data.len(),
                    content_type
                );
                (
                    GenerationKind::StudyContent(content_type),
                    GenerationInput::document(data, mime_type),
                )
            }
        };

        self.gateway.generate(kind, input).await
    }

    /// Generate and emit the result.
    pub async fn run(&self, command: Command) -> Result<GeneratedContent> {
        let content = self.generate(command).await?;
        self.write_output(&content).await?;
        Ok(content)
    }

    /// Pretty JSON to the configured output file, or stdout.
    pub async fn write_output(&self, content: &GeneratedContent) -> Result<()> {
        let json = serde_json::to_string_pretty(content)?;

        match &self.output_path {
            Some(path) => {
                tokio::fs::write(path, format!("{}\n", json)).await?;
                info!("Wrote result to {}", path.display());
            }
            None => println!("{}", json),
        }

        Ok(())
    }
}

async fn read_document(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Document not found: {}", path.display());
            Err(Error::InvalidInput(MISSING_DOCUMENT.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
