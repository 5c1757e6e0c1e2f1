use anyhow::Result;
use clap::{Parser, Subcommand};
use pharmstudy::app::{App, Command};
use pharmstudy::models::{GeneratedContent, StudyContentType};
use pharmstudy::quiz::{self, QuizSession, DRUG_CLASSES};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pharmstudy")]
#[command(about = "AI-generated study aids for pharmacy students")]
struct CliArgs {
    /// Write the JSON result to this file instead of stdout.
    #[arg(long, short, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generate a study card for a drug.
    DrugCard {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Generate a multiple-choice quiz for a drug class.
    Quiz {
        #[arg(value_name = "DRUG_CLASS")]
        drug_class: String,
        /// Take the quiz in the terminal instead of printing it.
        #[arg(long, short)]
        interactive: bool,
    },
    /// Recommend an OTC product for a patient case.
    Otc {
        #[arg(value_name = "PATIENT_CASE")]
        patient_case: String,
    },
    /// Extract study materials from a PDF.
    Study {
        #[arg(value_name = "PDF")]
        path: PathBuf,
        /// flashcards, notes or objectives
        #[arg(long, short, default_value = "flashcards", value_parser = parse_content_type_arg)]
        content: StudyContentType,
    },
    /// List the suggested quiz categories.
    Classes,
}

fn parse_content_type_arg(input: &str) -> std::result::Result<StudyContentType, String> {
    input.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmstudy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let (command, interactive) = match args.command {
        CliCommand::Classes => {
            for class in DRUG_CLASSES {
                println!("{}", class);
            }
            return Ok(());
        }
        CliCommand::DrugCard { name } => (Command::DrugCard { name }, false),
        CliCommand::Quiz {
            drug_class,
            interactive,
        } => (Command::Quiz { drug_class }, interactive),
        CliCommand::Otc { patient_case } => (Command::Otc { patient_case }, false),
        CliCommand::Study { path, content } => (
            Command::Study {
                path,
                content_type: content,
            },
            false,
        ),
    };

    let app = match App::new(args.output) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = if interactive {
        match app.generate(command).await {
            Ok(GeneratedContent::Quiz(questions)) => take_quiz(questions).await,
            Ok(other) => app.write_output(&other).await.map_err(Into::into),
            Err(e) => Err(e.into()),
        }
    } else {
        app.run(command).await.map(|_| ()).map_err(Into::into)
    };

    if let Err(e) = outcome {
        error!("Generation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    info!("Done");
    Ok(())
}

async fn take_quiz(questions: Vec<pharmstudy::models::QuizQuestion>) -> Result<()> {
    let score = tokio::task::spawn_blocking(move || {
        let mut session = QuizSession::new(questions);
        let stdin = std::io::stdin();
        quiz::run_interactive(&mut session, stdin.lock(), std::io::stdout())
    })
    .await??;

    info!("Quiz finished with score {}", score);
    Ok(())
}
