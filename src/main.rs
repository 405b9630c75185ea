// Command line front end for the cardiovascular risk pipeline

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arogy::{
    utils::ErrorKind,
    validation::VitalsInput,
    AppConfig, RiskAssessor, RiskError,
};
use clap::{Parser, Subcommand};
use log::error;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "arogy", version, about = "Cardiovascular risk assessment from vitals or scanned reports")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding scaler.json and heart_attack_model.json
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify numeric vitals
    Predict {
        #[arg(long)]
        age: Option<f64>,
        #[arg(long)]
        blood_pressure: Option<f64>,
        #[arg(long)]
        cholesterol: Option<f64>,
        /// Request body, e.g. '{"Age": 63, "BloodPressure": 145, "Cholesterol": 230}'
        #[arg(long, conflicts_with_all = ["age", "blood_pressure", "cholesterol"])]
        json: Option<String>,
    },
    /// Read a scanned report and print the extracted record
    Extract { image: PathBuf },
    /// Extract fields from text an OCR engine already produced
    ExtractText { file: PathBuf },
    /// Read a scanned report and classify it
    Assess { image: PathBuf },
    /// Check that the model artifacts load
    Status,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            println!("{}", serde_json::to_string_pretty(&err.to_body()).unwrap_or_default());
            match err.kind() {
                ErrorKind::Client => ExitCode::from(2),
                ErrorKind::Internal | ErrorKind::Startup => ExitCode::from(1),
            }
        }
    }
}

fn run(cli: Cli) -> Result<Value, RiskError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(assets) = cli.assets {
        config.assets_dir = assets;
    }

    match cli.command {
        Command::ExtractText { file } => {
            let text = fs::read_to_string(&file).map_err(|e| {
                RiskError::ClientInput(format!("Failed to read {}: {}", file.display(), e))
            })?;
            to_json(&RiskAssessor::extract_text(&text).record)
        }
        Command::Predict {
            age,
            blood_pressure,
            cholesterol,
            json,
        } => {
            let assessor = RiskAssessor::from_config(&config)?;
            let assessment = match (json, age, blood_pressure, cholesterol) {
                (Some(body), _, _, _) => assessor.predict_json(&body)?,
                (None, Some(age), Some(blood_pressure), Some(cholesterol)) => {
                    assessor.predict(&VitalsInput {
                        age,
                        blood_pressure,
                        cholesterol,
                    })?
                }
                _ => {
                    return Err(RiskError::ClientInput(
                        "Provide --json or all of --age, --blood-pressure and --cholesterol"
                            .to_string(),
                    ))
                }
            };
            to_json(&assessment)
        }
        Command::Extract { image } => {
            let assessor = RiskAssessor::from_config(&config)?;
            let report = assessor.extract_document(&read_image(&image)?)?;
            to_json(&report.record)
        }
        Command::Assess { image } => {
            let assessor = RiskAssessor::from_config(&config)?;
            to_json(&assessor.assess_document(&read_image(&image)?)?)
        }
        Command::Status => {
            let assessor = RiskAssessor::from_config(&config)?;
            to_json(&assessor.status())
        }
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>, RiskError> {
    fs::read(path)
        .map_err(|e| RiskError::ClientInput(format!("Failed to read {}: {}", path.display(), e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RiskError> {
    serde_json::to_value(value)
        .map_err(|e| RiskError::InvalidInput(format!("Failed to serialize output: {}", e)))
}
