use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use netpredict::config::PipelineConfig;
use netpredict::data::{LocalFileProvider, RecordProvider, RemoteDocumentStoreProvider};
use netpredict::pipeline;
use netpredict::record::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Local CSV, JSON or JSON-lines export.
    Csv,
    /// Firestore REST API.
    Firestore,
}

/// Trains a throughput model from network-quality logs and saves it.
#[derive(Parser, Debug)]
#[command(name = "throughput_model")]
struct Cli {
    /// Where to read records from.
    #[arg(long, value_enum, default_value_t = Source::Csv)]
    source: Source,

    /// Path of the local export, overrides the config file.
    #[arg(long)]
    csv_path: Option<PathBuf>,

    /// Firestore project id, required with `--source firestore`.
    #[arg(long)]
    project: Option<String>,

    /// Firestore collection holding the logs.
    #[arg(long)]
    collection: Option<String>,

    /// Firestore endpoint override.
    #[arg(long)]
    base_url: Option<String>,

    /// Output path of the model artifact.
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Column to predict: download_mbps or upload_mbps.
    #[arg(long)]
    target: Option<Target>,

    /// JSON file with pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reject the model when held-out R² is lower than this.
    #[arg(long)]
    min_r2: Option<f64>,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::new(),
        };
        if let Some(path) = &self.csv_path {
            config = config.with_csv_path(path);
        }
        if let Some(path) = &self.model_out {
            config = config.with_model_out(path);
        }
        if let Some(target) = self.target {
            config = config.with_target(target);
        }
        if self.min_r2.is_some() {
            config = config.with_min_r2(self.min_r2);
        }
        Ok(config)
    }

    fn provider(
        &self,
        config: &PipelineConfig,
    ) -> Result<Box<dyn RecordProvider>, Box<dyn std::error::Error>> {
        match self.source {
            Source::Csv => Ok(Box::new(LocalFileProvider::new(&config.csv_path))),
            Source::Firestore => {
                let project = self
                    .project
                    .as_deref()
                    .ok_or("--project is required with --source firestore")?;
                let mut provider = RemoteDocumentStoreProvider::new(project);
                if let Some(collection) = &self.collection {
                    provider = provider.with_collection(collection);
                }
                if let Some(base_url) = &self.base_url {
                    provider = provider.with_base_url(base_url);
                }
                Ok(Box::new(provider))
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let provider = cli.provider(&config)?;
    info!("Training {} model, artifact goes to {}", config.target, config.model_out.display());

    let result = pipeline::execute(provider.as_ref(), &config)?;

    println!(
        "Model trained successfully on {} records ({} held out, {} dropped).",
        result.train_size, result.test_size, result.dropped
    );
    println!("MSE: {:.4}", result.report.mse);
    println!("R² Score: {:.4}", result.report.r2);
    println!("Model saved to {}", config.model_out.display());
    let demo = config.demo_input;
    println!(
        "Predicted {} speed at signal {} dBm, lat {}, lon {}: {:.2} Mbps",
        match config.target {
            Target::DownloadMbps => "download",
            Target::UploadMbps => "upload",
        },
        demo.signal_dbm,
        demo.latitude,
        demo.longitude,
        result.demo_prediction
    );

    Ok(())
}
