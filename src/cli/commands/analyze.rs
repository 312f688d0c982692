//! Analyze Command
//!
//! Loads configuration, wires the provider into the pipeline, runs one
//! bundle and emits the report as JSON (stdout or `--output` file).

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::ai::OpenAiProvider;
use crate::config::ConfigLoader;
use crate::pipeline::{AnalysisPipeline, AnalysisRequest};

/// Options gathered from the command line.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Bundle directory with the edital files
    pub bundle: PathBuf,
    /// Product or service to look for
    pub target: String,
    /// Minimum unit volume; 0 disables the quantity check
    pub threshold: u64,
    /// Skip target analysis and treat the bundle as matching
    pub force_match: bool,
    /// Where to write the JSON report; stdout when absent
    pub output: Option<PathBuf>,
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Model override
    pub model: Option<String>,
}

pub async fn run(options: AnalyzeOptions) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load(options.config.as_deref())?;
    if let Some(model) = options.model {
        config.llm.model = model;
    }

    let provider = Arc::new(OpenAiProvider::new(config.llm.clone())?);
    let pipeline = AnalysisPipeline::new(provider, config.pipeline_options());

    let request = AnalysisRequest {
        bundle_dir: options.bundle,
        target: options.target,
        threshold: options.threshold,
        force_match: options.force_match,
    };

    let report = pipeline.run(&request).await;
    let json = serde_json::to_string_pretty(&report)?;

    match options.output {
        Some(path) => {
            std::fs::write(&path, &json)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
