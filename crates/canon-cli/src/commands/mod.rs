use std::error::Error;
use std::path::PathBuf;

use canon_export::{run_pipeline, PipelineConfig, PipelineRun};
use clap::Args;

pub mod check;
pub mod export;
pub mod graph;
pub mod resolve;
pub mod validate;

/// Inputs shared by every command that runs the pipeline.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Definition roots (directories or single files).
    #[arg(long = "definitions", value_name = "PATH", required = true)]
    pub definitions: Vec<PathBuf>,
    /// YAML pipeline configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl PipelineArgs {
    pub fn config(&self) -> Result<PipelineConfig, Box<dyn Error>> {
        match &self.config {
            Some(path) => Ok(PipelineConfig::load(path)?),
            None => Ok(PipelineConfig::default()),
        }
    }

    pub fn run(&self) -> Result<(PipelineConfig, PipelineRun), Box<dyn Error>> {
        let config = self.config()?;
        let run = run_pipeline(&self.definitions, &config)?;
        Ok((config, run))
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let bytes = canon_core::serde::to_canonical_json_pretty(value)?;
    println!("{}", String::from_utf8(bytes)?);
    Ok(())
}
