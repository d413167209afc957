use std::error::Error;

use canon_core::Deviation;
use clap::Args;

use super::{print_json, PipelineArgs};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// Emit validation records as canonical JSON.
    #[arg(long)]
    pub json: bool,
}

fn deviation(value: Option<Deviation>) -> String {
    match value {
        Some(Deviation::Sigma(sigma)) => format!("{sigma}σ"),
        Some(Deviation::Relative(rel)) => format!("{rel} rel"),
        Some(Deviation::Absolute(abs)) => format!("{abs} abs"),
        None => "-".to_string(),
    }
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let (_, run) = args.pipeline.run()?;
    if args.json {
        print_json(&run.validation.records)?;
    } else {
        for (id, record) in &run.validation.records {
            let ratio = record
                .bound
                .as_ref()
                .and_then(|bound| bound.ratio)
                .map(|ratio| format!(" ratio={ratio}"))
                .unwrap_or_default();
            println!(
                "{id:<24} {:<12} {}{ratio}",
                record.status_label(),
                deviation(record.deviation)
            );
        }
        let counts = run.validation.counts();
        println!(
            "pass={} (exact={}) check={} fail={} speculative={}",
            counts.pass, counts.exact, counts.check, counts.fail, counts.speculative
        );
    }
    for err in &run.validation.errors {
        eprintln!("{err}");
    }
    if !run.validation.errors.is_empty() {
        return Err(format!("{} validation error(s)", run.validation.errors.len()).into());
    }
    Ok(())
}
