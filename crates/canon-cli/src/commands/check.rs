use std::error::Error;
use std::process;

use canon_audit::FindingCounts;
use clap::Args;

use super::{print_json, PipelineArgs};

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// Emit findings as canonical JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let (_, run) = args.pipeline.run()?;
    let counts = FindingCounts::tally(&run.findings);
    if args.json {
        print_json(&run.findings)?;
    } else {
        for finding in &run.findings {
            println!("{finding}");
        }
        println!(
            "{} blocking, {} warning across {} entities",
            counts.blocking,
            counts.warning,
            run.registry.len()
        );
    }
    if counts.blocking > 0 {
        process::exit(2);
    }
    Ok(())
}
