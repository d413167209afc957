use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::PipelineArgs;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// Destination of the export document.
    #[arg(long)]
    pub out: PathBuf,
    /// Indent the document regardless of the configuration.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    let (mut config, run) = args.pipeline.run()?;
    config.export.pretty |= args.pretty;
    let document = run.publish(&config, &args.out)?;
    println!(
        "{} formulas, {} parameters -> {} ({})",
        document.summary.formulas,
        document.summary.parameters,
        args.out.display(),
        document.content_hash
    );
    Ok(())
}
