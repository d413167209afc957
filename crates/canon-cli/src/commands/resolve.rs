use std::error::Error;
use std::fs;
use std::path::PathBuf;

use canon_export::ConsumerDocument;
use clap::Args;

use super::print_json;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Published export document.
    pub document: PathBuf,
    /// Addresses such as `formula.<id>` or `<category>.<id>`.
    #[arg(required_unless_present = "list")]
    pub addresses: Vec<String>,
    /// List every resolvable address instead.
    #[arg(long)]
    pub list: bool,
    /// Emit resolutions as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &ResolveArgs) -> Result<(), Box<dyn Error>> {
    let document = ConsumerDocument::from_slice(&fs::read(&args.document)?)?;
    if args.list {
        for address in document.addresses() {
            println!("{address}");
        }
        return Ok(());
    }
    for raw in &args.addresses {
        let resolution = document.resolve(raw);
        if args.json {
            print_json(&resolution)?;
        } else {
            print!("{resolution}");
            if resolution.is_placeholder() {
                println!();
            }
        }
    }
    Ok(())
}
