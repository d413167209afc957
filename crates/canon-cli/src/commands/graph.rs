use std::error::Error;

use canon_graph::GraphEdge;
use clap::Args;
use serde::Serialize;

use super::{print_json, PipelineArgs};

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// Emit the graph as canonical JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct GraphListing {
    edges: Vec<GraphEdge>,
    topological_order: Vec<String>,
    mutual_pairs: Vec<(String, String)>,
}

pub fn run(args: &GraphArgs) -> Result<(), Box<dyn Error>> {
    let (_, run) = args.pipeline.run()?;
    let graph = match run.graph {
        Ok(graph) => graph,
        Err(err) => {
            for line in err.lines() {
                eprintln!("{line}");
            }
            return Err(err.into());
        }
    };
    let listing = GraphListing {
        edges: graph.edges(),
        topological_order: graph.topological_order(),
        mutual_pairs: graph.mutual_pairs().to_vec(),
    };
    if args.json {
        return print_json(&listing);
    }
    for edge in &listing.edges {
        println!("{} -[{:?}]-> {}", edge.from, edge.kind, edge.to);
    }
    println!("order: {}", listing.topological_order.join(", "));
    for (a, b) in &listing.mutual_pairs {
        println!("mutual: {a} <-> {b}");
    }
    Ok(())
}
