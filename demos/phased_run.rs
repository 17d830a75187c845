//! Console run of a full supervised crew:
//!
//! ```text
//! cargo run --example phased_run --features logging -- <phases> <substeps> <prob1> [<prob2> ...]
//! ```
//!
//! Spawns one worker per probability, runs them through the phases with
//! acknowledgment barriers, and prints the final statistics table.

use std::process::ExitCode;
use std::sync::Arc;

use phasevisor::{LogWriter, RunConfig, Subscribe, Supervisor};

fn usage(program: &str) -> ExitCode {
    eprintln!("Usage: {program} <phases> <substeps> <prob1> [<prob2> ...]");
    eprintln!("  phases:   1-10");
    eprintln!("  substeps: 1-10");
    eprintln!("  probN:    issue probability 0-100, one per worker");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "phased_run".into());

    let parsed: Option<Vec<u32>> = args.map(|a| a.parse().ok()).collect();
    let Some(values) = parsed else {
        return usage(&program);
    };
    if values.len() < 3 {
        return usage(&program);
    }

    let cfg = RunConfig::new(values[0], values[1], values[2..].to_vec());
    if let Err(e) = cfg.validate() {
        eprintln!("{program}: {e}");
        return ExitCode::FAILURE;
    }

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let sup = Supervisor::new(cfg, subs);

    match sup.run().await {
        Ok(report) => {
            println!();
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{program}: {e}");
            ExitCode::FAILURE
        }
    }
}
