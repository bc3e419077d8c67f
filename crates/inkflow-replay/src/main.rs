//! Replay a recorded input script and print canvas statistics.

use clap::Parser;
use inkflow_replay::{ReplayReport, ReplayResult, Script, replay, write_canvas};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inkflow-replay", about = "Replay recorded pointer input through the InkFlow engine")]
struct Cli {
    /// Input script (JSON).
    script: PathBuf,

    /// Write the resulting canvas as JSON.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn run(script_path: &Path, out: Option<&Path>) -> ReplayResult<ReplayReport> {
    let script = Script::load(script_path)?;
    let (engine, report) = replay(&script)?;
    if let Some(out) = out {
        write_canvas(&engine, out)?;
    }
    Ok(report)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    log::info!("Replaying {}", cli.script.display());
    match run(&cli.script, cli.out.as_deref()) {
        Ok(report) => {
            let stats = report.stats;
            println!("ops applied:      {}", report.applied);
            println!("ops rejected:     {}", report.rejected);
            println!("events:           {}", report.events);
            println!("layers:           {}", stats.total_layers);
            println!("strokes:          {}", stats.total_strokes);
            println!("points:           {}", stats.total_points);
            println!("avg points/stroke {:.2}", stats.average_stroke_length);
            println!("memory estimate:  {} bytes", stats.estimated_memory_bytes);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Replay failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
