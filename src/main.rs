use std::error::Error;
use std::path::PathBuf;

use ar_ruler::session::{MockSession, Scenario, StepReport};
use ar_ruler::utils::logger::{init_with_level, level_from_verbosity};
use ar_ruler::{ConfigurationManager, MeasurementEngine};
use clap::Parser;

/// Replay a scripted AR session through the measurement engine.
#[derive(Debug, Parser)]
#[command(author, version, about = "Replay an AR ruler scenario against the mock session")]
struct Args {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Engine configuration JSON. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calibration scale restored before the first step
    #[arg(long)]
    scale: Option<f64>,

    /// Print only the final step
    #[arg(long)]
    last: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn replay(args: &Args) -> Result<Vec<StepReport>, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => ConfigurationManager::from_file(path)?.config().clone(),
        None => Default::default(),
    };
    let scenario = Scenario::load(&args.scenario)?;

    let mut engine = MeasurementEngine::new(config)?;
    if let Some(scale) = args.scale {
        engine.restore_scale(scale);
    }
    let mut session = MockSession::new();

    let reports = scenario.replay(&mut engine, &mut session);
    log::info!(
        "{} steps replayed, {} anchors still live",
        reports.len(),
        session.live_anchor_count()
    );
    Ok(reports)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_with_level(level_from_verbosity(args.verbose))?;

    let reports = replay(&args)?;
    let shown = if args.last {
        reports.last().into_iter().collect::<Vec<_>>()
    } else {
        reports.iter().collect()
    };
    for report in shown {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}
