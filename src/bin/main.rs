use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use snapcheck::{EokaEngine, RunResult, RunStatus, Scenario, StepStatus};

#[derive(Parser)]
#[command(name = "snapcheck")]
#[command(about = "Scripted UI verification with screenshots")]
#[command(version)]
struct Cli {
    /// Scenario config files to run, in order
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Base URL override applied to every scenario
    #[arg(long, env = "SNAPCHECK_BASE_URL")]
    base_url: Option<String>,

    /// Validate configs without launching a browser
    #[arg(long)]
    check: bool,

    /// Print each run result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> snapcheck::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut scenarios = Vec::new();
    for path in &cli.scenarios {
        let mut scenario = Scenario::load(path)?;
        if let Some(ref base) = cli.base_url {
            scenario.target.url = base.clone();
        }
        if cli.headless {
            scenario.browser.headless = true;
        }
        scenarios.push(scenario);
    }

    if cli.check {
        for scenario in &scenarios {
            println!("Config valid: {}", scenario.name);
            println!("  Target: {}", scenario.target.url);
            println!("  Artifacts: {}", scenario.artifacts.dir);
            println!("  Steps: {}", scenario.steps.len());
            for (i, step) in scenario.steps.iter().enumerate() {
                println!("    {:02} {} ({})", i + 1, step.label, step.locate);
            }
        }
        return Ok(());
    }

    let mut all_ok = true;
    for scenario in &scenarios {
        println!("Running: {}", scenario.name);

        let engine = EokaEngine::launch(&scenario.browser).await?;
        // Ctrl-C is routed through the run so an interrupted scenario still
        // releases its browser before the process exits.
        let result = snapcheck::run_scenario_until(engine, scenario, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

        all_ok &= result.succeeded();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_summary(&result);
        }
    }

    if !all_ok {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(result: &RunResult) {
    println!();
    match result.status {
        RunStatus::Completed => println!("✓ Completed"),
        RunStatus::Failed { step, reason } => {
            println!("✗ Failed at step {} ({:?})", step + 1, reason);
        }
    }
    for outcome in &result.outcomes {
        let mark = match outcome.status {
            StepStatus::Success => "✓",
            StepStatus::Failed(_) => "✗",
        };
        match (&outcome.artifact, &outcome.error) {
            (Some(path), _) => println!("  {} {} -> {}", mark, outcome.label, path.display()),
            (None, Some(error)) => println!("  {} {}: {}", mark, outcome.label, error),
            (None, None) => println!("  {} {}", mark, outcome.label),
        }
    }
    println!("  Artifacts: {}", result.artifacts.len());
    println!("  Duration: {}ms", result.duration_ms);
}
