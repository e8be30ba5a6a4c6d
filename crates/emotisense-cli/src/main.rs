use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use emotisense_core::export::{load_csv, save_csv, session_file_name};
use emotisense_core::{
    AffectMonitor, AffectSource, Clock, EmotiSenseConfig, Emotion, EmotionVector, FusionEngine,
    ManualClock, ReplaySource, SessionReport, SyntheticSource, SystemClock,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "emotisense", version, about = "Face/voice affect fusion")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a synthetic session and print its report as JSON
    Simulate {
        #[arg(long, default_value_t = 60)]
        ticks: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
        /// CSV file, or directory to place a generated file name in
        #[arg(long)]
        out: Option<PathBuf>,
        /// Phased demo (normal, stressed, happy, confused) instead of random switching
        #[arg(long)]
        scripted: bool,
    },
    /// Fuse one tick, e.g. --emotions "happy=0.6,neutral=0.3,surprise=0.1" --stress 0.2
    Fuse {
        #[arg(long)]
        emotions: String,
        #[arg(long)]
        stress: f32,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the report of a CSV export
    Report { csv: PathBuf },
    /// Write the default configuration
    InitConfig { path: PathBuf },
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "emotisense_core=info".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "emotisense=info".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<EmotiSenseConfig, Box<dyn std::error::Error>> {
    Ok(EmotiSenseConfig::load_layered(None, path)?)
}

/// Parse `label=p` pairs separated by commas. Labels not named stay 0.
fn parse_emotions(input: &str) -> Result<EmotionVector, Box<dyn std::error::Error>> {
    let mut face = EmotionVector::zeros();
    for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (label, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected label=probability, got `{pair}`"))?;
        let emotion: Emotion = label.trim().parse()?;
        let p: f32 = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid probability `{}` for {}", value.trim(), emotion))?;
        face.set(emotion, p);
    }
    Ok(face)
}

fn simulate(
    ticks: usize,
    seed: Option<u64>,
    config_path: Option<&Path>,
    out: Option<&Path>,
    scripted: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.simulation.seed = seed;
    }

    let clock = Arc::new(ManualClock::new(SystemClock.now_us()));
    let mut monitor = AffectMonitor::with_clock(&config, clock.clone());
    let mut synthetic = SyntheticSource::new(&config.simulation);
    let mut source: Box<dyn AffectSource> = if scripted {
        Box::new(ReplaySource::new(synthetic.scripted_session(ticks)))
    } else {
        Box::new(synthetic)
    };

    let interval_us = config.simulation.tick_interval_us();
    let id = monitor.start();
    let mut alerts = 0usize;
    for _ in 0..ticks {
        clock.advance(interval_us);
        let Some(outcome) = monitor.step(source.as_mut()) else {
            break;
        };
        if outcome.alert_raised {
            alerts += 1;
        }
    }
    let summary = monitor.stats();
    let records = monitor.stop();
    info!("session {} finished: {} ticks, {} alerts", id.short(), records.len(), alerts);

    if let Some(out) = out {
        let path = if out.is_dir() {
            out.join(session_file_name(id, summary.start_us))
        } else {
            out.to_path_buf()
        };
        save_csv(&path, &records)?;
    }

    let report = SessionReport::build(summary, &records);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Simulate {
            ticks,
            seed,
            config,
            out,
            scripted,
        } => {
            simulate(ticks, seed, config.as_deref(), out.as_deref(), scripted)?;
        }
        Commands::Fuse {
            emotions,
            stress,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let face = parse_emotions(&emotions)?;
            let metrics = FusionEngine::with_config(&config.fusion).fuse(&face, stress);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::Report { csv } => {
            let records = load_csv(&csv)?;
            let report = SessionReport::from_records(&records);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::InitConfig { path } => {
            EmotiSenseConfig::default().save_to_file(&path)?;
            info!("wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
