#![deny(warnings)]

//! Headless CLI: run a campus for a number of ticks, optionally replaying a
//! command script and saving or loading the game.

use anyhow::{anyhow, Context, Result};
use sim_core::{Catalog, SimConfig};
use sim_econ::{Command, Engine, Rejection};
use sim_runtime::{RunSummary, SharedEngine, TickDriver};
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    ticks: u64,
    config: Option<String>,
    catalog: Option<String>,
    script: Option<String>,
    load: Option<String>,
    save: Option<String>,
    realtime: bool,
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Args {
    let mut args = Args::default();
    let mut it = argv.into_iter().peekable();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--ticks" => args.ticks = it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
            "--config" => args.config = it.next(),
            "--catalog" => args.catalog = it.next(),
            "--script" => args.script = it.next(),
            "--load" => args.load = it.next(),
            // a bare `--save` writes to the default location
            "--save" => {
                args.save = Some(
                    it.next_if(|a| !a.starts_with("--"))
                        .unwrap_or_else(|| persistence::default_save_path().to_string()),
                )
            }
            "--realtime" => args.realtime = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn read(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {path}"))
}

fn load_engine(args: &Args) -> Result<Engine> {
    let catalog = match &args.catalog {
        Some(path) if path.ends_with(".json") => {
            Catalog::from_json_str(&read(path)?).with_context(|| format!("catalog {path}"))?
        }
        Some(path) => {
            Catalog::from_yaml_str(&read(path)?).with_context(|| format!("catalog {path}"))?
        }
        None => Catalog::standard(),
    };
    let config = match &args.config {
        Some(path) => {
            SimConfig::from_yaml_str(&read(path)?).with_context(|| format!("config {path}"))?
        }
        None => SimConfig::default(),
    };
    let engine = match &args.load {
        Some(path) => {
            let save = persistence::load_from_path(path, &catalog)?;
            Engine::from_state(catalog, config, save.state)?
        }
        None => Engine::new(catalog, config)?,
    };
    Ok(engine)
}

/// Replay a YAML list of commands. Rejections are reported, tallied by
/// category and skipped.
fn run_script(engine: &mut Engine, path: &str) -> Result<(usize, BTreeMap<Rejection, usize>)> {
    let commands: Vec<Command> =
        serde_yaml::from_str(&read(path)?).with_context(|| format!("script {path}"))?;
    let mut rejected = BTreeMap::new();
    for command in &commands {
        if let Err(err) = engine.execute(command.clone()) {
            let kind = err.rejection();
            warn!(command = command.name(), ?kind, error = %err, "command rejected");
            *rejected.entry(kind).or_insert(0) += 1;
        }
    }
    Ok((commands.len(), rejected))
}

/// Wall-clock time covering `ticks` periods, with half a period of slack.
fn realtime_wait(period: Duration, ticks: u64) -> Result<Duration> {
    u32::try_from(ticks)
        .ok()
        .and_then(|n| period.checked_mul(n))
        .and_then(|d| d.checked_add(period / 2))
        .ok_or_else(|| anyhow!("{ticks} ticks of {period:?} is too long to run in real time"))
}

/// Tick on the wall clock at the configured period.
fn run_realtime(engine: Engine, ticks: u64) -> Result<(Engine, RunSummary)> {
    let shared = SharedEngine::new(engine);
    let period = shared.period();
    let wait = realtime_wait(period, ticks)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(async {
        let driver = TickDriver::spawn(shared.clone(), period)?;
        tokio::time::sleep(wait).await;
        driver.stop().await
    })?;
    let engine = shared
        .into_inner()
        .map_err(|_| anyhow!("engine still shared after the driver stopped"))?;
    Ok((engine, summary))
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args(std::env::args().skip(1));
    info!(?args, "starting CLI");

    let mut engine = load_engine(&args)?;
    if let Some(path) = &args.script {
        let (total, rejected) = run_script(&mut engine, path)?;
        info!(total, ?rejected, "script replayed");
    }

    let (mut engine, summary) = if args.realtime {
        run_realtime(engine, args.ticks)?
    } else {
        let summary = sim_runtime::fast_forward(&mut engine, args.ticks);
        (engine, summary)
    };
    engine.dismiss_message();

    let s = engine.state();
    println!(
        "Campus OK | rooms unlocked: {}/{} | techs: {} | students: {}",
        s.rooms.iter().filter(|r| r.unlocked).count(),
        s.rooms.len(),
        s.unlocked_techs.len(),
        s.student_count
    );
    println!(
        "KPI | ticks: {} | money: ${} (+{}) | research: {} RP (+{}) | CO2: {}/{} | energy: {}/{} | brownouts: {}",
        summary.ticks,
        s.money.round_dp(2),
        summary.money_credited.round_dp(2),
        s.research,
        summary.research_credited,
        s.co2,
        s.co2_ceiling,
        s.energy_usage,
        s.energy_capacity,
        summary.brownout_ticks
    );

    if let Some(path) = &args.save {
        persistence::save_to_path(path, s)?;
    }
    Ok(())
}
