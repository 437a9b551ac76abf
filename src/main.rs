use std::path::PathBuf;

use serde::Serialize;

use whatson::app::App;
use whatson::config::{Config, Settings};
use whatson::error::{AppError, Result};
use whatson::models::RawFeedItem;
use whatson::pipeline::ReferenceTime;

enum Command {
    Refresh,
    Input(PathBuf),
    Planner,
    Prune,
    ClearPlanner,
    Remove { day: String, id: String },
}

struct Args {
    command: Command,
    config: Option<PathBuf>,
    settings: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        command: Command::Refresh,
        config: None,
        settings: None,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| AppError::Config(format!("{} needs a value", flag)))
        };
        match arg.as_str() {
            "--refresh" => parsed.command = Command::Refresh,
            "--input" => parsed.command = Command::Input(PathBuf::from(value("--input")?)),
            "--planner" => parsed.command = Command::Planner,
            "--prune" => parsed.command = Command::Prune,
            "--clear-planner" => parsed.command = Command::ClearPlanner,
            "--remove" => {
                let day = value("--remove")?;
                let id = value("--remove")?;
                parsed.command = Command::Remove { day, id };
            }
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--settings" => parsed.settings = Some(PathBuf::from(value("--settings")?)),
            other => return Err(AppError::Config(format!("Unknown argument: {}", other))),
        }
    }

    Ok(parsed)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Only warnings and errors unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = &args.settings {
        config.settings = Settings::from_json_file(path)?;
    }

    let app = App::new(&config).await?;
    let reference = ReferenceTime::local_now();

    match args.command {
        Command::Refresh => {
            tokio::select! {
                report = app.refresh() => {
                    tracing::info!("Planned {} records", report.planned);
                    print_json(&report.digest)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("Refresh cancelled");
                }
            }
        }
        Command::Input(path) => {
            let content = std::fs::read_to_string(&path)?;
            let raw: Vec<RawFeedItem> = serde_json::from_str(&content)?;
            let report = app.run_batch(&raw, reference).await;
            print_json(&report.digest)?;
        }
        Command::Planner => print_json(&app.planner(reference).await?)?,
        Command::Prune => {
            let pruned = app.prune(reference).await?;
            println!("Pruned {} planner days", pruned);
        }
        Command::ClearPlanner => {
            app.clear_planner().await?;
            println!("Planner cleared");
        }
        Command::Remove { day, id } => {
            if app.remove_planned(&day, &id, reference).await? {
                println!("Removed {} from {}", id, day);
            } else {
                println!("Nothing planned with id {} on {}", id, day);
            }
        }
    }

    Ok(())
}
