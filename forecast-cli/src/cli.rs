use std::future::Future;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use forecast_core::{
    AppState, Config, Coordinates, Dispatcher, GeolocationSource, LookupError, LookupResult,
    LookupState,
};
use inquire::{CustomType, InquireError, Password, Select, Text};
use tokio::sync::watch;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather conditions in your terminal")]
pub struct Cli {
    /// Minimum time (ms) a lookup is shown as loading; overrides the config.
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and location settings.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show current weather for your location.
    Here {
        /// Use this latitude instead of the configured location source.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Type city names at a prompt; `:here` uses your location, `:quit` exits.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(delay_ms) = self.delay_ms {
            config.reveal_delay_ms = delay_ms;
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, json } => {
                let dispatcher = Dispatcher::from_config(&config)?;
                dispatcher.update_city(city);
                let mut rx = dispatcher.subscribe();
                let result = follow(&mut rx, dispatcher.submit_city(), !json).await;
                finish(result, json)
            }
            Command::Here { lat, lon, json } => {
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.location = Some(Coordinates::new(lat, lon)?);
                    config.geolocation = GeolocationSource::Fixed;
                }
                let dispatcher = Dispatcher::from_config(&config)?;
                let mut rx = dispatcher.subscribe();
                let result = follow(&mut rx, dispatcher.lookup_by_location(), !json).await;
                finish(result, json)
            }
            Command::Interactive => interactive(Dispatcher::from_config(&config)?).await,
        }
    }
}

/// Drive a lookup to completion, printing each lookup state it passes through.
async fn follow<F>(rx: &mut watch::Receiver<AppState>, lookup: F, print: bool) -> LookupResult
where
    F: Future<Output = LookupResult>,
{
    let mut last = rx.borrow_and_update().lookup.clone();
    tokio::pin!(lookup);

    let result = loop {
        tokio::select! {
            result = &mut lookup => break result,
            changed = rx.changed() => {
                if changed.is_err() {
                    break lookup.as_mut().await;
                }
                let current = rx.borrow_and_update().lookup.clone();
                if print && current != last && !matches!(current, LookupState::Error(_)) {
                    println!("{}", render::status(&current, Local::now()));
                }
                last = current;
            }
        }
    };

    let current = rx.borrow_and_update().lookup.clone();
    if print && current != last && !matches!(current, LookupState::Error(_)) {
        println!("{}", render::status(&current, Local::now()));
    }

    result
}

fn finish(result: LookupResult, json: bool) -> Result<()> {
    match result {
        Ok(snapshot) if json => {
            let out = serde_json::to_string_pretty(snapshot.as_ref())
                .context("Failed to serialize weather snapshot")?;
            println!("{out}");
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(LookupError::EmptyInput) => Err(anyhow!("Enter a city name to look up.")),
        Err(err) => Err(err.into()),
    }
}

async fn interactive(dispatcher: Dispatcher) -> Result<()> {
    let mut rx = dispatcher.subscribe();
    println!("{}", render::status(&dispatcher.state(), Local::now()));

    loop {
        let initial = dispatcher.city();
        let prompt = tokio::task::spawn_blocking(move || {
            Text::new("Enter location")
                .with_initial_value(&initial)
                .with_help_message(":here uses your location, :quit exits")
                .prompt()
        })
        .await
        .context("Prompt task failed")?;

        let line = match prompt {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let line = line.trim().to_string();
        let result = match line.as_str() {
            ":quit" | ":q" => break,
            ":here" => follow(&mut rx, dispatcher.lookup_by_location(), false).await,
            _ => {
                dispatcher.update_city(line.clone());
                follow(&mut rx, dispatcher.submit_city(), false).await
            }
        };

        match result {
            Err(LookupError::EmptyInput) => debug!("empty input ignored"),
            _ => println!("\n{}\n", render::status(&dispatcher.state(), Local::now())),
        }
    }

    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let source = Select::new(
        "Where should \"my location\" come from?",
        GeolocationSource::all().to_vec(),
    )
    .prompt()
    .context("Failed to read location source")?;
    config.geolocation = source;

    if source == GeolocationSource::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .prompt()
            .context("Failed to read longitude")?;
        config.location = Some(Coordinates::new(latitude, longitude)?);
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
