use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "driver-care-cli")]
#[command(about = "Command-line client for the DriverCare vehicle API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "DRIVER_CARE_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Vehicle to query (defaults to the service's simulated vehicle)
    #[arg(long)]
    vehicle: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current vehicle status
    Status,
    /// Start the simulation
    Start,
    /// Stop the simulation
    Stop,
    /// Toggle media play/pause
    ToggleMedia,
    /// Set media volume (0-100)
    Volume { volume: i32 },
    /// Set cabin temperature in °C (16-30)
    Temperature { temperature: f64 },
    /// Set fan speed (1-5)
    Fan { speed: i32 },
    /// Cycle the climate mode
    ClimateMode,
    /// List the most recent telemetry records
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Average speed and distance since a timestamp
    Stats {
        /// ISO-8601 timestamp, e.g. 2024-01-01T10:00:00
        #[arg(long)]
        since: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let base = format!("{}/api/vehicle", cli.url.trim_end_matches('/'));
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(vehicle) = cli.vehicle {
        query.push(("vehicleId", vehicle));
    }

    let request = match cli.command {
        Commands::Status => client.get(format!("{base}/status")),
        Commands::Start => client.post(format!("{base}/simulation/start")),
        Commands::Stop => client.post(format!("{base}/simulation/stop")),
        Commands::ToggleMedia => client.post(format!("{base}/media/toggle")),
        Commands::Volume { volume } => client
            .post(format!("{base}/media/volume"))
            .query(&[("volume", volume)]),
        Commands::Temperature { temperature } => client
            .post(format!("{base}/climate/temperature"))
            .query(&[("temperature", temperature)]),
        Commands::Fan { speed } => client
            .post(format!("{base}/climate/fan"))
            .query(&[("fanSpeed", speed)]),
        Commands::ClimateMode => client.post(format!("{base}/climate/mode")),
        Commands::Recent { limit } => {
            query.push(("limit", limit.to_string()));
            client.get(format!("{base}/data/recent")).query(&query)
        }
        Commands::Stats { since } => {
            query.push(("startTime", since));
            client.get(format!("{base}/data/statistics")).query(&query)
        }
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {status}");
        eprintln!("Response: {text}");
        return Ok(false);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(true)
}
