use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tour_lite::Service;
use tour_lite::config::ServiceConfig;
use tour_lite::controller::ApiResponse;
use tour_lite::utils::json::parse_json_object;

#[derive(Parser, Debug)]
#[command(name = "tourlite", version, about = "Tour collection CLI", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). Defaults to ./tourlite.toml when present.")]
    config: Option<PathBuf>,
    /// Override data path (takes precedence over config)
    #[arg(long, help = "Write-ahead log path for the collection. Takes precedence over config/env.")]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List tours; query parameters are given as a JSON object")]
    List {
        #[arg(long, help = "Query JSON (e.g., {\"price\": {\"lt\": 1000}, \"sort\": \"-price\"})")]
        query: Option<String>,
    },
    #[command(about = "Fetch one tour by id")]
    Get {
        #[arg(help = "Tour id")]
        id: String,
    },
    #[command(about = "Create a tour from a JSON body")]
    Create {
        #[arg(help = "Body JSON")]
        json: String,
    },
    #[command(about = "Update a tour with the fields of a JSON body")]
    Update {
        #[arg(help = "Tour id")]
        id: String,
        #[arg(help = "Body JSON")]
        json: String,
    },
    #[command(about = "Delete a tour by id")]
    Delete {
        #[arg(help = "Tour id")]
        id: String,
    },
}

fn load_config(cli: &Cli) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    // Precedence: CLI > env > config file > defaults
    let mut cfg = ServiceConfig::load(cli.config.as_deref())?;
    if let Some(p) = &cli.data {
        cfg.data_path = Some(p.clone());
    }
    Ok(cfg)
}

async fn run(cli: Cli) -> Result<ApiResponse, Box<dyn std::error::Error>> {
    let cfg = load_config(&cli)?;
    if cfg.log_dir.is_some() || cfg.log_level.is_some() {
        tour_lite::logger::init_from_config(&cfg)?;
    }
    let service = Service::open(&cfg)?;
    let controller = service.controller();
    let res = match cli.command {
        Commands::List { query } => {
            let params = match query {
                Some(q) => parse_json_object(&q)?,
                None => serde_json::Map::new(),
            };
            controller.list(&params).await
        }
        Commands::Get { id } => controller.get_one(&id).await,
        Commands::Create { json } => controller.create(&parse_json_object(&json)?).await,
        Commands::Update { id, json } => controller.update(&id, &parse_json_object(&json)?).await,
        Commands::Delete { id } => controller.delete(&id).await,
    };
    Ok(res)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(res) => {
            eprintln!("{}", res.status);
            println!("{}", res.body.to_json());
            if res.status.is_success() { ExitCode::SUCCESS } else { ExitCode::from(1) }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
