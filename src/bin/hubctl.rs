use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "hubctl")]
#[command(about = "Management CLI for the facet hub service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service status and allow-list sizes per hub type
    Status,
    /// Allow-list of one hub type
    AllowList {
        hub_type: String,
        #[arg(long)]
        min_count: Option<u64>,
    },
    /// Resolvable hubs below the indexing population
    ThinHubs,
    /// Show how a hub path resolves
    Resolve { path: String },
    /// Drop cached allow-lists (all hub types unless one is given)
    Invalidate {
        #[arg(long)]
        hub_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)),
        Commands::AllowList { hub_type, min_count } => {
            let request = client.get(format!("{}/admin/allow-list/{}", base, hub_type));
            match min_count {
                Some(n) => request.query(&[("min_count", n)]),
                None => request,
            }
        }
        Commands::ThinHubs => client.get(format!("{}/admin/thin-hubs", base)),
        Commands::Resolve { path } => client.get(format!("{}/admin/resolve", base)).query(&[("path", path)]),
        Commands::Invalidate { hub_type } => {
            let request = client.post(format!("{}/admin/cache/invalidate", base));
            match hub_type {
                Some(t) => request.query(&[("hub_type", t)]),
                None => request,
            }
        }
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
