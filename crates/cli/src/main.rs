use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hastane_core::config::{database_url_from_env_value, resolve_views_dir};
use hastane_core::constants::{DEFAULT_PORT, VIEWS_DIR};
use hastane_core::form::params_from_values;
use hastane_core::{GetBehaviour, HastaneConfig, PgExecutor, Route, StatementExecutor};

#[derive(Parser)]
#[command(name = "hastane")]
#[command(about = "Hastane hospital administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route with its statement arity and view
    Routes,
    /// Compile the views directory and check every route has its view
    CheckViews {
        /// Views directory (defaults to the workspace views)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Execute one statement against DATABASE_URL and print the outcome as JSON
    Exec {
        /// Statement key, e.g. hasta_listele
        key: String,
        /// Positional values; empty strings become NULL
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Routes) => {
            for route in Route::all() {
                let methods = match route.get_behaviour() {
                    GetBehaviour::Execute => "GET",
                    GetBehaviour::ShowForm => "GET,POST",
                };
                println!(
                    "{:<50} {:<9} params={} view={}",
                    route.path(),
                    methods,
                    route.statement().arity,
                    route.view()
                );
            }
        }
        Some(Commands::CheckViews { dir }) => {
            let dir = resolve_views_dir(dir)?;
            match hastane_web::load_views(&dir) {
                Ok(views) => println!("{} views compiled from {}", views.len(), dir.display()),
                Err(e) => {
                    eprintln!("Error checking views: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Exec { key, values }) => {
            let route: Route = key.parse()?;
            let cfg = HastaneConfig::new(
                database_url_from_env_value(std::env::var("DATABASE_URL").ok())?,
                DEFAULT_PORT,
                1,
                PathBuf::from(VIEWS_DIR),
            )?;
            let executor = PgExecutor::connect(&cfg).await?;

            match executor.execute(route, params_from_values(values)).await {
                Ok(rows) => println!("{}", serde_json::to_string_pretty(&rows)?),
                Err(e) => {
                    eprintln!("{}", serde_json::to_string_pretty(&e)?);
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("Use 'hastane --help' for commands");
        }
    }

    Ok(())
}
