use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stellarisparse::parse;

#[derive(Parser)]
#[command(name = "stellarisparse")]
#[command(about = "Extract normalized empire data from Stellaris gamestate files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gamestate metadata without a full dump
    Info {
        /// Path to the extracted gamestate file
        gamestate: PathBuf,
    },

    /// Parse a gamestate and dump the extracted records as JSON
    Dump {
        /// Path to the extracted gamestate file
        gamestate: PathBuf,

        /// Write JSON to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Info { gamestate } => {
            let result = parse::load_save(&gamestate)?;

            println!("\n=== Gamestate Info ===");
            println!("Date: {}", result.game_date);
            println!("Tick: {}", result.tick);
            println!();
            println!("Countries: {}", result.countries.len());
            println!("Budget line items: {}", result.budget_line_items.len());
            println!("Species rows: {}", result.species_populations.len());
            println!(
                "Global species rows: {}",
                result.global_species_populations.len()
            );
            println!("Wars: {}", result.wars.len());

            if !result.countries.is_empty() {
                println!();
                println!("Sample countries:");
                for country in result.countries.iter().take(5) {
                    println!(
                        "  {}: {} (military={}, pops={})",
                        country.country_id,
                        country.name,
                        country.military_power,
                        country.num_sapient_pops
                    );
                }
                if result.countries.len() > 5 {
                    println!("  ... and {} more", result.countries.len() - 5);
                }
            }
        }

        Commands::Dump { gamestate, output } => {
            let result = parse::load_save(&gamestate)?;

            let json = serde_json::to_string_pretty(&result)?;
            if let Some(path) = output {
                std::fs::write(&path, &json)?;
                log::info!("Dump written to: {}", path.display());
            } else {
                println!("{}", json);
            }
        }
    }

    Ok(())
}
