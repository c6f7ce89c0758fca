use anyhow::bail;
use clap::Parser;

mod cli;
mod config;
mod engine;
mod storage;
#[cfg(test)]
mod tests;
mod web;

use config::Config;
use engine::MappingService;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let config = Config::load();

    match args.command {
        cli::Command::Map {
            categories,
            threshold,
            compact,
        } => {
            if categories.is_empty() {
                bail!("at least one category is required");
            }

            let service = MappingService::from_config(&config)?;
            let mappings = service.map_categories(&categories, threshold)?;

            if compact {
                for mapping in &mappings {
                    println!("{}: {}", mapping.category, mapping.interests.join(", "));
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&mappings).unwrap());
            }
            Ok(())
        }

        cli::Command::Interests {} => {
            for interest in engine::canonical_interests() {
                println!("{interest}");
            }
            Ok(())
        }

        cli::Command::Daemon {} => {
            let service = MappingService::from_config(&config)?;
            web::start_daemon(config, service);
            Ok(())
        }
    }
}
