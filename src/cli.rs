use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Map category labels onto canonical food interests
    Map {
        /// One or more category labels, as scraped
        categories: Vec<String>,

        /// Minimum adjusted similarity score for an embedding-only match
        #[clap(short, long)]
        threshold: Option<f32>,

        /// Print only the ranked interests, not the score tables
        #[clap(long, default_value = "false")]
        compact: bool,
    },

    /// Print the canonical food interest taxonomy
    Interests {},

    /// Start palate as a service
    Daemon {},
}
