use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "customer-recsys")]
#[command(about = "Customer segment-based product recommendation system")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the recommendation web API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Recommend products for a customer and a free-text query
    Recommend {
        #[arg(long)]
        customer_id: u64,

        #[arg(short, long)]
        query: String,

        #[arg(short, long)]
        n: Option<usize>,
    },

    /// Show a customer's profile, statistics and similar customers
    Profile {
        #[arg(long)]
        customer_id: u64,
    },

    /// Generate sample customers/products/transactions CSV files
    Generate {
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value = "100")]
        customers: usize,

        #[arg(long, default_value = "500")]
        products: usize,

        #[arg(long, default_value = "5000")]
        transactions: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Inspect the CSV files in the data directory
    Inspect {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Export a customer report archive (zip)
    Report {
        #[arg(long)]
        customer_id: u64,

        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Activate the environment directory if present, install dependencies, start the app
    Launch {
        /// Print the launch plan without running anything
        #[arg(long)]
        dry_run: bool,
    },
}
