use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rdv",
    about = "Retail data viewer: inspect and serve a store inventory seed",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Seed document (defaults to data/seed.json)
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the seed and report every issue
    Validate,
    /// List stores
    Stores,
    /// List products
    Products,
    /// List the shelves of a store with their load
    Shelves(ShelvesArgs),
    /// List inventory, optionally for one store or product
    Inventory(InventoryArgs),
    /// Serve the JSON API
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct ShelvesArgs {
    pub store_id: String,
}

#[derive(Args)]
pub struct InventoryArgs {
    #[arg(long, conflicts_with = "product")]
    pub store: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
