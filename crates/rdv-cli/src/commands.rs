use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use rdv_server::{RetailServer, ServerConfig};
use rdv_store::{collect_issues, DataRepository, InventoryRow, SeedDocument};
use rdv_types::format_euros;
use serde::Serialize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Validate => cmd_validate(&seed_or_default(cli.seed), format),
        Command::Stores => cmd_stores(&seed_or_default(cli.seed), format),
        Command::Products => cmd_products(&seed_or_default(cli.seed), format),
        Command::Shelves(args) => cmd_shelves(&seed_or_default(cli.seed), args, format),
        Command::Inventory(args) => cmd_inventory(&seed_or_default(cli.seed), args, format),
        Command::Serve(args) => cmd_serve(args, cli.seed),
    }
}

fn seed_or_default(seed: Option<PathBuf>) -> PathBuf {
    seed.unwrap_or_else(|| ServerConfig::default().seed_path)
}

fn open(seed: &Path) -> anyhow::Result<DataRepository> {
    DataRepository::open(seed).with_context(|| format!("loading {}", seed.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_validate(seed: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let document =
        SeedDocument::read(seed).with_context(|| format!("reading {}", seed.display()))?;
    let report = collect_issues(&document);

    match format {
        OutputFormat::Json => {
            let issues: Vec<_> = report
                .issues()
                .iter()
                .map(|i| json!({ "blocking": i.is_blocking(), "message": i.message }))
                .collect();
            print_json(&json!({ "issues": issues, "shelfLoads": report.shelf_loads() }))?;
        }
        OutputFormat::Text => {
            for issue in report.issues() {
                let tag = if issue.is_blocking() {
                    "blocking".red().bold()
                } else {
                    "soft".yellow()
                };
                println!("[{tag}] {}", issue.message);
            }
            if report.issues().is_empty() {
                println!("{} No issues.", "✓".green().bold());
            }
            println!("\nShelf loads:");
            for (shelf, load) in report.shelf_loads() {
                println!("  {} {load}", shelf.cyan());
            }
        }
    }

    let blocking = report.blocking_messages().len();
    if blocking > 0 {
        bail!("{blocking} blocking issue(s) in {}", seed.display());
    }
    Ok(())
}

fn cmd_stores(seed: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(seed)?;
    let stores = repo.list_stores();
    match format {
        OutputFormat::Json => print_json(&stores)?,
        OutputFormat::Text => {
            for store in stores {
                println!("{}  {}  {}", store.id.cyan(), store.name.bold(), store.address);
            }
        }
    }
    Ok(())
}

fn cmd_products(seed: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(seed)?;
    let products = repo.list_products();
    match format {
        OutputFormat::Json => print_json(&products)?,
        OutputFormat::Text => {
            for product in products {
                println!(
                    "{}  {}  {}  {}",
                    product.id.cyan(),
                    product.name.bold(),
                    product.size,
                    product.display_price().green()
                );
            }
        }
    }
    Ok(())
}

fn cmd_shelves(seed: &Path, args: ShelvesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(seed)?;
    if repo.get_store(&args.store_id).is_none() {
        bail!("Store {} does not exist", args.store_id);
    }
    let shelves = repo.list_shelves_by_store(&args.store_id);
    match format {
        OutputFormat::Json => print_json(&shelves)?,
        OutputFormat::Text => {
            for shelf in shelves {
                let load = format!("{}/{}", shelf.current_load, shelf.max_capacity);
                let load = if shelf.current_load > shelf.max_capacity {
                    load.red().bold()
                } else {
                    load.normal()
                };
                println!("{}  {}  {load}", shelf.id.cyan(), shelf.name.bold());
            }
        }
    }
    Ok(())
}

fn cmd_inventory(seed: &Path, args: InventoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open(seed)?;
    let rows = match (&args.store, &args.product) {
        (Some(store), _) => repo.list_inventory_by_store(store),
        (None, Some(product)) => repo.list_inventory_by_product(product),
        (None, None) => repo.list_inventory_global(),
    };
    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => rows.iter().for_each(print_row),
    }
    Ok(())
}

fn print_row(row: &InventoryRow) {
    println!(
        "{}  {} / {}  {} ({}, {})  stock {} shelf {}",
        row.id.cyan(),
        row.store_name.bold(),
        row.shelf_name,
        row.product_name.bold(),
        row.product_size,
        format_euros(row.product_price),
        row.stock_count,
        row.shelf_count
    );
}

/// Config file (or defaults) with command-line overrides applied.
fn serve_config(args: &ServeArgs, seed: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(seed) = seed {
        config.seed_path = seed;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs, seed: Option<PathBuf>) -> anyhow::Result<()> {
    let config = serve_config(&args, seed)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(RetailServer::new(config).serve())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdv_store::fixtures;

    #[test]
    fn validate_accepts_clean_seed() {
        let dir = tempfile::tempdir().unwrap();
        let seed = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        cmd_validate(&seed, OutputFormat::Text).unwrap();
        cmd_validate(&seed, OutputFormat::Json).unwrap();
    }

    #[test]
    fn validate_fails_on_blocking_issue() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = fixtures::valid_value();
        value["inventoryItems"][0]["shelfCount"] = json!(11);
        let seed = fixtures::write_seed(dir.path(), &value);
        let err = cmd_validate(&seed, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().starts_with("1 blocking issue(s)"));
    }

    #[test]
    fn validate_passes_with_only_soft_issues() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = fixtures::valid_value();
        value["inventoryItems"].as_array_mut().unwrap().remove(0);
        let seed = fixtures::write_seed(dir.path(), &value);
        cmd_validate(&seed, OutputFormat::Text).unwrap();
    }

    #[test]
    fn listings_run_against_a_seed() {
        let dir = tempfile::tempdir().unwrap();
        let seed = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        cmd_stores(&seed, OutputFormat::Json).unwrap();
        cmd_products(&seed, OutputFormat::Text).unwrap();
        let args = InventoryArgs { store: Some(fixtures::store_id(1)), product: None };
        cmd_inventory(&seed, args, OutputFormat::Text).unwrap();
    }

    #[test]
    fn shelves_of_unknown_store_fail() {
        let dir = tempfile::tempdir().unwrap();
        let seed = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        let args = ShelvesArgs { store_id: "urn:ngsi-ld:Store:999".into() };
        let err = cmd_shelves(&seed, args, OutputFormat::Text).unwrap_err();
        assert_eq!(err.to_string(), "Store urn:ngsi-ld:Store:999 does not exist");
    }

    #[test]
    fn missing_seed_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_stores(&dir.path().join("none.json"), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().starts_with("loading "));
    }

    #[test]
    fn serve_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rdv.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:8000\"\nseed_path = \"from-file.json\"\n").unwrap();

        let args = ServeArgs { config: Some(path.clone()), bind: None };
        let config = serve_config(&args, None).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.seed_path, PathBuf::from("from-file.json"));

        let args = ServeArgs { config: Some(path), bind: Some("127.0.0.1:9000".parse().unwrap()) };
        let config = serve_config(&args, Some(PathBuf::from("flag.json"))).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.seed_path, PathBuf::from("flag.json"));
    }
}
