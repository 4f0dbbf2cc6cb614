//! netinventory - Main entry point
//!
//! Reads a probe snapshot, builds the network device inventory and prints
//! it as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use netinventory::broken_modules::parse_module_list;
use netinventory::cli::{Cli, Commands, SourceArgs};
use netinventory::{classify, InventoryBuilder, InventoryConfig, ProbeSnapshot, ProbeSource};

/// Initialize the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logger();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan {
            source,
            broken_modules,
            install_inf,
            distinguished_names,
        } => {
            let mut config = load_config(&source)?;
            if let Some(list) = broken_modules {
                config.broken_modules.extend(parse_module_list(&list));
            }
            if install_inf.is_some() {
                config.install_inf = install_inf;
            }
            config.distinguished_names |= distinguished_names;
            config.validate()?;
            scan(&config)
        }
        Commands::Classify { source } => {
            let config = load_config(&source)?;
            config.validate()?;
            classify_records(&config)
        }
        Commands::Validate { config } => {
            info!("Validating configuration file: {:?}", config);
            InventoryConfig::load_from_file(&config)?.validate()?;
            println!("✓ Configuration file is valid: {:?}", config);
            Ok(())
        }
    }
}

/// Config file (if any) with command line overrides applied
fn load_config(source: &SourceArgs) -> Result<InventoryConfig> {
    let mut config = match &source.config {
        Some(path) => InventoryConfig::load_from_file(path)?,
        None => InventoryConfig::new(),
    };
    if let Some(probe) = &source.probe {
        config.probe_file = probe.clone();
    }
    if let Some(bucket) = source.bucket {
        config.bucket = bucket;
    }
    Ok(config)
}

fn load_snapshot(config: &InventoryConfig) -> Result<ProbeSnapshot> {
    ProbeSnapshot::load(&config.probe_file)
        .with_context(|| format!("Failed to load probe snapshot {:?}", config.probe_file))
}

fn scan(config: &InventoryConfig) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let broken_modules = config.resolve_broken_modules()?;
    info!(
        bucket = %config.bucket,
        broken_modules = broken_modules.len(),
        "Building network device inventory"
    );

    let inventory = InventoryBuilder::new(broken_modules)
        .distinguished_names(config.distinguished_names)
        .read_hardware(&snapshot, config.bucket);
    info!(devices = inventory.len(), "Inventory complete");

    let json = serde_json::to_string_pretty(&inventory).context("Failed to serialize inventory")?;
    println!("{}", json);
    Ok(())
}

fn classify_records(config: &InventoryConfig) -> Result<()> {
    let snapshot = load_snapshot(config)?;

    for bucket in config.bucket.expand() {
        let Some(records) = snapshot.read(bucket) else {
            continue;
        };
        for record in &records {
            let kind = classify(record)
                .map(|k| k.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "{}\t{}\t{}\t{}",
                bucket,
                kind,
                record.sysfs_bus_id,
                netinventory::device_name(record)
            );
        }
    }
    Ok(())
}
