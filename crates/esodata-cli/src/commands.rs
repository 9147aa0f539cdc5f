//! Command handlers

use anyhow::{Context, Result, bail};
use esodata_formats::world::WorldTableOfContents;
use esodata_storage::build_stamp::BuildStamp;
use esodata_storage::depot::validate_root;
use esodata_storage::{ArchiveOptions, Depot, DepotConfig, DepotValidation, read_world_toc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Parse a file id given in decimal or `0x`-prefixed hex
pub fn parse_key(value: &str) -> Result<u64, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => value.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid key {value:?}: {e}"))
}

/// Combine the configuration file with command-line overrides
pub fn build_config(
    config_path: Option<&Path>,
    root: Option<&Path>,
    manifests: Vec<PathBuf>,
    file_tables: Vec<u64>,
    no_verify: bool,
) -> Result<DepotConfig> {
    let mut config = match config_path {
        Some(path) => DepotConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => DepotConfig::new("."),
    };

    // An explicit root wins over the configuration file
    if let Some(root) = root {
        config.root = root.to_path_buf();
    }

    if !manifests.is_empty() {
        config.manifests = manifests;
    }
    if !file_tables.is_empty() {
        config.file_tables = file_tables;
    }
    if no_verify {
        config.archive = ArchiveOptions {
            verify_signatures: false,
            ..config.archive
        };
    }

    debug!("Depot configuration: {config:?}");
    Ok(config)
}

fn open(config: DepotConfig) -> Result<Depot> {
    let total = Depot::expected_loading_steps(&config);
    let root = config.root.clone();
    let mut done = 0;
    let mut progress = |steps: usize| {
        done += steps;
        debug!("Loading depot: {done}/{total}");
        true
    };

    let depot = Depot::open_with_progress(config, &mut progress)
        .with_context(|| format!("failed to open depot at {}", root.display()))?;
    info!(
        "Opened depot with {} archives and {} name tables",
        depot.filesystem().archives().len(),
        depot.filesystem().name_tables().len()
    );
    Ok(depot)
}

/// `list`: key and size of every entry
pub fn list(config: DepotConfig) -> Result<()> {
    let depot = open(config)?;
    let mut out = std::io::stdout().lock();
    for (key, size) in depot.filesystem().enumerate_files() {
        writeln!(out, "{key:#018x}\t{size}")?;
    }
    Ok(())
}

/// `names`: every named file from the loaded name tables
pub fn names(config: DepotConfig) -> Result<()> {
    let depot = open(config)?;
    let mut out = std::io::stdout().lock();
    for named in depot.filesystem().enumerate_names() {
        writeln!(out, "{:#018x}\t{}", named.key, named.name)?;
    }
    Ok(())
}

/// `extract`: write one file to `output` or standard output
pub fn extract(config: DepotConfig, key: u64, output: Option<&Path>) -> Result<()> {
    let depot = open(config)?;
    let data = depot
        .filesystem()
        .read_by_key(key)
        .with_context(|| format!("failed to read {key:#018x}"))?;

    match output {
        Some(path) => {
            std::fs::write(path, &data)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", data.len(), path.display());
        }
        None => std::io::stdout().lock().write_all(&data)?,
    }
    Ok(())
}

/// `toc`: layers and cell grid of a world
pub fn toc(config: DepotConfig, world: u32) -> Result<()> {
    let depot = open(config)?;
    let Some(toc) = read_world_toc(depot.filesystem(), world)? else {
        bail!("world {world} has no table of contents");
    };
    print!("{}", format_toc(world, &toc));
    Ok(())
}

fn format_toc(world: u32, toc: &WorldTableOfContents) -> String {
    let mut text = format!(
        "world {world}: {} x {} ({} layers)\n",
        toc.world_width,
        toc.world_height,
        toc.layers.len()
    );
    for (index, layer) in toc.layers.iter().enumerate() {
        let grid = toc
            .cell_counts(index)
            .map_or_else(|| "-".to_string(), |(columns, rows)| format!("{columns} x {rows}"));
        text.push_str(&format!(
            "  {index}: {}.{} cell size {} grid {grid}\n",
            layer.name, layer.extension, layer.layer_size
        ));
    }
    text
}

/// `stamp`: build stamp and version support
pub fn stamp(config: &DepotConfig) -> Result<()> {
    let Some(stamp) = BuildStamp::read_from(&config.root)? else {
        bail!(
            "no build stamp at {}",
            BuildStamp::path_in(&config.root).display()
        );
    };

    println!("build:          {}", stamp.build);
    println!("build date:     {}", stamp.build_date);
    println!("client version: {}", stamp.client_version);

    let status = match validate_root(&config.root, &config.supported_versions) {
        DepotValidation::Succeeded => "supported",
        DepotValidation::UnsupportedVersion if config.supported_versions.is_empty() => {
            "unknown (no supported versions configured)"
        }
        DepotValidation::UnsupportedVersion => "unsupported",
        DepotValidation::DoesNotExist => "unreadable",
    };
    println!("status:         {status}");
    Ok(())
}
