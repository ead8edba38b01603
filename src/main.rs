use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tile_deck::{config::Config, tiles::TileFile, windows::WindowKind, App, LaunchOptions};

#[derive(Parser, Debug)]
#[command(name = "tile-deck")]
#[command(about = "Three-button tile controller driven from the terminal")]
#[command(version)]
struct Cli {
    /// Load tiles from a local JSON file instead of the bridge
    #[arg(long, value_name = "FILE")]
    tiles: Option<PathBuf>,

    /// Open a window on this menu index at startup
    #[arg(long, value_name = "INDEX")]
    open: Option<u8>,

    /// Open the paging window instead of the action window
    #[arg(long, requires = "open")]
    paging: bool,

    /// Where the `snap` command writes a PNG of the top window
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Validate configuration (and the tile file, if given) and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    if cli.check_config {
        return check_config(&config, cli.tiles.as_deref());
    }

    let kind = if cli.paging {
        WindowKind::Paging
    } else {
        WindowKind::Action
    };
    let options = LaunchOptions {
        tiles_path: cli.tiles,
        open: cli.open.map(|index| (kind, index)),
        snapshot_path: cli.snapshot,
    };

    info!("Starting tile-deck (bridge {})", config.bridge.url);
    let mut app = App::new(config, options)?;

    let result = tokio::select! {
        result = app.run() => result,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    };

    app.shutdown();
    result
}

fn check_config(config: &Config, tiles: Option<&std::path::Path>) -> Result<()> {
    println!("✓ Config: {:?}", Config::config_path()?);
    println!(
        "  Device class: {:?} (inbox {} B, outbox {} B)",
        config.device.class,
        config.device.class.inbox_capacity(),
        config.device.class.outbox_capacity()
    );
    println!("  Bridge: {}", config.bridge.url);

    let tiles = tiles.map(PathBuf::from).or(config.tiles.path.clone());
    if let Some(path) = tiles {
        let file = TileFile::load(&path)?;
        println!("✓ Tiles: {} in {:?}", file.tiles.len(), path);
        for tile in file.to_tiles() {
            let empty = tile.texts.iter().filter(|t| t.is_empty()).count();
            println!("  #{} ({} empty slots)", tile.id, empty);
        }
    }
    Ok(())
}
