use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use fen2img::config::Config;
use fen2img::server::{self, AppState};
use fen2img::render::MAX_SQUARE_SIZE;
use fen2img::{BoardConfig, OutputFormat, SpriteSet, encode, fen, render, sprites};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EXAMPLE_FEN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

fn cli() -> Command {
    Command::new("fen2img")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render chess positions from FEN to images")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON config file")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("square-size")
                .long("square-size")
                .value_name("PX")
                .help("Edge length of one square in pixels")
                .value_parser(value_parser!(u32).range(1..=i64::from(MAX_SQUARE_SIZE)))
                .global(true),
        )
        .arg(
            Arg::new("sprites")
                .long("sprites")
                .value_name("DIR")
                .help("Directory holding {symbol}.png piece images")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("sprite-url")
                .long("sprite-url")
                .value_name("URL")
                .help("Fetch piece images from {URL}/{symbol}.png instead of a directory")
                .global(true),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output encoding")
                .value_parser(["jpeg", "jpg", "png"])
                .global(true),
        )
        .arg(
            Arg::new("quality")
                .long("quality")
                .value_name("1-100")
                .help("JPEG quality")
                .value_parser(value_parser!(u8).range(1..=100))
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render one FEN to stdout or a file")
                .arg(
                    Arg::new("fen")
                        .value_name("FEN")
                        .help("Position to render (quote it; fields after the placement are ignored)")
                        .default_value(EXAMPLE_FEN),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the image here instead of stdout")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("print-board")
                        .long("print-board")
                        .help("Log the parsed board")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve GET /{fen} as rendered images")
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_name("ADDR")
                        .help("Listen address (default 0.0.0.0:8080)"),
                ),
        )
}

/// Config file (if any) with command-line overrides applied.
fn resolve_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::load(path).context("Failed to load config")?,
        None => Config::default(),
    };
    if let Some(&size) = matches.get_one::<u32>("square-size") {
        config.square_size = size;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("sprites") {
        config.sprite_dir = dir.clone();
    }
    if let Some(url) = matches.get_one::<String>("sprite-url") {
        config.sprite_url = Some(url.clone());
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.format = format.clone();
    }
    if let Some(&quality) = matches.get_one::<u8>("quality") {
        config.quality = quality;
    }
    Ok(config)
}

/// The single place sprites are loaded, shared by both subcommands.
async fn load_sprites(config: &Config, board: &BoardConfig) -> Result<SpriteSet> {
    let set = match &config.sprite_url {
        Some(url) => sprites::fetch_sprites(url)
            .await
            .with_context(|| format!("Could not load pieces from {}", url))?,
        None => sprites::load_dir(&config.sprite_dir).with_context(|| {
            format!("Could not load pieces from {}", config.sprite_dir.display())
        })?,
    };
    set.check_size(board.square_size());
    Ok(set)
}

fn run_render(
    matches: &ArgMatches,
    board_config: &BoardConfig,
    format: OutputFormat,
    sprites: &SpriteSet,
) -> Result<()> {
    let fen_str = matches
        .get_one::<String>("fen")
        .map(String::as_str)
        .unwrap_or(EXAMPLE_FEN);

    let board = fen::parse(fen_str).with_context(|| format!("Invalid FEN '{}'", fen_str))?;
    if matches.get_flag("print-board") {
        for line in board.to_string().lines() {
            info!("{}", line);
        }
    }

    let img = render::render(board_config, &board, sprites);

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            encode::encode(&img, format, &mut out).context("Failed to write image")?;
            out.flush().context("Failed to write image")?;
            info!(path = %path.display(), %format, "wrote board");
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            encode::encode(&img, format, &mut out).context("Failed to write image")?;
            out.flush().context("Failed to write image")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries image bytes, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let matches = cli().get_matches();

    let config = resolve_config(&matches)?;
    let board_config = config.board_config().context("Invalid square size")?;
    let format = config.output_format().context("Invalid output format")?;
    let sprites = load_sprites(&config, &board_config).await?;

    match matches.subcommand() {
        Some(("render", sub)) => run_render(sub, &board_config, format, &sprites),
        Some(("serve", sub)) => {
            let bind = sub
                .get_one::<String>("bind")
                .cloned()
                .unwrap_or_else(|| config.bind.clone());
            let state = AppState::new(Arc::new(sprites), board_config, format);
            server::serve(&bind, state)
                .await
                .with_context(|| format!("Server on {} failed", bind))
        }
        _ => unreachable!("subcommand_required is set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_render_defaults_to_example_fen() {
        let matches = cli().get_matches_from(["fen2img", "render"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("fen").unwrap(), EXAMPLE_FEN);
        assert!(!sub.get_flag("print-board"));
    }

    #[test]
    fn test_flags_override_config() {
        let matches = cli().get_matches_from([
            "fen2img",
            "--square-size",
            "60",
            "--format",
            "png",
            "serve",
            "--sprites",
            "assets",
        ]);
        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.square_size, 60);
        assert_eq!(config.sprite_dir, PathBuf::from("assets"));
        assert_eq!(config.output_format().unwrap(), OutputFormat::Png);
        assert_eq!(config.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_out_of_range_square_size_rejected_by_cli() {
        assert!(cli().try_get_matches_from(["fen2img", "--square-size", "0", "render"]).is_err());
        assert!(cli().try_get_matches_from(["fen2img", "--square-size", "600000000", "render"]).is_err());
    }
}
