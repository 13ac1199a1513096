use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use cedict_db::{Cedict, LoadMode};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use cedict_json::{
    AppState, ExportOptions, KeyIndex, OutputFormat, parse_fields, router, write_json,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_CEDICT: &str = "cedict_ts.u8";
const DEFAULT_OUTPUT: &str = "cedict.json";
const DEFAULT_MAX_PAGE_SIZE: usize = 500;

#[derive(Parser)]
#[command(name = "cedict-json")]
#[command(about = "Convert CEDICT to metapinyin-annotated JSON, or serve key lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every valid entry as JSON.
    Convert {
        /// CEDICT source file (falls back to CEDICT_PATH, then cedict_ts.u8).
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Output file, or `-` for stdout.
        #[arg(long, short, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Comma separated fields to keep, e.g. `s,d`.
        #[arg(long)]
        fields: Option<String>,
        /// Keep only entries whose simplified form has this many characters.
        #[arg(long)]
        simplified_len: Option<usize>,
        /// Single-line JSON array.
        #[arg(long, conflicts_with = "lines")]
        compact: bool,
        /// One JSON object per line.
        #[arg(long)]
        lines: bool,
        #[arg(long, value_parser = parse_load_mode_arg)]
        load_mode: Option<LoadMode>,
    },
    /// Serve metapinyin lookups over HTTP.
    Serve {
        #[arg(long, short)]
        input: Option<PathBuf>,
        #[arg(long, value_parser = parse_load_mode_arg)]
        load_mode: Option<LoadMode>,
        /// Omit Cache-Control headers.
        #[arg(long)]
        no_cache: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            output,
            fields,
            simplified_len,
            compact,
            lines,
            load_mode,
        } => {
            let format = if lines {
                OutputFormat::Lines
            } else if compact {
                OutputFormat::Compact
            } else {
                OutputFormat::Pretty
            };
            let options = ExportOptions {
                fields: fields.as_deref().map(parse_fields).transpose()?,
                simplified_len,
                format,
            };
            convert(
                &cedict_path(input),
                &output,
                load_mode.unwrap_or_else(env_load_mode),
                &options,
            )
        }
        Commands::Serve {
            input,
            load_mode,
            no_cache,
        } => {
            let config = load_config(input, load_mode, no_cache);
            serve(config).await
        }
    }
}

fn convert(
    input: &Path,
    output: &Path,
    mode: LoadMode,
    options: &ExportOptions,
) -> anyhow::Result<()> {
    info!("reading {}", input.display());
    let start = Instant::now();
    let dict = Cedict::load_with_mode(input, mode)?;
    let stats = dict.stats();
    info!(
        "parsed {} entries in {} ms ({} rejected)",
        stats.entries,
        start.elapsed().as_millis(),
        stats.rejected
    );

    let written = if output == Path::new("-") {
        write_json(io::stdout().lock(), dict.entries(), options)?
    } else {
        let file =
            File::create(output).with_context(|| format!("create {}", output.display()))?;
        write_json(BufWriter::new(file), dict.entries(), options)
            .with_context(|| format!("write {}", output.display()))?
    };
    info!("wrote {} entries to {}", written, output.display());
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    cedict_path: PathBuf,
    load_mode: LoadMode,
    max_page_size: usize,
    disable_cache: bool,
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using dictionary at {} (mode: {:?})",
        config.cedict_path.display(),
        config.load_mode
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let index = KeyIndex::build_from_file(&config.cedict_path, config.load_mode)?;
    info!(
        "index of {} entries built in {} ms",
        index.len(),
        start.elapsed().as_millis()
    );

    let state = AppState {
        index: Arc::clone(&index),
        max_page_size: config.max_page_size,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_config(input: Option<PathBuf>, load_mode: Option<LoadMode>, no_cache: bool) -> Config {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let max_page_size = env::var("MAX_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_PAGE_SIZE);

    Config {
        host,
        port,
        cedict_path: cedict_path(input),
        load_mode: load_mode.unwrap_or_else(env_load_mode),
        max_page_size,
        disable_cache: no_cache,
    }
}

fn cedict_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| env::var("CEDICT_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CEDICT))
}

fn env_load_mode() -> LoadMode {
    env::var("CEDICT_LOAD_MODE")
        .ok()
        .as_deref()
        .and_then(parse_load_mode)
        .unwrap_or(LoadMode::Mmap)
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn parse_load_mode_arg(raw: &str) -> Result<LoadMode, String> {
    parse_load_mode(raw)
        .ok_or_else(|| format!("unknown load mode {raw:?} (expected mmap or owned)"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
