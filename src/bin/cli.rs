//! Wayback CDX exporter CLI
//!
//! Local execution entry point. For AWS Lambda, use `cdx-export-lambda`.

use std::path::{Path, PathBuf};

use cdx_export::{
    error::{AppError, Result},
    models::{ArchiveRequest, Config, ContentKind, ExportBundle, FieldOption},
    pipeline,
    services::OEmbedClient,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// cdx-export - Archived tweet and Instagram post exporter
#[derive(Parser, Debug)]
#[command(
    name = "cdx-export",
    version,
    about = "Export archived snapshots of a username from the Wayback Machine"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "cdx-export.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export archived tweets for a username
    Tweets(ExportArgs),

    /// Export archived Instagram posts for a username
    Posts(ExportArgs),

    /// Print the raw embed HTML for a tweet URL
    Embed {
        /// Tweet URL, e.g. https://twitter.com/jack/status/20
        url: String,
    },

    /// List the available field names
    Fields {
        #[arg(long, default_value = "tweet")]
        kind: ContentKind,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Username to look up
    username: String,

    /// Earliest capture date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Latest capture date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Maximum number of captures; enables pagination
    #[arg(long)]
    limit: Option<i64>,

    /// Collapse repeated captures of the same URL
    #[arg(long)]
    unique: bool,

    /// Resumption key from a previous paginated export
    #[arg(long)]
    resume_key: Option<String>,

    /// Comma-separated field names (default: all fields for the kind)
    #[arg(long)]
    fields: Option<String>,

    /// Directory the export files are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Which export files to write
    #[arg(long, value_enum, default_value_t = Format::All)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Html,
    All,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config).ok();
    let level = config
        .as_ref()
        .map_or("info", |c| c.logging.level.as_str())
        .to_string();
    init_logging(cli.verbose, &level);

    let config = match config {
        Some(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        None => Config::load_or_default(&cli.config),
    };

    match cli.command {
        Command::Tweets(args) => export(&config, ContentKind::Tweet, args).await?,
        Command::Posts(args) => export(&config, ContentKind::Post, args).await?,

        Command::Embed { url } => {
            let client = OEmbedClient::new(&config.archive, &config.embed)?;
            match client.fetch_embed_html(&url).await {
                Some(html) => println!("{html}"),
                None => {
                    return Err(AppError::upstream(
                        "Embed service",
                        format!("No embed available for {url}"),
                    ));
                }
            }
        }

        Command::Fields { kind } => {
            for field in kind.field_options() {
                println!("{field}");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration {}...", cli.config.display());

            // Defaults are not a valid answer here; the file itself must load.
            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}

async fn export(config: &Config, kind: ContentKind, args: ExportArgs) -> Result<()> {
    let fields = match &args.fields {
        Some(list) => FieldOption::parse_list(list)?,
        None => kind.field_options().to_vec(),
    };
    let request = ArchiveRequest {
        username: args.username,
        timestamp_from: args.from,
        timestamp_to: args.to,
        limit: args.limit,
        unique: args.unique,
        resumption_key: args.resume_key,
    };

    let bundle = pipeline::run_export(config, &request, &fields, kind).await?;
    let written = write_exports(&bundle, &args.output, args.format)?;

    log::info!("{} records for @{}", bundle.total, bundle.username);
    for path in &written {
        log::info!("  wrote {}", path.display());
    }
    if let Some(key) = &bundle.resumption_key {
        log::info!("More captures available. Continue with --resume-key {}", key);
    }
    Ok(())
}

fn write_exports(bundle: &ExportBundle, dir: &Path, format: Format) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let outputs = [
        (Format::Csv, "csv", &bundle.csv),
        (Format::Json, "json", &bundle.json),
        (Format::Html, "html", &bundle.html),
    ];
    let mut written = Vec::new();
    for (kind, ext, content) in outputs {
        if format == Format::All || format == kind {
            let path = dir.join(format!("{}.{}", bundle.filename, ext));
            std::fs::write(&path, content)?;
            written.push(path);
        }
    }
    Ok(written)
}
