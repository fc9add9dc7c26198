use anyhow::Result;
use clap::Parser;
use pypi_json::PypiJsonClient;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// pypi-json - query the PyPI JSON API
///
/// Fetches project metadata from PyPI (or any compatible index) and resolves
/// the wheels of a release to their download URLs.
///
/// Examples:
///   pypi-json latest requests
///   pypi-json wheels numpy --version 1.26.4
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the JSON API (defaults to https://pypi.org/pypi)
    #[arg(long, env = "PYPI_JSON_ENDPOINT", value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Username for HTTP basic authentication
    #[arg(long, env = "PYPI_JSON_USERNAME", global = true)]
    username: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(long, env = "PYPI_JSON_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the metadata document as JSON
    Metadata(MetadataArgs),

    /// Print the latest released version
    Latest(ProjectArgs),

    /// Print the download URLs of every release
    Releases(ReleasesArgs),

    /// Print the wheel tag to URL mapping of a release
    Wheels(WheelsArgs),
}

#[derive(clap::Args, Debug)]
struct ProjectArgs {
    /// Project name as listed on the index
    project: String,
}

#[derive(clap::Args, Debug)]
struct MetadataArgs {
    /// Project name as listed on the index
    project: String,

    /// Fetch the metadata of this version instead of the latest
    #[arg(long)]
    version: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ReleasesArgs {
    /// Project name as listed on the index
    project: String,

    /// Include the sha256 digest of each file
    #[arg(long)]
    digests: bool,
}

#[derive(clap::Args, Debug)]
struct WheelsArgs {
    /// Project name as listed on the index
    project: String,

    /// Release to resolve (defaults to the latest)
    #[arg(long)]
    version: Option<String>,

    /// Supported tag such as `py3-none-any`, most preferred first; prints only the best match
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref(), cli.overrides())?;
    let client = PypiJsonClient::from_config(config)?;
    tracing::debug!("querying {}", client);

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Metadata(args) => {
            commands::metadata(&client, &args.project, args.version.as_deref(), &mut out).await?
        }
        Commands::Latest(args) => commands::latest(&client, &args.project, &mut out).await?,
        Commands::Releases(args) => {
            commands::releases(&client, &args.project, args.digests, &mut out).await?
        }
        Commands::Wheels(args) => {
            commands::wheels(
                &client,
                &args.project,
                args.version.as_deref(),
                &args.tags,
                &mut out,
            )
            .await?
        }
    }
    Ok(())
}
