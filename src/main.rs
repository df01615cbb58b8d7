// Entrypoint for the CLI application.
// - Keeps `main` small: resolve config, build the orchestrator and either run
//   one operation or hand it to the interactive menu.
// - Returns `anyhow::Result` so failures print with their context.

use anyhow::Context;
use clap::{Parser, Subcommand};
use viewport_theme::api::{HttpThemeApi, MultipartFormBuilder};
use viewport_theme::config::{ConfigSource, FileConfigProvider};
use viewport_theme::files::FsGlobResolver;
use viewport_theme::ui::main_menu;
use viewport_theme::{HttpThemeOrchestrator, UploadSpec};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "viewport-theme", about = "Manage Scroll Viewport themes")]
struct Cli {
    /// Environment entry in ~/.vpconfig.json. Without it the VPRT_*
    /// environment variables are used.
    #[arg(long = "env")]
    env_name: Option<String>,

    /// Name of the remote theme.
    #[arg(long, env = "VPRT_THEME")]
    theme: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether the theme exists.
    Exists,
    /// Create the theme if missing and print its id.
    Create,
    /// Remove all resources of the theme.
    Reset,
    /// Upload files matching a glob.
    Upload {
        /// Local directory the glob results are relative to, e.g. `src/`.
        #[arg(long, default_value = "")]
        source: String,
        /// Remote directory to place files under, e.g. `dist/`.
        #[arg(long, default_value = "")]
        target: String,
        /// Glob selecting the files, e.g. `src/**/*.css`.
        #[arg(long)]
        glob: String,
    },
}

/// Builds an orchestrator without touching the network.
fn build_orchestrator(
    theme: &str,
    provider: &FileConfigProvider,
    source: &ConfigSource,
) -> anyhow::Result<HttpThemeOrchestrator> {
    HttpThemeOrchestrator::new(
        theme,
        provider,
        source,
        HttpThemeApi::new().context("Failed to build HTTP client")?,
        FsGlobResolver,
        MultipartFormBuilder,
    )
    .with_context(|| format!("Failed to load configuration ({})", provider.store_path().display()))
}

/// Creates the theme if needed and returns an instance with its id bound.
/// An instance that just created the theme still caches "missing", so the
/// caller continues on a fresh one.
async fn bound_orchestrator(
    theme: &str,
    provider: &FileConfigProvider,
    source: &ConfigSource,
) -> anyhow::Result<HttpThemeOrchestrator> {
    let mut orch = build_orchestrator(theme, provider, source)?;
    let existed = orch.exists().await?;
    orch.create().await?;
    if existed {
        return Ok(orch);
    }
    let mut fresh = build_orchestrator(theme, provider, source)?;
    fresh.create().await?;
    Ok(fresh)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("viewport_theme=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let source = ConfigSource::detect(cli.env_name.as_deref());
    let provider = FileConfigProvider::from_home();
    let theme = cli.theme;

    let Some(command) = cli.command else {
        let orch = build_orchestrator(&theme, &provider, &source)?;
        return main_menu(orch, || build_orchestrator(&theme, &provider, &source)).await;
    };

    match command {
        Command::Exists => {
            let mut orch = build_orchestrator(&theme, &provider, &source)?;
            let exists = orch.exists().await?;
            println!("{exists}");
        }
        Command::Create => {
            let orch = bound_orchestrator(&theme, &provider, &source).await?;
            println!("{}", orch.theme_id().unwrap_or_default());
        }
        Command::Reset => {
            // Binds the theme id the resource URL needs; a missing theme is
            // left for reset() to report.
            let mut orch = build_orchestrator(&theme, &provider, &source)?;
            if orch.exists().await? {
                orch.create().await?;
            }
            orch.reset().await?;
        }
        Command::Upload {
            source: source_path,
            target,
            glob,
        } => {
            let mut orch = bound_orchestrator(&theme, &provider, &source).await?;
            let spec = UploadSpec {
                target_path: target,
                source_path,
                glob_string: glob,
            };
            let uploaded = orch.upload_spec(&spec).await?;
            println!("uploaded {} files", uploaded.len());
        }
    }
    Ok(())
}
