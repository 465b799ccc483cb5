//! create-mockstar-app - Create MockStar apps with one command

mod logging;

use anyhow::{Context, Result};
use bootstrap_core::registry::NpmRegistry;
use bootstrap_core::runtime::{StreamingRunner, SystemProbe};
use bootstrap_core::{create_app, info, report, CreateRequest, ProductConfig, Services};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MockStar product configuration
#[derive(Clone)]
pub struct MockStarConfig;

impl ProductConfig for MockStarConfig {
    fn name(&self) -> &'static str {
        "create-mockstar-app"
    }

    fn display_name(&self) -> &'static str {
        "MockStar"
    }

    fn engine_package(&self) -> &'static str {
        "mockstar-generators"
    }

    fn template_package(&self) -> &'static str {
        "mockstar-template"
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        &[
            "mockstar",
            "mockstar-cli",
            "mockstar-generators",
            "mockstar-template",
        ]
    }

    fn template_min_engine_version(&self) -> &'static str {
        "1.1.0"
    }

    fn registry_url_env(&self) -> &'static str {
        "MOCKSTAR_REGISTRY_URL"
    }

    fn issues_url(&self) -> &'static str {
        "https://github.com/mockstarjs/create-mockstar-app/issues/new"
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-mockstar-app")]
#[command(about = "Create MockStar apps with one command")]
#[command(version)]
#[command(after_help = "Only <PROJECT_DIRECTORY> is required.\n\n\
    If you have any problems, do not hesitate to file an issue:\n  \
    https://github.com/mockstarjs/create-mockstar-app/issues/new")]
pub struct Args {
    /// Directory to create the project in
    #[arg(value_name = "PROJECT_DIRECTORY")]
    pub project_directory: Option<PathBuf>,

    /// Print additional logs
    #[arg(long)]
    pub verbose: bool,

    /// Print environment debug info
    #[arg(long)]
    pub info: bool,

    /// Use npm even when Yarn is available
    #[arg(long = "use-npm")]
    pub use_npm: bool,

    /// Install with Yarn plug-and-play (Yarn 1.12 or newer)
    #[arg(long = "use-pnp")]
    pub use_pnp: bool,

    /// Use a non-standard version of mockstar-generators (version, @tag, file: path or URL)
    #[arg(long = "scripts-version", value_name = "SPEC")]
    pub scripts_version: Option<String>,

    /// Specify a template for the created project
    #[arg(long, value_name = "SPEC")]
    pub template: Option<String>,
}

impl Args {
    fn into_request(self, original_directory: PathBuf) -> CreateRequest {
        CreateRequest {
            project_directory: self.project_directory,
            verbose: self.verbose,
            scripts_version: self.scripts_version,
            template: self.template,
            use_npm: self.use_npm,
            use_pnp: self.use_pnp,
            original_directory,
        }
    }
}

fn setup(config: &MockStarConfig) -> Result<(PathBuf, NpmRegistry)> {
    let original_directory =
        std::env::current_dir().context("Failed to read the current directory")?;
    let registry = NpmRegistry::from_config(config).with_context(|| {
        format!("Invalid registry URL in {}", config.registry_url_env())
    })?;
    Ok((original_directory, registry))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = MockStarConfig;

    if let Err(e) = logging::init_logging(args.verbose) {
        eprintln!("{} {:#}", "Warning:".yellow(), e);
    }

    // An interrupted install is left on disk for inspection, never rolled back
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!(
            "{}",
            "Interrupted. The project directory was left as-is.".yellow()
        );
        std::process::exit(130);
    })
    .ok();

    if args.info {
        info::print_environment_info(&config, CLI_VERSION);
        return ExitCode::SUCCESS;
    }

    let (original_directory, registry) = match setup(&config) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let request = args.into_request(original_directory);
    let services = Services {
        registry: &registry,
        probe: &SystemProbe,
        runner: &StreamingRunner,
    };

    match create_app(&config, &request, services, CLI_VERSION).await {
        Ok(created) => {
            tracing::debug!(root = %created.workspace.root().display(), "bootstrap complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report::print_error(&config, &e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
