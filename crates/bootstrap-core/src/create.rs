//! The end-to-end create flow
//!
//! `specifiers -> environment -> negotiation -> install -> hand-off`, driven
//! from a single immutable [`CreateRequest`].

use crate::compat;
use crate::error::{BootstrapError, Result};
use crate::handoff::{HandoffExecutor, HandoffParams};
use crate::install::{InstallOrchestrator, InstallPlan};
use crate::product::ProductConfig;
use crate::registry::PackageRegistry;
use crate::runtime::check::{node_version_warning, parse_version};
use crate::runtime::manager::{MIN_NPM_VERSION, MIN_YARN_PNP_VERSION};
use crate::runtime::{CommandRunner, EnvironmentProbe, PackageManager};
use crate::specifier::{self, PackageSpecifier};
use crate::workspace::ProjectWorkspace;
use colored::Colorize;
use std::path::PathBuf;

/// Everything the user asked for, captured once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    /// Target directory, relative to `original_directory` unless absolute
    pub project_directory: Option<PathBuf>,
    pub verbose: bool,
    /// Alternate engine version, dist-tag, `file:` path or URL
    pub scripts_version: Option<String>,
    pub template: Option<String>,
    pub use_npm: bool,
    pub use_pnp: bool,
    /// Directory the bootstrapper was started from
    pub original_directory: PathBuf,
}

/// External collaborators of the create flow
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub registry: &'a dyn PackageRegistry,
    pub probe: &'a dyn EnvironmentProbe,
    pub runner: &'a dyn CommandRunner,
}

/// A project that was installed and handed to its generator
#[derive(Debug, Clone)]
pub struct CreatedApp {
    pub workspace: ProjectWorkspace,
    pub plan: InstallPlan,
    pub template_name: Option<String>,
}

/// Run the whole bootstrap for `request`
pub async fn create_app<C: ProductConfig>(
    config: &C,
    request: &CreateRequest,
    services: Services<'_>,
    cli_version: &str,
) -> Result<CreatedApp> {
    let target = request
        .project_directory
        .as_deref()
        .ok_or(BootstrapError::MissingProjectName)?;

    let workspace = ProjectWorkspace::new(target, &request.original_directory);
    let orchestrator =
        InstallOrchestrator::new(services.runner, workspace.clone(), config.reserved_names())?;

    check_for_update(config, services.registry, cli_version).await;

    if let Some(warning) = node_version_warning(&services.probe.node()) {
        println!("{}", warning.yellow());
        println!();
    }

    let engine_ref = specifier::resolve(
        config,
        &PackageSpecifier::engine(request.scripts_version.as_deref()),
        &request.original_directory,
    );
    let template_ref = specifier::resolve(
        config,
        &PackageSpecifier::template(request.template.as_deref()),
        &request.original_directory,
    );

    let manager = services.probe.detect_package_manager(request.use_npm);
    let use_pnp = check_manager(services.probe, manager, request);

    if manager == PackageManager::Npm
        && !services.probe.npm_can_read_cwd(&request.original_directory).await
    {
        println!(
            "{}",
            "Could not start an npm process in the right directory.\n\n\
             npm reports a different working directory than the one you ran this command from.\n\
             This is a known issue with some shells; the install may land in the wrong place."
                .yellow()
        );
        println!();
    }

    let (engine_meta, template_meta, online) = tokio::join!(
        services.registry.package_metadata(&engine_ref),
        services.registry.package_metadata(&template_ref),
        services.probe.is_online(manager == PackageManager::Yarn),
    );
    tracing::debug!(?engine_meta, ?template_meta, online, "package metadata resolved");

    let negotiation = compat::negotiate(
        &engine_meta,
        &template_ref,
        config.template_min_engine_version(),
    );
    if !negotiation.include_template && request.template.is_some() {
        println!();
        println!(
            "The {} version you're using {} compatible with the {} option.",
            engine_meta.name.cyan(),
            if engine_meta.name == config.engine_package() {
                "is not"
            } else {
                "may not be"
            },
            "--template".cyan()
        );
        println!();
    }

    let template_name = negotiation
        .include_template
        .then(|| template_meta.name.clone());
    let plan = InstallPlan::new(
        engine_ref,
        negotiation.include_template.then_some(template_ref),
        manager,
        use_pnp,
        online,
        request.verbose,
    );

    let workspace = orchestrator.run(&plan).await?;

    let params = HandoffParams {
        root: workspace.root().to_path_buf(),
        app_name: workspace.app_name().to_string(),
        verbose: request.verbose,
        original_directory: request.original_directory.clone(),
        template_name: template_name.clone(),
    };
    // For URL and tarball engines the name is a guess from the file name. Node
    // still finds the package because the manifest declared it under that name.
    HandoffExecutor::new(services.runner)
        .execute(
            &engine_meta.name,
            config.engine_entry_point(),
            &params,
            plan.use_pnp,
        )
        .await?;

    Ok(CreatedApp {
        workspace,
        plan,
        template_name,
    })
}

/// Advisory only: an unreachable registry means "unknown, proceed"
async fn check_for_update<C: ProductConfig>(
    config: &C,
    registry: &dyn PackageRegistry,
    cli_version: &str,
) {
    let Some(latest) = registry.latest_version(config.name()).await else {
        return;
    };
    let (Ok(current), Ok(latest_ver)) = (parse_version(cli_version), parse_version(&latest))
    else {
        return;
    };
    if current < latest_ver {
        println!();
        eprintln!(
            "{}",
            format!(
                "You are running `{}` {}, which is behind the latest release ({}).\n\n\
                 Global installation of {} is no longer supported.",
                config.name(),
                cli_version,
                latest,
                config.display_name()
            )
            .yellow()
        );
        println!();
        println!(
            "Please remove any global installs with one of the following commands:\n\
             - npm uninstall -g {}\n\
             - yarn global remove {}",
            config.name(),
            config.name()
        );
        println!();
    }
}

/// Print degraded-support warnings and return the effective plug-and-play flag
fn check_manager(
    probe: &dyn EnvironmentProbe,
    manager: PackageManager,
    request: &CreateRequest,
) -> bool {
    let info = probe.manager_version_info(manager);
    tracing::debug!(%manager, ?info, "package manager");

    match manager {
        PackageManager::Npm => {
            if !info.meets_minimum {
                if let Some(version) = &info.version {
                    println!(
                        "{}",
                        format!(
                            "You are using npm {} so the project will be bootstrapped with an old unsupported version of tools.\n\n\
                             Please update to npm {} or higher for a better, fully supported experience.\n",
                            version, MIN_NPM_VERSION
                        )
                        .yellow()
                    );
                }
            }
            if request.use_pnp {
                println!(
                    "{}",
                    "npm doesn't support plug-and-play. Falling back to the regular installs."
                        .yellow()
                );
                println!();
            }
            false
        }
        PackageManager::Yarn => {
            if request.use_pnp && !info.supports_requested_feature {
                let version = info.version.as_deref().unwrap_or("unknown");
                let too_new = info
                    .version
                    .as_deref()
                    .and_then(|v| parse_version(v).ok())
                    .map(|v| v.major >= 2)
                    .unwrap_or(false);
                if too_new {
                    println!(
                        "{}",
                        format!(
                            "You are using Yarn {}, which picks its own install mode. \
                             The plug-and-play flag will be ignored.\n",
                            version
                        )
                        .yellow()
                    );
                } else {
                    println!(
                        "{}",
                        format!(
                            "You are using Yarn {} together with the --use-pnp flag, but plug-and-play is only available starting from {}.\n\
                             Falling back to the regular installs.\n",
                            version, MIN_YARN_PNP_VERSION
                        )
                        .yellow()
                    );
                }
                return false;
            }
            request.use_pnp
        }
    }
}
