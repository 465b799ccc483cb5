//! Install orchestration
//!
//! Drives a project through `Init -> WorkspacePrepared -> Installing -> Installed`.
//! Any failure after the workspace is touched rolls the project root back to
//! what it held before and ends in `RolledBack`.

use crate::error::{BootstrapError, Result};
use crate::runtime::{CommandRunner, CommandSpec, PackageManager};
use crate::specifier::ResolvedReference;
use crate::workspace::{self, ProjectWorkspace};
use colored::Colorize;
use std::fmt;

/// Everything the package manager needs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    dependencies: Vec<ResolvedReference>,
    pub manager: PackageManager,
    pub use_pnp: bool,
    pub online: bool,
    pub verbose: bool,
}

impl InstallPlan {
    /// The engine always comes first; the template only when negotiation allowed it
    pub fn new(
        engine: ResolvedReference,
        template: Option<ResolvedReference>,
        manager: PackageManager,
        use_pnp: bool,
        online: bool,
        verbose: bool,
    ) -> Self {
        let mut dependencies = vec![engine];
        dependencies.extend(template);
        Self {
            dependencies,
            manager,
            use_pnp,
            online,
            verbose,
        }
    }

    pub fn dependencies(&self) -> &[ResolvedReference] {
        &self.dependencies
    }

    pub fn engine(&self) -> &ResolvedReference {
        &self.dependencies[0]
    }

    pub fn template(&self) -> Option<&ResolvedReference> {
        self.dependencies.get(1)
    }

    /// Package manager invocation for this plan inside `workspace`
    pub fn command(&self, workspace: &ProjectWorkspace) -> CommandSpec {
        let args = self.manager.install_args(
            workspace.root(),
            &self.dependencies,
            self.use_pnp,
            self.online,
            self.verbose,
        );
        CommandSpec::new(self.manager.program())
            .args(args)
            .current_dir(workspace.root())
    }
}

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Init,
    WorkspacePrepared,
    Installing,
    Installed,
    RolledBack,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallState::Init => "init",
            InstallState::WorkspacePrepared => "workspace-prepared",
            InstallState::Installing => "installing",
            InstallState::Installed => "installed",
            InstallState::RolledBack => "rolled-back",
        };
        write!(f, "{}", name)
    }
}

/// Owns a workspace for the duration of its install
pub struct InstallOrchestrator<'a> {
    runner: &'a dyn CommandRunner,
    workspace: ProjectWorkspace,
    state: InstallState,
}

impl<'a> InstallOrchestrator<'a> {
    /// Enter `Init`. The project name is validated here, before any write.
    pub fn new(
        runner: &'a dyn CommandRunner,
        workspace: ProjectWorkspace,
        reserved_names: &[&str],
    ) -> Result<Self> {
        workspace::check_app_name(workspace.app_name(), reserved_names)?;
        Ok(Self {
            runner,
            workspace,
            state: InstallState::Init,
        })
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    pub fn workspace(&self) -> &ProjectWorkspace {
        &self.workspace
    }

    fn transition(&mut self, next: InstallState) {
        tracing::debug!(from = %self.state, to = %next, "install state");
        self.state = next;
    }

    /// Run the plan to completion. On success the workspace is returned with
    /// its bootstrap manifest and lockfile removed.
    pub async fn run(mut self, plan: &InstallPlan) -> Result<ProjectWorkspace> {
        self.prepare(plan)?;

        match self.install(plan).await {
            Ok(()) => {
                if let Err(e) = self.workspace.strip_scaffold() {
                    return Err(self.roll_back(e));
                }
                self.transition(InstallState::Installed);
                Ok(self.workspace)
            }
            Err(e) => Err(self.roll_back(e)),
        }
    }

    /// `Init -> WorkspacePrepared`
    fn prepare(&mut self, plan: &InstallPlan) -> Result<()> {
        // Nothing of ours is on disk yet, so a refusal here needs no rollback
        self.workspace.prepare_directory()?;

        println!();
        println!(
            "Creating a new app in {}.",
            self.workspace.root().display().to_string().green()
        );
        println!();

        if let Err(e) = self.workspace.write_manifest(plan.dependencies()) {
            return Err(self.roll_back(e));
        }
        self.transition(InstallState::WorkspacePrepared);
        Ok(())
    }

    /// `WorkspacePrepared -> Installing`, returns once the manager exits
    async fn install(&mut self, plan: &InstallPlan) -> Result<()> {
        self.transition(InstallState::Installing);

        let names: Vec<String> = plan
            .dependencies()
            .iter()
            .map(|d| d.display_name().cyan().to_string())
            .collect();
        println!("Installing packages. This might take a couple of minutes.");
        println!("Installing {}...", names.join(", "));
        println!();

        if plan.manager == PackageManager::Yarn && !plan.online {
            println!("{}", "You appear to be offline.".yellow());
            println!("{}", "Falling back to the local Yarn cache.".yellow());
            println!();
        }

        let command = plan.command(&self.workspace);
        match self.runner.run(&command).await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                tracing::debug!(code = ?status.code, "package manager failed");
                Err(BootstrapError::InstallFailure {
                    command: Some(command.to_string()),
                    source: None,
                })
            }
            Err(e) => Err(BootstrapError::InstallFailure {
                command: None,
                source: Some(e),
            }),
        }
    }

    /// `* -> RolledBack`
    fn roll_back(&mut self, error: BootstrapError) -> BootstrapError {
        println!();
        println!("Aborting installation.");
        if let Some(command) = failed_command(&error) {
            println!("  {} has failed.", command.cyan());
        }
        println!();

        let report = workspace::rollback(self.workspace.root());
        tracing::debug!(?report, "rollback finished");
        println!("Done.");

        self.transition(InstallState::RolledBack);
        error
    }
}

/// Command line to name when aborting. Anything else is diagnosed once, at
/// the reporting boundary.
fn failed_command(error: &BootstrapError) -> Option<&str> {
    match error {
        BootstrapError::InstallFailure {
            command: Some(command),
            ..
        } => Some(command),
        _ => None,
    }
}
