//! Bootstrap Core - Shared library for one-command project bootstrappers
//!
//! This library resolves which packages make up a new project, installs them
//! through npm or Yarn, and hands control to the generator shipped by the
//! installed "engine" package. It is designed to be used by bootstrapper
//! binaries that differ only in their product configuration.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Pure decisions** - specifier resolution, template negotiation, naming rules
//! - **Layer 2: Collaborators** - registry, environment probe and command runner traits
//! - **Layer 3: Orchestration** - the install state machine, rollback and generator hand-off
//!
//! # Example Usage
//!
//! ```ignore
//! use bootstrap_core::{create_app, CreateRequest, Services};
//! use bootstrap_core::registry::NpmRegistry;
//! use bootstrap_core::runtime::{StreamingRunner, SystemProbe};
//!
//! let registry = NpmRegistry::from_config(&MyConfig)?;
//! let services = Services { registry: &registry, probe: &SystemProbe, runner: &StreamingRunner };
//! create_app(&MyConfig, &request, services, "1.0.0").await?;
//! ```

pub mod compat;
pub mod create;
pub mod error;
pub mod handoff;
pub mod info;
pub mod install;
mod paths;
pub mod product;
pub mod registry;
pub mod report;
pub mod runtime;
pub mod specifier;
pub mod workspace;

// Re-export main types for convenience
pub use create::{create_app, CreateRequest, CreatedApp, Services};
pub use error::{BootstrapError, Result};
pub use install::{InstallOrchestrator, InstallPlan, InstallState};
pub use product::ProductConfig;
pub use registry::{PackageMetadata, PackageRegistry};
pub use specifier::{PackageSpecifier, ResolvedReference, Role, Specifier};
pub use workspace::ProjectWorkspace;
