//! Runtime detection and external process plumbing
//!
//! This module provides:
//! - Node.js / npm / Yarn version detection
//! - Package manager selection and install command lines
//! - The environment probe consumed by the create flow
//! - A command runner that streams child output

pub mod check;
pub mod command;
pub mod manager;
pub mod probe;

pub use check::{check_node, check_npm, check_yarn, RuntimeInfo};
pub use command::{CommandRunner, CommandSpec, CommandStatus, StreamingRunner};
pub use manager::{ManagerVersionInfo, PackageManager};
pub use probe::{EnvironmentProbe, SystemProbe};
