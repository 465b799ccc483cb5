//! Hand-off to the generator shipped by the installed engine package
//!
//! The entry point runs in a fresh Node.js process so that module resolution
//! uses the engine's own freshly installed dependency tree.

use crate::error::{BootstrapError, Result};
use crate::runtime::{CommandRunner, CommandSpec};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Loader script evaluated by `node -e`. The JSON payload arrives as `argv[1]`.
const LOADER: &str = r#"var payload = JSON.parse(process.argv[1]);
var entry = require(require.resolve(payload.entry, { paths: [payload.root] }));
var init = typeof entry === 'function' ? entry : entry.initProject || entry.default;
if (typeof init !== 'function') {
  console.error('No generator function exported by ' + payload.entry);
  process.exit(1);
}
Promise.resolve(init.apply(null, payload.args)).catch(function (err) {
  console.error(err);
  process.exit(1);
});"#;

/// Node.js binary that runs the generator
const NODE: &str = "node";

/// Plug-and-play loaders, newest name first
const PNP_LOADERS: &[&str] = &[".pnp.cjs", ".pnp.js"];

/// Parameters handed to the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffParams {
    pub root: PathBuf,
    pub app_name: String,
    pub verbose: bool,
    pub original_directory: PathBuf,
    /// Present only when the engine negotiated template support
    pub template_name: Option<String>,
}

#[derive(Serialize)]
struct Payload<'a> {
    entry: String,
    root: &'a Path,
    args: (&'a Path, &'a str, bool, &'a Path, Option<&'a str>),
}

impl HandoffParams {
    /// JSON passed to the loader; `args` is applied positionally
    fn payload(&self, entry: String) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&Payload {
            entry,
            root: &self.root,
            args: (
                &self.root,
                &self.app_name,
                self.verbose,
                &self.original_directory,
                self.template_name.as_deref(),
            ),
        })
    }
}

/// Invokes the engine entry point once the install is complete
pub struct HandoffExecutor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> HandoffExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Build the `node` invocation for `engine`'s entry point
    pub fn command(
        &self,
        engine: &str,
        entry_point: &str,
        params: &HandoffParams,
        use_pnp: bool,
    ) -> Result<CommandSpec> {
        let entry = format!("{}/{}", engine, entry_point);
        let payload = params.payload(entry).map_err(|e| BootstrapError::HandoffFailure {
            engine: engine.to_string(),
            reason: format!("could not encode parameters: {}", e),
        })?;

        let mut args = Vec::new();
        if use_pnp {
            if let Some(loader) = PNP_LOADERS
                .iter()
                .map(|name| params.root.join(name))
                .find(|path| path.exists())
            {
                args.push("--require".to_string());
                args.push(loader.display().to_string());
            }
        }
        args.extend(["-e".to_string(), LOADER.to_string(), "--".to_string(), payload]);

        Ok(CommandSpec::new(NODE)
            .args(args)
            .current_dir(&params.root))
    }

    /// Run the generator. Failures are reported as hand-off failures; the
    /// installed project is left as it is.
    pub async fn execute(
        &self,
        engine: &str,
        entry_point: &str,
        params: &HandoffParams,
        use_pnp: bool,
    ) -> Result<()> {
        let command = self.command(engine, entry_point, params, use_pnp)?;
        tracing::debug!(engine, app = %params.app_name, "handing off to generator");

        match self.runner.run(&command).await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(BootstrapError::HandoffFailure {
                engine: engine.to_string(),
                reason: match status.code {
                    Some(code) => format!("exited with code {}", code),
                    None => "terminated by a signal".to_string(),
                },
            }),
            Err(e) => Err(BootstrapError::HandoffFailure {
                engine: engine.to_string(),
                reason: format!("could not start {}: {}", NODE, e),
            }),
        }
    }
}
