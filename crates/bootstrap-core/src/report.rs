//! Human-readable diagnosis for terminal errors

use crate::error::BootstrapError;
use crate::product::ProductConfig;
use colored::Colorize;

/// Print what went wrong and what the user can do about it
pub fn print_error<C: ProductConfig>(config: &C, error: &BootstrapError) {
    match error {
        BootstrapError::MissingProjectName => {
            eprintln!("Please specify the project directory:");
            println!("  {} {}", config.name().cyan(), "<project-directory>".green());
            println!();
            println!("For example:");
            println!(
                "  {} {}",
                config.name().cyan(),
                format!("{}-app", config.display_name().to_lowercase()).green()
            );
            println!();
            println!(
                "Run {} to see all options.",
                format!("{} --help", config.name()).cyan()
            );
        }
        BootstrapError::InvalidName { name, problems } => {
            eprintln!(
                "{}",
                format!(
                    "Cannot create a project named {} because of npm naming restrictions:\n",
                    format!("\"{}\"", name).green()
                )
                .red()
            );
            for problem in problems {
                eprintln!("{}", format!("  * {}", problem).red());
            }
            eprintln!("{}", "\nPlease choose a different project name.".red());
        }
        BootstrapError::ReservedName { name, reserved } => {
            eprintln!(
                "{}",
                format!(
                    "Cannot create a project named {} because a dependency with the same name exists.\n\
                     Due to the way npm works, the following names are not allowed:\n",
                    format!("\"{}\"", name).green()
                )
                .red()
            );
            for dependency in reserved {
                eprintln!("{}", format!("  {}", dependency).cyan());
            }
            eprintln!("{}", "\nPlease choose a different project name.".red());
        }
        BootstrapError::UnsafeWorkspace { root, conflicts } => {
            let dir_name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string());
            println!(
                "The directory {} contains files that could conflict:",
                dir_name.green()
            );
            println!();
            for conflict in conflicts {
                println!("  {}", conflict);
            }
            println!();
            println!("Either try using a new directory name, or remove the files listed above.");
        }
        // A failing command was already named while rolling back
        BootstrapError::InstallFailure {
            command: Some(_), ..
        } => {}
        BootstrapError::HandoffFailure { engine, reason } => {
            println!();
            eprintln!(
                "{}",
                format!("The {} generator did not complete: {}.", engine, reason).red()
            );
            println!(
                "Your project's packages were installed successfully and have been left in place."
            );
            println!(
                "Fix the problem above, then run the generator from {} again.",
                engine.cyan()
            );
        }
        BootstrapError::InstallFailure { command: None, .. } | BootstrapError::Io { .. } => {}
    }

    if let Some(detail) = unexpected_detail(error) {
        eprintln!("{}", "Unexpected error. Please report it as a bug:".red());
        eprintln!("{}", detail);
    }

    if error.is_unexpected() {
        println!();
        println!("If you have any problems, do not hesitate to file an issue:");
        println!("  {}", config.issues_url().cyan());
    }
}

/// Text shown under the bug-report header, for errors we did not anticipate
fn unexpected_detail(error: &BootstrapError) -> Option<String> {
    if !error.is_unexpected() {
        return None;
    }
    Some(match error {
        BootstrapError::InstallFailure {
            source: Some(source),
            ..
        } => format!("{}: {}", error, source),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_install_failure_is_not_a_bug() {
        let error = BootstrapError::InstallFailure {
            command: Some("npm install test-scripts".into()),
            source: None,
        };
        assert_eq!(unexpected_detail(&error), None);
    }

    #[test]
    fn test_spawn_failure_shows_cause() {
        let error = BootstrapError::InstallFailure {
            command: None,
            source: Some(std::io::Error::new(std::io::ErrorKind::NotFound, "npm not found")),
        };
        assert_eq!(
            unexpected_detail(&error).as_deref(),
            Some("installation failed: npm not found")
        );
    }

    #[test]
    fn test_io_error_detail() {
        let error = BootstrapError::io(
            "Failed to write package.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            unexpected_detail(&error).as_deref(),
            Some("Failed to write package.json: denied")
        );
    }
}
