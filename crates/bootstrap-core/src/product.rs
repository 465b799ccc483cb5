//! Product configuration trait for bootstrapper binaries
//!
//! This trait defines the interface that each product must implement to
//! configure which packages get installed and how the generator is reached.

/// Configuration trait for different bootstrapper products
///
/// Each product implements this trait to define:
/// - Product identity (bootstrapper package name, display name)
/// - Engine and template package conventions
/// - Names a new project is not allowed to take
/// - Registry location and bug report links
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Package name of the bootstrapper itself (used for the self-update check)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default engine package, installed when no engine specifier is given
    fn engine_package(&self) -> &'static str;

    /// Canonical template package name; also the prefix for short template names
    fn template_package(&self) -> &'static str;

    /// Package names a new project may not use
    fn reserved_names(&self) -> &'static [&'static str];

    /// First engine version whose entry point understands the template argument
    fn template_min_engine_version(&self) -> &'static str;

    /// Entry point path inside the engine package
    fn engine_entry_point(&self) -> &'static str {
        "scripts/init.js"
    }

    /// Default package registry base URL
    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Where users should file bug reports
    fn issues_url(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Registry URL after applying the environment override
    fn registry_url(&self) -> String {
        std::env::var(self.registry_url_env())
            .unwrap_or_else(|_| self.default_registry_url().to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ProductConfig;

    /// Product used by unit tests across the crate
    #[derive(Clone)]
    pub struct TestProduct;

    impl ProductConfig for TestProduct {
        fn name(&self) -> &'static str {
            "create-test-app"
        }

        fn display_name(&self) -> &'static str {
            "Test"
        }

        fn engine_package(&self) -> &'static str {
            "test-scripts"
        }

        fn template_package(&self) -> &'static str {
            "test-template"
        }

        fn reserved_names(&self) -> &'static [&'static str] {
            &["test-cli", "test-scripts", "test-template"]
        }

        fn template_min_engine_version(&self) -> &'static str {
            "1.1.0"
        }

        fn registry_url_env(&self) -> &'static str {
            "TEST_APP_REGISTRY_URL"
        }

        fn issues_url(&self) -> &'static str {
            "https://example.invalid/issues"
        }
    }
}
