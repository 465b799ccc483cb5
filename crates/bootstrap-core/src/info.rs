//! Environment debug info (`--info`)

use crate::product::ProductConfig;
use crate::runtime::{check_node, check_npm, check_yarn, RuntimeInfo};
use colored::Colorize;
use sysinfo::System;

fn binary_line(info: &RuntimeInfo) -> String {
    format!(
        "    {}: {}",
        info.name,
        info.version.as_deref().unwrap_or("Not Found")
    )
}

/// Operating system and processor of the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub kernel: Option<String>,
    pub cpu: String,
}

impl HostInfo {
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        let model = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim())
            .filter(|brand| !brand.is_empty());

        Self {
            os: os_line(&os_info::get()),
            kernel: System::kernel_version(),
            cpu: cpu_line(sys.cpus().len(), std::env::consts::ARCH, model),
        }
    }

    fn lines(&self) -> Vec<String> {
        let os = match &self.kernel {
            Some(kernel) => format!("{} (kernel {})", self.os, kernel),
            None => self.os.clone(),
        };
        vec![format!("    OS: {}", os), format!("    CPU: {}", self.cpu)]
    }
}

/// `Ubuntu 22.4.0`, or just the OS type when its version is unknown
fn os_line(info: &os_info::Info) -> String {
    if *info.version() == os_info::Version::Unknown {
        info.os_type().to_string()
    } else {
        format!("{} {}", info.os_type(), info.version())
    }
}

/// `(8) x86_64 Intel(R) Core(TM) i7`, leaving out what could not be read
fn cpu_line(count: usize, arch: &str, model: Option<&str>) -> String {
    let mut line = String::new();
    if count > 0 {
        line.push_str(&format!("({}) ", count));
    }
    line.push_str(arch);
    if let Some(model) = model {
        line.push(' ');
        line.push_str(model);
    }
    line
}

/// Lines of the environment report, without styling
pub fn environment_info<C: ProductConfig>(
    config: &C,
    cli_version: &str,
    host: &HostInfo,
) -> Vec<String> {
    let running_from = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let mut lines = vec![
        format!("  current version of {}: {}", config.name(), cli_version),
        format!("  running from {}", running_from),
        String::new(),
        "  System:".to_string(),
    ];
    lines.extend(host.lines());
    lines.push("  Binaries:".to_string());
    lines.extend([check_node(), check_npm(), check_yarn()].iter().map(binary_line));
    lines
}

/// Print the environment report
pub fn print_environment_info<C: ProductConfig>(config: &C, cli_version: &str) {
    println!("{}", "\nEnvironment Info:".bold());
    println!();
    for line in environment_info(config, cli_version, &HostInfo::detect()) {
        println!("{}", line);
    }
}
