use std::io::Write as IoWrite;

use crate::error::Result;
use crate::inventory::{ScanOutcome, ScanResult};

use super::OutputFormatter;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Auto-detect: use colors if stdout is a TTY and `NO_COLOR` is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// ANSI color codes
mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const DIM: &str = "\x1b[2m";
    pub const RESET: &str = "\x1b[0m";
}

pub struct TextFormatter {
    use_colors: bool,
    verbose: u8,
}

impl TextFormatter {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self::with_verbose(mode, 0)
    }

    #[must_use]
    pub fn with_verbose(mode: ColorMode, verbose: u8) -> Self {
        Self {
            use_colors: Self::should_use_colors(mode),
            verbose,
        }
    }

    fn should_use_colors(mode: ColorMode) -> bool {
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                // Respect NO_COLOR environment variable
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                std::io::IsTerminal::is_terminal(&std::io::stdout())
            }
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{}", ansi::RESET)
        } else {
            text.to_string()
        }
    }

    fn format_package(
        &self,
        package: &crate::inventory::Package,
        output: &mut Vec<u8>,
    ) {
        let location = package
            .locations
            .first()
            .map_or_else(String::new, |p| format!(" ({})", p.display()));
        writeln!(
            output,
            "  {} {}{}",
            package.name,
            package.version,
            self.colorize(&location, ansi::DIM)
        )
        .ok();
        if self.verbose > 0 {
            writeln!(output, "    extractor: {}", package.extractor).ok();
        }
    }

    fn format_status(
        &self,
        status: &crate::inventory::PluginStatus,
        output: &mut Vec<u8>,
    ) {
        match &status.outcome {
            ScanOutcome::Success => {
                let found = if status.found_inventory {
                    "found inventory"
                } else {
                    "nothing found"
                };
                writeln!(
                    output,
                    "  {} {}: {found}",
                    self.colorize("✓", ansi::GREEN),
                    status.name
                )
                .ok();
            }
            ScanOutcome::Failed { reasons } => {
                writeln!(
                    output,
                    "  {} {}: {} error(s)",
                    self.colorize("✗", ansi::RED),
                    status.name,
                    reasons.len()
                )
                .ok();
                for reason in reasons {
                    writeln!(output, "      {reason}").ok();
                }
            }
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ScanResult) -> Result<String> {
        let mut output = Vec::new();

        writeln!(output, "Inventory ({} package(s)):", result.inventory.len()).ok();
        for package in &result.inventory {
            self.format_package(package, &mut output);
        }

        writeln!(output).ok();
        writeln!(output, "Extractors:").ok();
        for status in &result.statuses {
            self.format_status(status, &mut output);
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
