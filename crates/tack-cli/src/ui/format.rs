//! Formatting utilities for sizes and module summaries.

use console::style;
use tack_assembly::ModuleDescriptors;

/// Format a byte count in human-readable form.
///
/// # Examples
///
/// ```
/// use tack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Print one line per resolved module to stderr.
pub fn print_module_summary(modules: &ModuleDescriptors) {
    if modules.is_empty() {
        eprintln!("  {}", style("no modules enabled").dim());
        return;
    }

    let width = modules.keys().map(|name| name.len()).max().unwrap_or(0);
    for descriptor in modules.values() {
        let kinds = descriptor
            .acts_as
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let routes = if descriptor.routes.is_empty() {
            String::new()
        } else {
            format!(" {}", descriptor.routes.join(" "))
        };

        eprintln!(
            "  {:<width$}  {:<16}{}  {}",
            style(&descriptor.module).bold(),
            style(kinds).cyan(),
            style(routes).green(),
            style(descriptor.location.display()).dim(),
            width = width,
        );
    }
}
