mod exports;
mod render;
mod styling;

pub use exports::export_json;
pub use render::{write_output, DashboardRenderer};
pub use styling::bright_green;

use styling::{dim, magenta_bold};

/// Prints the pipeboard banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📊 pipeboard"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI pipeline dashboard")
    );
}
