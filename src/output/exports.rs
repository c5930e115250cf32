use std::io::Write;

use crate::dashboard::Dashboard;
use crate::error::Result;

/// Writes the collected dashboard data as JSON.
///
/// Useful for feeding the same numbers into other tools or for debugging a
/// template without hitting the API again.
pub fn export_json(dashboard: &Dashboard, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(dashboard)?
    } else {
        serde_json::to_string(dashboard)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}
