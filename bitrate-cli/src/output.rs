// bitrate-cli/src/output.rs
//
// Formats a BitrateReport for the terminal.

use bitrate_core::BitrateReport;

/// Renders the report either as JSON or as one line per track.
pub fn render_report(report: &BitrateReport, json: bool) -> Result<String, serde_json::Error> {
    if json {
        serde_json::to_string_pretty(report)
    } else {
        Ok(report.lines().join("\n"))
    }
}
