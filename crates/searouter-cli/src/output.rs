//! Output formatting for route rendering.
//!
//! The library produces [`RouteSummary`] values; this module decides how they
//! reach stdout.

use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use searouter_lib::RouteSummary;

/// Output format for the route subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly route listing.
    #[default]
    Text,
    /// Structured summary as pretty-printed JSON.
    Json,
    /// GeoJSON `Feature` with a `LineString` geometry.
    Geojson,
}

/// Render a route summary in the requested format.
pub fn render_route(summary: &RouteSummary, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => summary.render_plain(),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(summary)?),
        OutputFormat::Geojson => format!("{}\n", serde_json::to_string_pretty(&summary.to_geojson())?),
    };
    Ok(rendered)
}

/// Pretty-print any serialisable value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable duration: milliseconds below one second, seconds above.
pub fn format_elapsed(elapsed: Duration) -> String {
    let elapsed_ms = elapsed.as_millis();
    if elapsed_ms < 1000 {
        format!("{elapsed_ms}ms")
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}
