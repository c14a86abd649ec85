//! Column alias tables
//!
//! Tabular inputs come from several tools that disagree on header names.
//! Aliases are resolved once at the ingestion boundary; the engine never sees
//! column names.

use serde::{Deserialize, Serialize};

/// Accepted header names per logical column, matched in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    /// Frame number in the diameter table (row position when none matches)
    #[serde(default = "default_frame")]
    pub frame: Vec<String>,

    /// Diameter value in the diameter table (required)
    #[serde(default = "default_diameter")]
    pub diameter: Vec<String>,

    /// Pressure already joined into the diameter table (optional)
    #[serde(default = "default_pressure")]
    pub pressure: Vec<String>,

    /// Pre-computed frame time in seconds (optional)
    #[serde(default = "default_time")]
    pub time: Vec<String>,

    /// Frame column of the frame/timestamp table
    #[serde(default = "default_timestamp_frame")]
    pub timestamp_frame: Vec<String>,

    /// Timestamp column of the frame/timestamp table
    #[serde(default = "default_timestamp")]
    pub timestamp: Vec<String>,
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_frame() -> Vec<String> {
    strings(&["Frame", "frame", "frame_number", "Frame Number"])
}

fn default_diameter() -> Vec<String> {
    strings(&[
        "Diameter (mm)",
        "Diameter",
        "diameter",
        "avg_diameter",
        "mean_diameter",
        "diameter_mm",
        "avg_diameter_mm",
        "diameter_pixels",
        "Diameter (pixels)",
    ])
}

fn default_pressure() -> Vec<String> {
    strings(&["pressure", "Pressure"])
}

fn default_time() -> Vec<String> {
    strings(&["time_seconds"])
}

fn default_timestamp_frame() -> Vec<String> {
    strings(&["Frame Number"])
}

fn default_timestamp() -> Vec<String> {
    strings(&["Timestamp"])
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            frame: default_frame(),
            diameter: default_diameter(),
            pressure: default_pressure(),
            time: default_time(),
            timestamp_frame: default_timestamp_frame(),
            timestamp: default_timestamp(),
        }
    }
}

impl ColumnAliases {
    /// Index of the first header matching any alias (alias order wins)
    pub fn find(aliases: &[String], headers: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h.trim() == alias.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_order_wins_over_header_order() {
        let aliases = ColumnAliases::default();
        let headers = ["diameter_mm", "Frame", "Diameter (mm)"];
        assert_eq!(ColumnAliases::find(&aliases.diameter, &headers), Some(2));
        assert_eq!(ColumnAliases::find(&aliases.frame, &headers), Some(1));
        assert_eq!(ColumnAliases::find(&aliases.pressure, &headers), None);
    }

    #[test]
    fn test_find_trims_headers() {
        let aliases = ColumnAliases::default();
        assert_eq!(ColumnAliases::find(&aliases.timestamp, &[" Timestamp "]), Some(0));
    }
}
