//! Axis options.
//!
//! Supplied by the host as a camelCase object; every field is optional.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Ticks run along x; hierarchy rows stack downwards from the band start.
    #[default]
    Horizontal,
    /// Ticks run along y; hierarchy rows stack leftwards from the band start.
    Vertical,
}

/// Where a group's label is anchored relative to its visible span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupLabelPosition {
    /// Midway between the first and last visible descendant.
    #[default]
    Center,
    /// At the first visible descendant.
    First,
    /// At the last visible descendant.
    Last,
}

/// Configuration for the hierarchy axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    /// Tick spacing shrink ratio per nesting level.
    pub level_percentage: f32,
    /// Gap between the axis line and the first hierarchy row.
    pub padding: f32,
    /// Height of one hierarchy row.
    pub row_height: f32,
    pub orientation: Orientation,
    pub group_label_position: GroupLabelPosition,
    /// Disable all interactions.
    #[serde(rename = "static")]
    pub static_axis: bool,
    /// Attribute name to default value, resolved per visible node.
    pub attributes: Map<String, Value>,
    /// Max level for the console logger ("off", "error", "warn", "info", "debug", "trace").
    pub log_level: String,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            level_percentage: 0.75,
            padding: 5.0,
            row_height: 30.0,
            orientation: Orientation::Horizontal,
            group_label_position: GroupLabelPosition::Center,
            static_axis: false,
            attributes: Map::new(),
            log_level: "warn".to_owned(),
        }
    }
}

impl AxisOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.level_percentage > 0.0 && self.level_percentage <= 1.0) {
            return Err(ConfigError::LevelPercentage(self.level_percentage));
        }
        if !(self.row_height > 0.0) {
            return Err(ConfigError::RowHeight(self.row_height));
        }
        if !(self.padding >= 0.0) {
            return Err(ConfigError::Padding(self.padding));
        }
        Ok(())
    }

    /// Parsed `log_level`, falling back to `Warn` for unknown names.
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AxisOptions::default().validate().is_ok());
    }

    #[test]
    fn test_partial_camel_case_input() {
        let options: AxisOptions = serde_json::from_str(
            r#"{"levelPercentage": 0.5, "static": true, "orientation": "vertical",
                "groupLabelPosition": "last", "attributes": {"backgroundColor": "gray"}}"#,
        )
        .expect("options");
        assert_eq!(options.level_percentage, 0.5);
        assert!(options.static_axis);
        assert_eq!(options.orientation, Orientation::Vertical);
        assert_eq!(options.group_label_position, GroupLabelPosition::Last);
        assert_eq!(options.row_height, 30.0, "missing fields keep defaults");
        assert_eq!(options.attributes.len(), 1);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        for ratio in [0.0, -0.5, 1.5, f32::NAN] {
            let options = AxisOptions {
                level_percentage: ratio,
                ..Default::default()
            };
            assert!(
                matches!(options.validate(), Err(ConfigError::LevelPercentage(_))),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_row_height_and_padding_rejected() {
        let options = AxisOptions {
            row_height: 0.0,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::RowHeight(0.0)));

        let options = AxisOptions {
            padding: -1.0,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::Padding(-1.0)));
    }

    #[test]
    fn test_log_filter_parsing() {
        let mut options = AxisOptions::default();
        assert_eq!(options.log_filter(), log::LevelFilter::Warn);
        options.log_level = "debug".into();
        assert_eq!(options.log_filter(), log::LevelFilter::Debug);
        options.log_level = "loud".into();
        assert_eq!(options.log_filter(), log::LevelFilter::Warn);
    }
}
