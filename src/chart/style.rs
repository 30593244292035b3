use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_color, validate_range, Validate};
use serde::{Deserialize, Serialize};

/// SVG user units per figure inch.
pub const PIXELS_PER_INCH: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    /// Bars, lines and titles.
    pub primary: &'static str,
    /// One color per series in grouped charts, cycled.
    pub series: &'static [&'static str],
}

pub const PALETTES: [Palette; 4] = [
    Palette {
        name: "neon-purple",
        primary: "#9d00ff",
        series: &["#9d00ff", "#ff00c8", "#00e5ff", "#ffe600"],
    },
    Palette {
        name: "ocean",
        primary: "#1f77b4",
        series: &["#1f77b4", "#17becf", "#2ca02c", "#aec7e8"],
    },
    Palette {
        name: "ember",
        primary: "#ff5722",
        series: &["#ff5722", "#ffc107", "#e91e63", "#795548"],
    },
    Palette {
        name: "forest",
        primary: "#2e7d32",
        series: &["#2e7d32", "#81c784", "#a1887f", "#ffd54f"],
    },
];

pub fn palette(name: &str) -> Option<Palette> {
    PALETTES
        .iter()
        .copied()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Palette {
    pub fn series_color(&self, index: usize) -> &'static str {
        self.series[index % self.series.len()]
    }
}

/// Styling shared by every chart of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingConfig {
    pub color_scheme: String,
    pub background_color: String,
    /// Width and height in inches.
    pub figure_size: (f64, f64),
}

impl Default for StylingConfig {
    fn default() -> Self {
        Self {
            color_scheme: "neon-purple".to_string(),
            background_color: "#000000".to_string(),
            figure_size: (12.0, 6.0),
        }
    }
}

impl StylingConfig {
    pub fn palette(&self) -> Result<Palette> {
        palette(&self.color_scheme).ok_or_else(|| ReportError::InvalidConfigValueError {
            field: "color_scheme".to_string(),
            value: self.color_scheme.clone(),
            reason: format!(
                "Unknown palette. Available palettes: {}",
                PALETTES.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
            ),
        })
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (
            (self.figure_size.0 * PIXELS_PER_INCH).round(),
            (self.figure_size.1 * PIXELS_PER_INCH).round(),
        )
    }

    /// Foreground for text, axes and bar outlines, picked against the background.
    pub fn foreground(&self) -> &'static str {
        if is_light(&self.background_color) {
            "#222222"
        } else {
            "#ffffff"
        }
    }
}

fn is_light(color: &str) -> bool {
    let lower = color.to_ascii_lowercase();
    if lower == "white" {
        return true;
    }
    let Some(hex) = lower.strip_prefix('#') else {
        return false;
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return false,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0) as f64;
    let luminance = 0.299 * channel(0) + 0.587 * channel(2) + 0.114 * channel(4);
    luminance > 140.0
}

impl Validate for StylingConfig {
    fn validate(&self) -> Result<()> {
        self.palette()?;
        validate_color("background_color", &self.background_color)?;
        validate_range("figure_size.width", self.figure_size.0, 2.0, 40.0)?;
        validate_range("figure_size.height", self.figure_size.1, 2.0, 40.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup_is_case_insensitive() {
        assert_eq!(palette("Neon-Purple").unwrap().primary, "#9d00ff");
        assert!(palette("rainbow").is_none());
    }

    #[test]
    fn test_default_styling_is_valid() {
        let style = StylingConfig::default();
        assert!(style.validate().is_ok());
        assert_eq!(style.pixel_size(), (960.0, 480.0));
        assert_eq!(style.foreground(), "#ffffff");
    }

    #[test]
    fn test_light_background_switches_foreground() {
        let style = StylingConfig {
            background_color: "#fafafa".to_string(),
            ..StylingConfig::default()
        };
        assert_eq!(style.foreground(), "#222222");
    }

    #[test]
    fn test_invalid_styling_is_rejected() {
        let unknown_palette = StylingConfig {
            color_scheme: "rainbow".to_string(),
            ..StylingConfig::default()
        };
        assert!(unknown_palette.validate().is_err());

        let tiny = StylingConfig {
            figure_size: (1.0, 6.0),
            ..StylingConfig::default()
        };
        assert!(tiny.validate().is_err());
    }
}
