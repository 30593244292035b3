pub mod style;
pub mod svg;

pub use style::{Palette, StylingConfig};
pub use svg::render_chart;

use crate::utils::format;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Line,
    GroupedBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    /// Categories run top to bottom, first category on top.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Currency,
    Count,
}

impl ValueFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueFormat::Currency => format::usd_thousands(value),
            ValueFormat::Count => format::thousands(value),
        }
    }

    /// Smallest tick spacing `format` can label without rounding.
    pub fn tick_unit(&self) -> f64 {
        match self {
            ValueFormat::Currency => 1000.0,
            ValueFormat::Count => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Everything a renderer needs to draw one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Optional per-category notes drawn next to the bar, e.g. `n=42`.
    /// Either empty or one entry per category.
    pub annotations: Vec<String>,
    pub value_format: ValueFormat,
    pub orientation: Orientation,
    pub value_labels: bool,
}

impl ChartData {
    pub fn single(
        title: impl Into<String>,
        categories: Vec<String>,
        values: Vec<f64>,
        value_format: ValueFormat,
    ) -> Self {
        let title = title.into();
        Self {
            series: vec![Series {
                name: title.clone(),
                values,
            }],
            title,
            x_label: String::new(),
            y_label: String::new(),
            categories,
            annotations: Vec::new(),
            value_format,
            orientation: Orientation::Vertical,
            value_labels: false,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    pub fn with_value_labels(mut self) -> Self {
        self.value_labels = true;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}
