//! Visual style of a chart series.
//!
//! The chart model only carries these attributes. Renderers decide how
//! each one maps onto their output format.

use serde::{Deserialize, Serialize};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Points connected by straight segments.
    #[default]
    Lines,
    /// Small point markers.
    Points,
    /// Circle markers sized by the chart's circle radius.
    Circles,
}

/// Fill of a closed marker.
///
/// Serialized as `"solid <density>"` or `"empty"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Fill {
    /// Solid fill with the given opacity (0.0-1.0).
    Solid {
        /// Fill opacity.
        density: f64,
    },
    /// Outline only.
    Empty,
}

impl TryFrom<String> for Fill {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("empty"), None, None) => Ok(Self::Empty),
            (Some("solid"), None, None) => Ok(Self::Solid { density: 1.0 }),
            (Some("solid"), Some(d), None) => match d.parse::<f64>() {
                Ok(density) if (0.0..=1.0).contains(&density) => Ok(Self::Solid { density }),
                _ => Err(format!("invalid fill density '{d}'")),
            },
            _ => Err(format!("unknown fill '{value}'")),
        }
    }
}

impl From<Fill> for String {
    fn from(value: Fill) -> Self {
        match value {
            Fill::Solid { density } => format!("solid {density}"),
            Fill::Empty => "empty".to_string(),
        }
    }
}

/// Closed set of rendering directives for one series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    /// Line or marker kind.
    #[serde(default)]
    pub kind: MarkKind,
    /// Line width in renderer units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    /// Color name or `#rrggbb` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Marker fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    /// Draw a border around filled markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
}

impl Style {
    /// Solid line of the given color and width.
    #[must_use]
    pub fn lines(color: impl Into<String>, width: f64) -> Self {
        Self {
            kind: MarkKind::Lines,
            line_width: Some(width),
            color: Some(color.into()),
            ..Default::default()
        }
    }

    /// Solid, bordered circle markers of the given color.
    #[must_use]
    pub fn circles(color: impl Into<String>) -> Self {
        Self {
            kind: MarkKind::Circles,
            color: Some(color.into()),
            fill: Some(Fill::Solid { density: 1.0 }),
            border: Some(true),
            ..Default::default()
        }
    }

    /// Point markers of the given color.
    #[must_use]
    pub fn points(color: impl Into<String>) -> Self {
        Self {
            kind: MarkKind::Points,
            color: Some(color.into()),
            ..Default::default()
        }
    }

    /// Sets the line width.
    #[must_use]
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_defaults() {
        let style = Style::circles("purple");
        assert_eq!(style.kind, MarkKind::Circles);
        assert_eq!(style.fill, Some(Fill::Solid { density: 1.0 }));
        assert_eq!(style.border, Some(true));
        assert_eq!(style.line_width, None);
    }

    #[test]
    fn test_style_from_toml() {
        let style: Style = toml::from_str(
            r#"
kind = "circles"
color = "goldenrod"
fill = "solid 0.5"
"#,
        )
        .unwrap();

        assert_eq!(style.kind, MarkKind::Circles);
        assert_eq!(style.color.as_deref(), Some("goldenrod"));
        assert_eq!(style.fill, Some(Fill::Solid { density: 0.5 }));
    }

    #[test]
    fn test_fill_strings() {
        assert_eq!(Fill::try_from("empty".to_string()).unwrap(), Fill::Empty);
        assert_eq!(Fill::try_from("solid".to_string()).unwrap(), Fill::Solid { density: 1.0 });
        assert!(Fill::try_from("solid 2".to_string()).is_err());
        assert!(Fill::try_from("hatched".to_string()).is_err());
        assert_eq!(String::from(Fill::Solid { density: 1.0 }), "solid 1");
    }
}
