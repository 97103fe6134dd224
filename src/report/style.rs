//! Colors, dash patterns and chart theme.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Named colors of the reporting palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NamedColor {
    Blue,
    DarkBlue,
    Green,
    Purple,
    Orange,
    MediumLightGray,
    LightGray,
    DarkGray,
    White,
    Black,
    Magenta,
    Beigegrau,
    Blue2,
    Pink,
    DarkGreen,
}

impl NamedColor {
    pub fn hex(self) -> &'static str {
        match self {
            NamedColor::Blue => "#00B7F1",
            NamedColor::DarkBlue => "#000E4E",
            NamedColor::Green => "#81BB41",
            NamedColor::Purple => "#993399",
            NamedColor::Orange => "#E75424",
            NamedColor::MediumLightGray => "#E6E7E8",
            NamedColor::LightGray => "#F1F1F2",
            NamedColor::DarkGray => "#BEC1C3",
            NamedColor::White => "#FFFFFF",
            NamedColor::Black => "#000000",
            NamedColor::Magenta => "#f653a6",
            NamedColor::Beigegrau => "#756f61",
            NamedColor::Blue2 => "#0089b5",
            NamedColor::Pink => "#c460aa",
            NamedColor::DarkGreen => "#263813",
        }
    }
}

/// Colors assigned to forecast series, in order.
pub const FORECAST_COLORS: [NamedColor; 10] = [
    NamedColor::Blue,
    NamedColor::DarkBlue,
    NamedColor::Purple,
    NamedColor::Orange,
    NamedColor::Magenta,
    NamedColor::Blue2,
    NamedColor::Beigegrau,
    NamedColor::Pink,
    NamedColor::DarkGreen,
    NamedColor::Black,
];

/// Dash pattern of a solid line.
pub const SOLID: [u32; 1] = [0];
/// Dash pattern of forecast lines.
pub const DASHED: [u32; 2] = [3, 3];

/// Color of the `index`-th forecast; wraps around after ten.
pub fn forecast_color(index: usize) -> NamedColor {
    FORECAST_COLORS[index % FORECAST_COLORS.len()]
}

/// Display style of one named series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub name: String,
    pub color: NamedColor,
    pub dash: Vec<u32>,
}

/// Ordered color and stroke scheme for a line chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStyles {
    styles: Vec<SeriesStyle>,
    index: HashMap<String, usize>,
}

impl SeriesStyles {
    /// Scheme for actuals, optional prior-year overlays and forecast columns.
    ///
    /// Actuals are solid green, last year dark gray, two years ago medium light
    /// gray and forecasts dashed in [`FORECAST_COLORS`] order. Series appear in
    /// that order too.
    pub fn for_series<S: AsRef<str>>(
        value_fields: &[S],
        actuals_field: &str,
        last_year: bool,
        two_years_ago: bool,
    ) -> Self {
        if value_fields.len() > FORECAST_COLORS.len() {
            warn!(
                series = value_fields.len(),
                "more than {} forecast series, colors will repeat",
                FORECAST_COLORS.len()
            );
        }

        let mut styles = Self::default();
        styles.push(actuals_field, NamedColor::Green, &SOLID);
        if last_year {
            let name = crate::calendar::prior_year_field(actuals_field, 1);
            styles.push(&name, NamedColor::DarkGray, &SOLID);
        }
        if two_years_ago {
            let name = crate::calendar::prior_year_field(actuals_field, 2);
            styles.push(&name, NamedColor::MediumLightGray, &SOLID);
        }
        for (i, field) in value_fields.iter().enumerate() {
            styles.push(field.as_ref(), forecast_color(i), &DASHED);
        }
        styles
    }

    fn push(&mut self, name: &str, color: NamedColor, dash: &[u32]) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.to_string(), self.styles.len());
        self.styles.push(SeriesStyle {
            name: name.to_string(),
            color,
            dash: dash.to_vec(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&SeriesStyle> {
        self.index.get(name).map(|&i| &self.styles[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesStyle> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Series names in display order.
    pub fn domain(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.name.clone()).collect()
    }

    /// Hex colors aligned with [`domain`](Self::domain).
    pub fn colors(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.color.hex().to_string()).collect()
    }

    /// Dash patterns aligned with [`domain`](Self::domain).
    pub fn dashes(&self) -> Vec<Vec<u32>> {
        self.styles.iter().map(|s| s.dash.clone()).collect()
    }
}

/// Font and layout settings handed to chart builders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub font: String,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub axis_title_font_size: u32,
    pub view_width: u32,
    pub view_height: u32,
    pub grid: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font: "Constantia".to_string(),
            title_font_size: 24,
            label_font_size: 24,
            axis_title_font_size: 26,
            view_width: 600,
            view_height: 300,
            grid: false,
        }
    }
}

impl Theme {
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_view_size(mut self, width: u32, height: u32) -> Self {
        self.view_width = width;
        self.view_height = height;
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Theme as a Vega-Lite `config` block.
    pub fn vega_config(&self) -> Value {
        let text = json!({
            "labelFont": self.font,
            "titleFont": self.font,
            "labelFontSize": self.label_font_size,
            "titleFontSize": self.axis_title_font_size,
        });
        let mut axis = text.clone();
        axis["grid"] = json!(self.grid);

        json!({
            "config": {
                "title": { "font": self.font, "fontSize": self.title_font_size },
                "axis": axis,
                "header": text,
                "legend": text,
                "view": { "width": self.view_width, "height": self.view_height },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_styles_follow_plot_order() {
        let styles = SeriesStyles::for_series(&["fc1", "fc2"], "N_SALES", true, true);

        assert_eq!(
            styles.domain(),
            vec![
                "N_SALES",
                "N_SALES_last_year",
                "N_SALES_-2_years",
                "fc1",
                "fc2"
            ]
        );
        assert_eq!(
            styles.colors(),
            vec!["#81BB41", "#BEC1C3", "#E6E7E8", "#00B7F1", "#000E4E"]
        );
        assert_eq!(styles.get("fc2").unwrap().dash, vec![3, 3]);
        assert_eq!(styles.get("N_SALES").unwrap().dash, vec![0]);
    }

    #[test]
    fn prior_year_overlays_are_optional() {
        let styles = SeriesStyles::for_series(&["fc"], "sales", false, false);
        assert_eq!(styles.len(), 2);
        assert!(styles.get("sales_last_year").is_none());
    }

    #[test]
    fn forecast_colors_wrap_around() {
        let fields: Vec<String> = (0..12).map(|i| format!("fc{}", i)).collect();
        let styles = SeriesStyles::for_series(&fields, "sales", false, false);
        assert_eq!(styles.get("fc10").unwrap().color, NamedColor::Blue);
        assert_eq!(styles.get("fc9").unwrap().color, NamedColor::Black);
    }

    #[test]
    fn theme_exports_vega_config() {
        let config = Theme::default().vega_config();
        assert_eq!(config["config"]["title"]["font"], "Constantia");
        assert_eq!(config["config"]["axis"]["titleFontSize"], 26);
        assert_eq!(config["config"]["axis"]["grid"], false);
        assert_eq!(config["config"]["view"]["width"], 600);
        assert!(config["config"]["legend"].get("grid").is_none());
    }
}
