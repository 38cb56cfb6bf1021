//! Horizontal bar chart construction and Plotly figure export.

use crate::models::{BookRecord, ChartSpec, ChartTheme, Dataset, MarginPreset};
use serde_json::{json, Value};

/// Number of rows shown on the initial chart
pub const INITIAL_ROWS: usize = 10;

pub const INITIAL_TITLE: &str = "Top 10 Books - Number of pages per title";
pub const FILTERED_TITLE: &str = "Book by author and number of pages";

/// Build a chart of page counts per title.
///
/// Pure function of its inputs: bars follow the order of `records`.
pub fn build_chart(
    records: &[BookRecord],
    title: &str,
    preset: MarginPreset,
    theme: &ChartTheme,
) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        categories: records.iter().map(|r| r.title.clone()).collect(),
        values: records.iter().map(|r| r.num_pages).collect(),
        margin_pad: theme.pad(preset),
        theme: theme.clone(),
    }
}

/// Chart shown at startup: the first rows of the dataset with default padding.
pub fn initial_chart(dataset: &Dataset, theme: &ChartTheme) -> ChartSpec {
    build_chart(
        dataset.head(INITIAL_ROWS),
        INITIAL_TITLE,
        MarginPreset::Default,
        theme,
    )
}

/// Chart shown after an update, with the wider filtered padding.
pub fn filtered_chart(records: &[BookRecord], theme: &ChartTheme) -> ChartSpec {
    build_chart(records, FILTERED_TITLE, MarginPreset::Filtered, theme)
}

impl ChartSpec {
    /// Plotly figure (`data` + `layout`) for the page script.
    pub fn to_plotly(&self) -> Value {
        let theme = &self.theme;
        json!({
            "data": [{
                "type": "bar",
                "orientation": "h",
                "x": self.values,
                "y": self.categories,
                "marker": { "color": theme.bar_color },
                "hovertemplate": format!("{}=%{{x}}<br>title=%{{y}}<extra></extra>", theme.value_label),
            }],
            "layout": {
                "title": { "text": self.title },
                "height": theme.height,
                "width": theme.width,
                "font": { "color": theme.font_color },
                "paper_bgcolor": theme.background,
                "plot_bgcolor": theme.background,
                "xaxis": { "title": { "text": theme.value_label } },
                "yaxis": { "title": { "text": "" } },
                "margin": { "pad": self.margin_pad },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<BookRecord> {
        vec![
            BookRecord::new("Book A", "Author X", 100),
            BookRecord::new("Book B", "Author Y", 300),
        ]
    }

    #[test]
    fn test_build_chart_maps_fields() {
        let theme = ChartTheme::default();
        let chart = build_chart(&records(), "Title", MarginPreset::Default, &theme);

        assert_eq!(chart.categories, vec!["Book A", "Book B"]);
        assert_eq!(chart.values, vec![100, 300]);
        assert_eq!(chart.margin_pad, 25);
        assert_eq!(chart.bar_count(), 2);
    }

    #[test]
    fn test_build_chart_is_deterministic() {
        let theme = ChartTheme::default();
        let a = filtered_chart(&records(), &theme);
        let b = filtered_chart(&records(), &theme);
        assert_eq!(a, b);
        assert_eq!(a.to_plotly(), b.to_plotly());
    }

    #[test]
    fn test_padding_presets_differ() {
        let theme = ChartTheme::default();
        let dataset = Dataset::new(records());
        assert_eq!(initial_chart(&dataset, &theme).margin_pad, 25);
        assert_eq!(filtered_chart(&records(), &theme).margin_pad, 85);
    }

    #[test]
    fn test_initial_chart_takes_first_ten_rows() {
        let rows: Vec<BookRecord> = (0..15)
            .map(|i| BookRecord::new(format!("Book {}", i), "Author", i * 10))
            .collect();
        let chart = initial_chart(&Dataset::new(rows), &ChartTheme::default());

        assert_eq!(chart.bar_count(), INITIAL_ROWS);
        assert_eq!(chart.categories[0], "Book 0");
        assert_eq!(chart.categories[9], "Book 9");
        assert_eq!(chart.title, INITIAL_TITLE);
    }

    #[test]
    fn test_empty_chart_still_renders() {
        let chart = filtered_chart(&[], &ChartTheme::default());
        let fig = chart.to_plotly();

        assert_eq!(fig["data"][0]["x"], json!([]));
        assert_eq!(fig["layout"]["title"]["text"], FILTERED_TITLE);
    }

    #[test]
    fn test_plotly_theme() {
        let fig = filtered_chart(&records(), &ChartTheme::default()).to_plotly();

        assert_eq!(fig["data"][0]["orientation"], "h");
        assert_eq!(fig["data"][0]["marker"]["color"], "#fcba6f");
        assert_eq!(fig["layout"]["paper_bgcolor"], "rgba(0,0,0,0)");
        assert_eq!(fig["layout"]["plot_bgcolor"], "rgba(0,0,0,0)");
        assert_eq!(fig["layout"]["font"]["color"], "rgba(255, 255, 255, 0.9)");
        assert_eq!(fig["layout"]["margin"]["pad"], 85);
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "Number of Pages");
    }
}
