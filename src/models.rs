//! Data structures for the shelfdash dashboard.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single row of the books dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub authors: String, // Opaque label, may hold a delimited list of names
    pub num_pages: u32,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, authors: impl Into<String>, num_pages: u32) -> Self {
        Self {
            title: title.into(),
            authors: authors.into(),
            num_pages,
        }
    }
}

/// The loaded dataset. Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<BookRecord>,
    authors: Vec<String>,
    max_num_pages: u32,
}

impl Dataset {
    /// Build a dataset, computing the distinct author list (first-seen order)
    /// and the maximum page count.
    pub fn new(records: Vec<BookRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let authors = records
            .iter()
            .filter(|r| seen.insert(r.authors.clone()))
            .map(|r| r.authors.clone())
            .collect();
        let max_num_pages = records.iter().map(|r| r.num_pages).max().unwrap_or(0);

        Self {
            records,
            authors,
            max_num_pages,
        }
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Distinct author labels in first-seen order
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn max_num_pages(&self) -> u32 {
        self.max_num_pages
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` rows in dataset order
    pub fn head(&self, n: usize) -> &[BookRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

/// Authors picked in the multi-select. Empty means "all authors".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorSelection(Vec<String>);

impl AuthorSelection {
    pub fn new(authors: Vec<String>) -> Self {
        Self(authors)
    }

    pub fn all() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, author: &str) -> bool {
        self.0.iter().any(|a| a == author)
    }

    /// Label shown in the summary card
    pub fn label(&self) -> String {
        if self.is_empty() {
            "All Authors".to_string()
        } else {
            self.names().join(", ")
        }
    }
}

impl From<Option<Vec<String>>> for AuthorSelection {
    fn from(authors: Option<Vec<String>>) -> Self {
        Self(authors.unwrap_or_default())
    }
}

/// Control values read for a single interaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub authors: AuthorSelection,
    pub max_pages: Option<i64>, // None = no page limit
}

impl FilterSelection {
    pub fn new(authors: AuthorSelection, max_pages: Option<i64>) -> Self {
        Self { authors, max_pages }
    }
}

/// Margin padding presets for the two charts on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginPreset {
    /// Initial top-10 chart
    Default,
    /// Chart produced by an update
    Filtered,
}

/// Fixed visual theme shared by every chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTheme {
    pub bar_color: String,
    pub background: String, // Applied to both paper and plot area
    pub font_color: String,
    pub default_pad: u32,
    pub filtered_pad: u32,
    pub height: u32,
    pub width: u32,
    pub value_label: String,
}

impl ChartTheme {
    pub fn pad(&self, preset: MarginPreset) -> u32 {
        match preset {
            MarginPreset::Default => self.default_pad,
            MarginPreset::Filtered => self.filtered_pad,
        }
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            bar_color: "#fcba6f".to_string(),
            background: "rgba(0,0,0,0)".to_string(),
            font_color: "rgba(255, 255, 255, 0.9)".to_string(),
            default_pad: 25,
            filtered_pad: 85,
            height: 600,
            width: 1200,
            value_label: "Number of Pages".to_string(),
        }
    }
}

/// Render-ready description of a horizontal bar chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub categories: Vec<String>, // Titles, one per bar
    pub values: Vec<u32>,        // Page counts, aligned with categories
    pub margin_pad: u32,
    pub theme: ChartTheme,
}

impl ChartSpec {
    pub fn bar_count(&self) -> usize {
        self.values.len()
    }
}

/// Text shown in the "Selected Books" card after an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub authors_line: String,
    pub max_pages_line: String,
}

impl Summary {
    /// `max_pages` is shown as the user entered it
    pub fn new(authors: &AuthorSelection, max_pages: impl std::fmt::Display) -> Self {
        Self {
            authors_line: format!("Selected Author(s): {}", authors.label()),
            max_pages_line: format!("Maximum Pages: {}", max_pages),
        }
    }
}

/// What the filtered-chart region and summary card currently show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub chart_visible: bool,
    pub chart: Option<ChartSpec>,
    pub summary: Option<Summary>,
}

impl DisplayState {
    /// Nothing requested yet: hidden chart region, empty summary
    pub fn idle() -> Self {
        Self::default()
    }
}
