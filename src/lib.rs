//! Shelfdash Book Dashboard Library
//!
//! Loads a books dataset once, draws a bar chart of page counts per title, and
//! redraws a filtered chart when the user picks authors and a maximum page count.
//!
//! # Example
//!
//! ```no_run
//! use shelfdash::prelude::*;
//! use std::sync::Arc;
//!
//! let source = DatasetSource::parse("books.csv");
//! let (dataset, report) = load_dataset(&source, false).unwrap();
//! println!("Loaded {} books, skipped {} rows", dataset.len(), report.skipped);
//!
//! let selection = FilterSelection::new(
//!     AuthorSelection::new(vec!["J.K. Rowling".to_string()]),
//!     Some(500),
//! );
//! let rows = filter_books(&dataset, &selection);
//! let chart = filtered_chart(&rows, &ChartTheme::default());
//! println!("{} bars", chart.bar_count());
//!
//! let dashboard = Dashboard::new(Arc::new(dataset), ChartTheme::default());
//! let html = render_page(&dashboard, 1);
//! assert!(html.contains("Update Graph"));
//! ```

pub mod chart;
pub mod filter;
pub mod interaction;
pub mod layout;
pub mod loader;
pub mod models;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::chart::{build_chart, filtered_chart, initial_chart};
    pub use crate::filter::{filter_books, filter_by_authors, filter_by_max_pages};
    pub use crate::interaction::{
        compute_display, parse_max_pages, HandlerState, InteractionError, InteractionHandler,
        MaxPagesInput, SessionId, UpdateOutcome, UpdateRequest, UpdateStatus, MAX_SESSIONS,
    };
    pub use crate::layout::{render_page, render_summary, Dashboard};
    pub use crate::loader::{
        load_dataset, read_csv, read_workbook, DatasetSource, LoadError, LoadReport,
        DEFAULT_DATASET_URL,
    };
    pub use crate::models::{
        AuthorSelection, BookRecord, ChartSpec, ChartTheme, Dataset, DisplayState,
        FilterSelection, MarginPreset, Summary,
    };
    pub use crate::server::{build_router, serve, AppState, ServeConfig, ServeError};
}

// Re-export commonly used types at the crate root
pub use models::{BookRecord, ChartSpec, ChartTheme, Dataset, FilterSelection};
