//! Author and page-count filtering over the dataset.
//!
//! Every filter preserves dataset order, and the two filters compose in either
//! order with the same result.

use crate::models::{AuthorSelection, BookRecord, Dataset, FilterSelection};

/// Apply both filters of a selection to the dataset.
///
/// Returns an empty vector, not an error, when nothing matches.
pub fn filter_books(dataset: &Dataset, selection: &FilterSelection) -> Vec<BookRecord> {
    let by_author = filter_by_authors(dataset.records(), &selection.authors);
    filter_by_max_pages(&by_author, selection.max_pages)
}

/// Keep records whose `authors` label exactly matches one of the selected names.
/// An empty selection keeps everything.
pub fn filter_by_authors(records: &[BookRecord], authors: &AuthorSelection) -> Vec<BookRecord> {
    if authors.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|r| authors.contains(&r.authors))
        .cloned()
        .collect()
}

/// Keep records with `num_pages <= max_pages` (inclusive). `None` keeps everything.
pub fn filter_by_max_pages(records: &[BookRecord], max_pages: Option<i64>) -> Vec<BookRecord> {
    match max_pages {
        None => records.to_vec(),
        Some(max) => records
            .iter()
            .filter(|r| i64::from(r.num_pages) <= max)
            .cloned()
            .collect(),
    }
}
