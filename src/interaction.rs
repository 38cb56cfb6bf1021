//! Update-button interaction handling.
//!
//! Each rendered page gets its own session. A session is a two-state machine:
//! it starts `Idle` (filtered chart hidden, summary empty) and moves to `Updated`
//! on the first accepted activation, where it stays. Every accepted activation
//! recomputes the display from scratch; a rejected one leaves both the state and
//! the displayed output of that session untouched.

use crate::chart::filtered_chart;
use crate::filter::filter_books;
use crate::models::{AuthorSelection, ChartTheme, Dataset, DisplayState, FilterSelection, Summary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Identifies one page load
pub type SessionId = u64;

/// Oldest sessions are dropped past this many open pages
pub const MAX_SESSIONS: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("update button has not been activated")]
    NotActivated,
    #[error("stale activation: n_clicks {n_clicks} is not greater than {last}")]
    StaleActivation { n_clicks: u64, last: u64 },
    #[error("maximum pages value is missing")]
    MissingMaxPages,
    #[error("maximum pages value is not a number: {0}")]
    InvalidMaxPages(String),
    #[error("maximum pages value is out of range: {0}")]
    MaxPagesOutOfRange(String),
}

/// Control values posted by the page when the update button is pressed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub session: SessionId,
    pub n_clicks: u64,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub max_pages: Option<Value>,
}

/// Handler state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerState {
    #[default]
    Idle,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Updated,
    Rejected,
}

/// Result of one activation, sent back to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub status: UpdateStatus,
    pub display: DisplayState,
    /// Plotly figure for `display.chart`, ready for the page script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<Value>,
    /// Rejection reason, only filled in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Maximum-pages control value: the comparison limit plus the text as entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxPagesInput {
    pub limit: i64,
    pub shown: String,
}

/// What one page load has on screen
#[derive(Debug, Clone, Default)]
struct PageSession {
    state: HandlerState,
    last_clicks: u64,
    display: DisplayState,
}

/// Reads control values, filters, charts, and tracks what each page shows.
#[derive(Debug)]
pub struct InteractionHandler {
    dataset: Arc<Dataset>,
    theme: ChartTheme,
    debug: bool,
    sessions: BTreeMap<SessionId, PageSession>,
    next_session: SessionId,
}

impl InteractionHandler {
    pub fn new(dataset: Arc<Dataset>, theme: ChartTheme, debug: bool) -> Self {
        Self {
            dataset,
            theme,
            debug,
            sessions: BTreeMap::new(),
            next_session: 1,
        }
    }

    /// Start a session for a freshly rendered page.
    pub fn open_session(&mut self) -> SessionId {
        let id = self.next_session;
        self.next_session += 1;
        self.make_room();
        self.sessions.insert(id, PageSession::default());
        debug!(session = id, open = self.sessions.len(), "session opened");
        id
    }

    /// Unknown sessions read as idle
    pub fn state(&self, session: SessionId) -> HandlerState {
        self.sessions.get(&session).map(|s| s.state).unwrap_or_default()
    }

    pub fn display(&self, session: SessionId) -> DisplayState {
        self.sessions
            .get(&session)
            .map(|s| s.display.clone())
            .unwrap_or_default()
    }

    /// Process one activation of the update button.
    pub fn handle(&mut self, request: &UpdateRequest) -> UpdateOutcome {
        match self.try_update(request) {
            Ok(display) => {
                if !self.sessions.contains_key(&request.session) {
                    self.make_room();
                }
                let session = self.sessions.entry(request.session).or_default();
                session.state = HandlerState::Updated;
                session.last_clicks = request.n_clicks;
                session.display = display;
                debug!(
                    session = request.session,
                    n_clicks = request.n_clicks,
                    bars = session.display.chart.as_ref().map_or(0, |c| c.bar_count()),
                    "display updated"
                );
                self.outcome(request.session, UpdateStatus::Updated, None)
            }
            Err(e) => {
                warn!(
                    session = request.session,
                    n_clicks = request.n_clicks,
                    error = %e,
                    "update rejected"
                );
                let diagnostic = self.debug.then(|| e.to_string());
                self.outcome(request.session, UpdateStatus::Rejected, diagnostic)
            }
        }
    }

    /// Validate the request and compute the new display without touching state.
    pub fn try_update(&self, request: &UpdateRequest) -> Result<DisplayState, InteractionError> {
        if request.n_clicks == 0 {
            return Err(InteractionError::NotActivated);
        }
        let last = self
            .sessions
            .get(&request.session)
            .map_or(0, |s| s.last_clicks);
        if request.n_clicks <= last {
            return Err(InteractionError::StaleActivation {
                n_clicks: request.n_clicks,
                last,
            });
        }

        let max_pages = parse_max_pages(request.max_pages.as_ref())?;
        let selection = FilterSelection::new(
            AuthorSelection::from(request.authors.clone()),
            Some(max_pages.limit),
        );

        Ok(compute_display(&self.dataset, &selection, &max_pages.shown, &self.theme))
    }

    fn outcome(
        &self,
        session: SessionId,
        status: UpdateStatus,
        diagnostic: Option<String>,
    ) -> UpdateOutcome {
        let display = self.display(session);
        UpdateOutcome {
            status,
            figure: display.chart.as_ref().map(|c| c.to_plotly()),
            display,
            diagnostic,
        }
    }

    /// Drop the oldest sessions so one more fits
    fn make_room(&mut self) {
        while self.sessions.len() >= MAX_SESSIONS {
            self.sessions.pop_first();
        }
    }
}

/// Filter the dataset and build the display for an accepted update.
pub fn compute_display(
    dataset: &Dataset,
    selection: &FilterSelection,
    max_pages_shown: &str,
    theme: &ChartTheme,
) -> DisplayState {
    let rows = filter_books(dataset, selection);
    DisplayState {
        chart_visible: true,
        chart: Some(filtered_chart(&rows, theme)),
        summary: Some(Summary::new(&selection.authors, max_pages_shown)),
    }
}

/// Read the maximum-pages control value.
///
/// Accepts JSON numbers and numeric strings. Fractional values are floored for
/// the comparison only; magnitudes beyond `u32::MAX` are rejected.
pub fn parse_max_pages(raw: Option<&Value>) -> Result<MaxPagesInput, InteractionError> {
    let (number, shown) = match raw {
        None | Some(Value::Null) => return Err(InteractionError::MissingMaxPages),
        Some(Value::Number(n)) => (n.as_f64(), n.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(InteractionError::MissingMaxPages)
        }
        Some(Value::String(s)) => (s.trim().parse::<f64>().ok(), s.trim().to_string()),
        Some(other) => return Err(InteractionError::InvalidMaxPages(other.to_string())),
    };

    match number {
        Some(n) if n.is_finite() && n.abs() <= u32::MAX as f64 => Ok(MaxPagesInput {
            limit: n.floor() as i64,
            shown,
        }),
        Some(n) if n.is_finite() => Err(InteractionError::MaxPagesOutOfRange(shown)),
        _ => Err(InteractionError::InvalidMaxPages(shown)),
    }
}
