//! Askama templates for the HTML board.

use askama::Template;

use crate::snapshot::StopSnapshot;

/// The departure board page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub sides: Vec<SideView>,
    pub refresh_secs: u64,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One side of the board.
#[derive(Debug, Clone)]
pub struct SideView {
    /// "A" or "B"
    pub label: String,
    pub stop_id: String,
    /// False until the first successful fetch
    pub loaded: bool,
    /// Latest fetch failed; rows are from an earlier one
    pub stale: bool,
    /// Time of the last successful fetch, Warsaw "HH:MM:SS"
    pub updated: String,
    pub rows: Vec<RowView>,
}

impl SideView {
    /// Create from an optional snapshot (`None` = not loaded yet).
    pub fn new(label: &str, stop_id: &str, snapshot: Option<&StopSnapshot>) -> Self {
        let Some(snapshot) = snapshot else {
            return Self {
                label: label.to_string(),
                stop_id: stop_id.to_string(),
                loaded: false,
                stale: false,
                updated: String::new(),
                rows: Vec::new(),
            };
        };

        let rows = snapshot
            .departures
            .iter()
            .map(|d| RowView {
                line: d.line.clone(),
                direction: d.direction.clone(),
                time: d.display_time(),
                delay_minutes: d.delay_minutes(),
                delayed: d.is_delayed(),
            })
            .collect();

        Self {
            label: label.to_string(),
            stop_id: stop_id.to_string(),
            loaded: true,
            stale: snapshot.fetch_error,
            updated: snapshot
                .fetched_at
                .with_timezone(&crate::domain::WARSAW)
                .format("%H:%M:%S")
                .to_string(),
            rows,
        }
    }

    /// Whether there is nothing to list for a loaded stop.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One departure row.
#[derive(Debug, Clone)]
pub struct RowView {
    pub line: String,
    pub direction: String,
    pub time: String,
    pub delay_minutes: u32,
    pub delayed: bool,
}

impl RowView {
    /// Delay cell text: "+3 min", "<1 min" or empty when on time.
    pub fn delay_display(&self) -> String {
        match (self.delayed, self.delay_minutes) {
            (false, _) => String::new(),
            (true, 0) => "<1 min".to_string(),
            (true, m) => format!("+{m} min"),
        }
    }
}
