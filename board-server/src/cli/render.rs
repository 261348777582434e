//! Plain-text rendering of the board.

use std::fmt::Write;

use chrono::DateTime;

use super::payload::{BoardPayload, RowPayload, SidePayload};

const HEADERS: [&str; 4] = ["Line", "Direction", "Time (Warsaw)", "Delay"];

/// What one poll of the server produced.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// 200: both sides fresh.
    Fresh(BoardPayload),
    /// 502: at least one side is showing data from an earlier fetch.
    Stale(BoardPayload),
    /// 503: the server has not fetched both stops yet.
    NotLoaded,
}

/// Render a whole poll result.
pub fn render_outcome(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Fresh(board) => render_board(board),
        PollOutcome::Stale(board) => {
            let reason = board.message.as_deref().unwrap_or("fetch error");
            format!(
                "WARNING: upstream unavailable ({reason}), showing last known data\n\n{}",
                render_board(board)
            )
        }
        PollOutcome::NotLoaded => "Departures not loaded yet, waiting for the first fetch.\n".to_string(),
    }
}

/// Both sides, A above B.
pub fn render_board(board: &BoardPayload) -> String {
    let mut out = String::new();
    for (name, side) in [("A", &board.side_a), ("B", &board.side_b)] {
        match side {
            Some(side) => out.push_str(&render_side(name, side)),
            None => {
                let _ = writeln!(out, "Side {name}: no data");
            }
        }
        out.push('\n');
    }
    out
}

/// One side as an aligned table.
pub fn render_side(name: &str, side: &SidePayload) -> String {
    let mut out = String::new();

    let mut title = format!("Side {name}");
    if !side.stop_id.is_empty() {
        let _ = write!(title, " (stop {})", side.stop_id);
    }
    if side.error {
        title.push_str(" [stale]");
    }
    let _ = writeln!(out, "{title}");

    if side.data.is_empty() {
        out.push_str("No departures.\n");
        return out;
    }

    let rows: Vec<[String; 4]> = side.data.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out
}

/// Delay cell text: "+3 min", "<1 min" or empty when on time.
pub fn format_delay(delay_seconds: u32) -> String {
    match delay_seconds {
        0 => String::new(),
        1..=59 => "<1 min".to_string(),
        s => format!("+{} min", s / 60),
    }
}

/// Wall-clock part of an RFC 3339 timestamp, or the raw text if it does
/// not parse.
fn format_time(time: Option<&str>) -> String {
    match time {
        None => "-".to_string(),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

fn row_cells(row: &RowPayload) -> [String; 4] {
    [
        row.line.clone(),
        row.direction.clone(),
        format_time(row.time_warsaw.as_deref()),
        format_delay(row.delay_seconds),
    ]
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(error: bool) -> SidePayload {
        SidePayload {
            stop_id: "1752".into(),
            error,
            last_update: None,
            data: vec![
                RowPayload {
                    line: "10".into(),
                    direction: "Łostowice Świętokrzyska".into(),
                    time_warsaw: Some("2025-08-13T14:10:00+02:00".into()),
                    delay_seconds: 185,
                },
                RowPayload {
                    line: "N1".into(),
                    direction: "Oliwa".into(),
                    time_warsaw: None,
                    delay_seconds: 0,
                },
            ],
        }
    }

    #[test]
    fn renders_aligned_table() {
        let text = render_side("A", &side(false));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Side A (stop 1752)");
        assert!(lines[1].starts_with("Line | Direction"));
        assert!(lines[1].contains("Time (Warsaw)"));
        assert!(lines[3].contains("14:10:00"));
        assert!(lines[3].contains("+3 min"));
        assert!(lines[4].starts_with("N1   | Oliwa"));
        assert!(lines[4].contains(" - "));

        // Direction column padded by characters, not bytes
        let direction_col = |l: &str| l.split(" | ").nth(1).map(|c| c.chars().count());
        assert_eq!(direction_col(lines[3]), direction_col(lines[4]));
    }

    #[test]
    fn empty_side() {
        let empty = SidePayload {
            stop_id: "1".into(),
            ..SidePayload::default()
        };
        assert_eq!(render_side("B", &empty), "Side B (stop 1)\nNo departures.\n");
    }

    #[test]
    fn stale_outcome_warns_and_marks_side() {
        let board = BoardPayload {
            message: Some("fetch error".into()),
            side_a: Some(side(true)),
            side_b: Some(side(false)),
        };
        let text = render_outcome(&PollOutcome::Stale(board));

        assert!(text.starts_with("WARNING: upstream unavailable (fetch error)"));
        assert!(text.contains("Side A (stop 1752) [stale]"));
        assert!(text.contains("Side B (stop 1752)\n"));
    }

    #[test]
    fn not_loaded_outcome() {
        assert!(render_outcome(&PollOutcome::NotLoaded).contains("not loaded yet"));
    }

    #[test]
    fn missing_side_is_reported() {
        let board = BoardPayload {
            side_a: Some(side(false)),
            ..BoardPayload::default()
        };
        assert!(render_board(&board).contains("Side B: no data"));
    }

    #[test]
    fn delay_formatting() {
        assert_eq!(format_delay(0), "");
        assert_eq!(format_delay(30), "<1 min");
        assert_eq!(format_delay(60), "+1 min");
        assert_eq!(format_delay(3599), "+59 min");
    }

    #[test]
    fn unparsable_time_is_shown_raw() {
        assert_eq!(format_time(Some("soon")), "soon");
        assert_eq!(format_time(None), "-");
    }
}
