//! Box-drawn tables for any `Row` type.

use solar_sync::table::EMPTY_MESSAGE;
use solar_sync::{Row, TableView};

const MAX_WIDTH: usize = 40;

pub struct TableFormatter {
    widths: Vec<usize>,
    with_marker: bool,
}

impl TableFormatter {
    /// Column widths fitted to the headers and the rows about to be printed
    pub fn new<R: Row>(rows: &[R]) -> Self {
        let mut widths: Vec<usize> = R::headers().iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, cell) in row.cells().iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count()).min(MAX_WIDTH);
                }
            }
        }
        let with_marker = rows.iter().any(|r| r.severity().is_some());
        Self { widths, with_marker }
    }

    pub fn render<R: Row>(&self, rows: &[R]) -> String {
        let mut out = Vec::with_capacity(rows.len() + 4);
        out.push(self.border('┌', '┬', '┐'));
        out.push(self.line(R::headers().iter().map(|h| h.to_string()).collect(), " "));
        out.push(self.border('├', '┼', '┤'));
        for row in rows {
            let marker = row.severity().map_or(" ", |s| s.marker());
            out.push(self.line(row.cells(), marker));
        }
        out.push(self.border('└', '┴', '┘'));
        out.join("\n")
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let mut parts: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        if self.with_marker {
            parts.insert(0, "─".repeat(3));
        }
        format!("{left}{}{right}", parts.join(&mid.to_string()))
    }

    fn line(&self, cells: Vec<String>, marker: &str) -> String {
        let mut parts: Vec<String> = self
            .widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {:<width$} ", truncate(cell, *width), width = width)
            })
            .collect();
        if self.with_marker {
            parts.insert(0, format!(" {marker} "));
        }
        format!("│{}│", parts.join("│"))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    }
}

/// Current page of `view` plus its footer, or the empty message
pub fn render_view<R: Row>(view: &TableView<R>) -> String {
    if view.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }
    let page = view.page();
    let table = TableFormatter::new(page).render(page);
    let mut footer = format!(
        "Page {} of {}  ({} of {} rows)",
        view.current_page(),
        view.total_pages(),
        view.matched(),
        view.canonical_len()
    );
    if !view.query().is_empty() {
        footer.push_str(&format!("  search: \"{}\"", view.query()));
    }
    format!("{table}\n{footer}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_sync::models::UserRecord;
    use solar_sync::rows::UserRow;
    use std::sync::Arc;

    fn user(id: &str) -> UserRow {
        UserRow::from(UserRecord {
            object_id: None,
            plant_id: Some("SP-1".into()),
            user_id: id.into(),
            email: Some(format!("{id}@sunfield.io")),
            phone: None,
        })
    }

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate("abcdef", 10), "abcdef");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn empty_view_shows_the_empty_message() {
        let view: TableView<UserRow> = TableView::new(15);
        assert_eq!(render_view(&view), EMPTY_MESSAGE);
    }

    #[test]
    fn footer_reports_page_and_matches() {
        let mut view = TableView::new(2);
        view.set_rows(Arc::new(vec![user("op-1"), user("op-2"), user("op-3")]));
        let out = render_view(&view);
        assert!(out.contains("op-1"));
        assert!(!out.contains("op-3"));
        assert!(out.ends_with("Page 1 of 2  (3 of 3 rows)"));
    }
}
