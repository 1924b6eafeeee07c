//! Render/Paginate layer: a screen's table state over the latest rows.

pub mod filter;
pub mod paginate;

pub use filter::{filter_rows, matches};
pub use paginate::{paginate, total_pages, Cursor, PageJump};

use crate::rows::Row;
use std::sync::Arc;

pub const EMPTY_MESSAGE: &str = "No results found";

/// Canonical rows, search query, cursor and selection of one table
pub struct TableView<R: Row> {
    canonical: Arc<Vec<R>>,
    filtered: Vec<R>,
    query: String,
    page_size: usize,
    cursor: Cursor,
    selected: Option<R>,
}

impl<R: Row> TableView<R> {
    pub fn new(page_size: usize) -> Self {
        Self {
            canonical: Arc::new(Vec::new()),
            filtered: Vec::new(),
            query: String::new(),
            page_size: page_size.max(1),
            cursor: Cursor::default(),
            selected: None,
        }
    }

    /// Replace the canonical rows (one per successful tick)
    pub fn set_rows(&mut self, rows: Arc<Vec<R>>) {
        self.canonical = rows;
        self.filtered = filter_rows(&self.canonical, &self.query);
        self.cursor.clamp(self.total_pages());
    }

    /// New search text; the page goes back to 1
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.filtered = filter_rows(&self.canonical, &self.query);
        self.cursor.reset();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.cursor.current_page()
    }

    pub fn page(&self) -> &[R] {
        paginate(&self.filtered, self.page_size, self.cursor.current_page())
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn matched(&self) -> usize {
        self.filtered.len()
    }

    pub fn canonical_len(&self) -> usize {
        self.canonical.len()
    }

    pub fn next_page(&mut self) -> usize {
        let total = self.total_pages();
        self.cursor.next(total)
    }

    pub fn prev_page(&mut self) -> usize {
        self.cursor.prev()
    }

    pub fn set_page_input(&mut self, input: &str) -> bool {
        self.cursor.set_page_input(input)
    }

    pub fn page_input(&self) -> &str {
        self.cursor.page_input()
    }

    pub fn submit_page(&mut self) -> PageJump {
        let total = self.total_pages();
        self.cursor.submit(total)
    }

    /// Select the row with `id` from the visible (filtered) set
    pub fn select(&mut self, id: &str) -> Option<&R> {
        self.selected = self.filtered.iter().find(|row| row.id() == id).cloned();
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use crate::rows::UserRow;

    fn users(n: usize) -> Arc<Vec<UserRow>> {
        Arc::new(
            (1..=n)
                .map(|i| {
                    UserRow::from(UserRecord {
                        object_id: None,
                        plant_id: Some("SP-1".into()),
                        user_id: format!("SP-1-U{i:02}"),
                        email: Some(format!("user{i}@plant.io")),
                        phone: None,
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn empty_table_still_has_one_page() {
        let view: TableView<UserRow> = TableView::new(15);
        assert!(view.is_empty());
        assert_eq!(view.total_pages(), 1);
        assert!(view.page().is_empty());
    }

    #[test]
    fn shrinking_rows_reclamps_the_page() {
        let mut view = TableView::new(5);
        view.set_rows(users(23));
        assert!(view.set_page_input("5"));
        assert_eq!(view.submit_page(), PageJump::Moved(5));
        assert_eq!(view.page().len(), 3);

        view.set_rows(users(7));
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.page().len(), 2);
    }

    #[test]
    fn search_resets_page_and_uses_canonical_rows() {
        let mut view = TableView::new(5);
        view.set_rows(users(12));
        view.next_page();
        view.set_query("U1");
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.matched(), 3);

        view.set_query("u");
        assert_eq!(view.matched(), 12);
    }

    #[test]
    fn out_of_range_jump_is_rejected() {
        let mut view = TableView::new(15);
        view.set_rows(users(20));
        view.set_page_input("9");
        assert_eq!(view.submit_page(), PageJump::Rejected { total_pages: 2 });
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn selection_comes_from_visible_rows() {
        let mut view = TableView::new(15);
        view.set_rows(users(3));
        assert_eq!(view.select("SP-1-U02").map(|r| r.email.as_str()), Some("user2@plant.io"));
        view.set_query("U03");
        assert!(view.select("SP-1-U02").is_none());
        view.clear_selection();
        assert!(view.selected().is_none());
    }
}
