//! Page arithmetic and the page-jump cursor.

/// `max(1, ceil(len / page_size))`; a zero page size is treated as one
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Rows on 1-based `page`; empty when the page lies past the end
pub fn paginate<R>(rows: &[R], page_size: usize, page: usize) -> &[R] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// Answer to a page-jump submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageJump {
    Moved(usize),
    /// Input was empty or outside `[1, total_pages]`; the page did not change
    Rejected { total_pages: usize },
}

/// `{current_page, page_input}` with `1 <= current_page <= total_pages`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    current_page: usize,
    page_input: String,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { current_page: 1, page_input: String::new() }
    }
}

impl Cursor {
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_input(&self) -> &str {
        &self.page_input
    }

    /// Accepts the new input only if it is all ASCII digits (or empty)
    pub fn set_page_input(&mut self, input: &str) -> bool {
        if !input.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        self.page_input = input.to_string();
        true
    }

    pub fn submit(&mut self, total_pages: usize) -> PageJump {
        let requested = self.page_input.parse::<usize>().ok();
        self.page_input.clear();
        match requested {
            Some(page) if (1..=total_pages).contains(&page) => {
                self.current_page = page;
                PageJump::Moved(page)
            }
            _ => PageJump::Rejected { total_pages },
        }
    }

    pub fn next(&mut self, total_pages: usize) -> usize {
        if self.current_page < total_pages {
            self.current_page += 1;
        }
        self.current_page
    }

    pub fn prev(&mut self) -> usize {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
        self.current_page
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Pull the page back inside `[1, total_pages]` after the row set changed
    pub fn clamp(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}
