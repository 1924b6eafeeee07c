//! Case-insensitive substring search over a row's designated fields.

use crate::rows::Row;

pub fn matches<R: Row>(row: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    row.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Always derived from the canonical set, never from a previous result
pub fn filter_rows<R: Row>(canonical: &[R], query: &str) -> Vec<R> {
    canonical.iter().filter(|row| matches(*row, query)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named {
        id: String,
        name: String,
    }

    impl Row for Named {
        fn headers() -> &'static [&'static str] {
            &["Id", "Name"]
        }
        fn id(&self) -> &str {
            &self.id
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.id, &self.name]
        }
        fn cells(&self) -> Vec<String> {
            vec![self.id.clone(), self.name.clone()]
        }
    }

    fn sample() -> Vec<Named> {
        vec![
            Named { id: "A1".into(), name: "Alpha".into() },
            Named { id: "B2".into(), name: "Beta".into() },
        ]
    }

    #[test]
    fn query_matches_any_designated_field() {
        let rows = sample();
        assert_eq!(filter_rows(&rows, "a").len(), 2);
        let only = filter_rows(&rows, "A1");
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "A1");
    }

    #[test]
    fn narrowing_then_widening_restores_rows() {
        let rows = sample();
        assert_eq!(filter_rows(&rows, "beta").len(), 1);
        assert_eq!(filter_rows(&rows, "a").len(), 2);
        assert_eq!(filter_rows(&rows, "  ").len(), 2);
    }
}
