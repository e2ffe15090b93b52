//! Record previews
//!
//! The table views show a bounded prefix of the store by default and tell
//! the caller whether more rows exist, so a "show all" link can be offered.

use serde::Serialize;

/// Leading rows of a larger result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview<T> {
    pub rows: Vec<T>,
    /// Rows available in total
    pub total: usize,
    /// Requested row limit; `None` means everything was requested
    pub limit: Option<usize>,
    /// True when `total` exceeds the rows returned
    pub has_more: bool,
}

impl<T> Preview<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// First `limit` of `rows`, or all of them when `limit` is `None`
///
/// A limit of zero is treated as one so a preview never hides that data
/// exists.
pub fn preview<T>(mut rows: Vec<T>, limit: Option<usize>) -> Preview<T> {
    let total = rows.len();
    let limit = limit.map(|l| l.max(1));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    Preview {
        has_more: total > rows.len(),
        rows,
        total,
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_and_flags_more() {
        let p = preview((0..50).collect::<Vec<_>>(), Some(20));
        assert_eq!(p.len(), 20);
        assert_eq!(p.rows[19], 19);
        assert_eq!(p.total, 50);
        assert!(p.has_more);
    }

    #[test]
    fn test_preview_exact_fit_has_no_more() {
        let p = preview(vec![1, 2, 3], Some(3));
        assert_eq!(p.len(), 3);
        assert!(!p.has_more);
    }

    #[test]
    fn test_preview_all() {
        let p = preview((0..500).collect::<Vec<_>>(), None);
        assert_eq!(p.len(), 500);
        assert_eq!(p.limit, None);
        assert!(!p.has_more);
    }

    #[test]
    fn test_preview_zero_limit_clamped() {
        let p = preview(vec!["a", "b"], Some(0));
        assert_eq!(p.rows, vec!["a"]);
        assert_eq!(p.limit, Some(1));
        assert!(p.has_more);
    }

    #[test]
    fn test_preview_empty() {
        let p = preview(Vec::<u8>::new(), Some(20));
        assert!(p.is_empty());
        assert_eq!(p.total, 0);
        assert!(!p.has_more);
    }
}
