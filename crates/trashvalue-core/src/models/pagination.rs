use serde::{Deserialize, Serialize};

/// Paging metadata. The backend names the total differently per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(
        default,
        alias = "totalDropoffs",
        alias = "totalTransactions",
        alias = "totalWasteTypes",
        alias = "totalWasteBanks",
        alias = "totalItems"
    )]
    pub total: Option<u64>,
    #[serde(rename = "hasNextPage", default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    #[serde(rename = "hasPrevPage", default, skip_serializing_if = "Option::is_none")]
    pub has_prev_page: Option<bool>,
}

impl PageMeta {
    pub fn has_next(&self) -> bool {
        self.has_next_page
            .unwrap_or(self.current_page < self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.has_prev_page.unwrap_or(self.current_page > 1)
    }
}

/// A page of results: `{ status, message, data: [...], metadata }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: Vec<T>,
    pub metadata: PageMeta,
}

/// Paging state for a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub limit: u32,
}

impl Pager {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Advance to the next page if `meta` says there is one.
    pub fn next(&mut self, meta: &PageMeta) -> bool {
        if self.page < meta.total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page, stopping at the first.
    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(current_page: u32, total_pages: u32) -> PageMeta {
        PageMeta {
            current_page,
            total_pages,
            total: None,
            has_next_page: None,
            has_prev_page: None,
        }
    }

    #[test]
    fn test_total_aliases() {
        let json = r#"{"currentPage":1,"totalPages":3,"totalDropoffs":25}"#;
        let parsed: PageMeta = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total, Some(25));

        let json = r#"{"currentPage":2,"totalPages":4,"totalWasteBanks":18,"hasNextPage":true,"hasPrevPage":true}"#;
        let parsed: PageMeta = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total, Some(18));
        assert!(parsed.has_next());
        assert!(parsed.has_prev());
    }

    #[test]
    fn test_has_next_fallback() {
        assert!(meta(1, 2).has_next());
        assert!(!meta(2, 2).has_next());
        assert!(!meta(1, 0).has_next());
        assert!(!meta(1, 2).has_prev());
    }

    #[test]
    fn test_pager_bounds() {
        let mut pager = Pager::new(10);
        assert!(!pager.prev());
        assert_eq!(pager.page, 1);

        let meta = meta(1, 2);
        assert!(pager.next(&meta));
        assert_eq!(pager.page, 2);
        assert!(!pager.next(&meta));
        assert_eq!(pager.page, 2);

        assert!(pager.prev());
        assert_eq!(pager.page, 1);

        pager.next(&meta);
        pager.reset();
        assert_eq!(pager.page, 1);
    }

    #[test]
    fn test_pager_min_limit() {
        assert_eq!(Pager::new(0).limit, 1);
    }

    #[test]
    fn test_parse_paginated() {
        let json = r#"{"status":"success","message":"ok","data":[1,2,3],"metadata":{"currentPage":1,"totalPages":1,"totalItems":3}}"#;
        let page: Paginated<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data, vec![1, 2, 3]);
        assert_eq!(page.metadata.total, Some(3));
    }
}
