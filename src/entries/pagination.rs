use serde::Serialize;

use super::WordEntry;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Builds a page request from raw query values. Missing, non-numeric or
    /// non-positive values fall back to the defaults. `max_limit` clamps the
    /// page size when configured.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, max_limit: Option<i64>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let mut limit = parse_positive(limit).unwrap_or(DEFAULT_LIMIT);
        if let Some(max) = max_limit.filter(|max| *max >= 1) {
            limit = limit.min(max);
        }
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
    pub entries: Vec<WordEntry>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_entries: i64,
}

impl EntryPage {
    pub fn new(entries: Vec<WordEntry>, request: PageRequest, total_entries: i64) -> Self {
        Self {
            entries,
            current_page: request.page,
            total_pages: total_pages(total_entries, request.limit),
            total_entries,
        }
    }
}

/// `ceil(total / limit)`, written to stay in range for any positive limit.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total - 1) / limit + 1
}
