//! List query reducer shared by every module's list screen.
//!
//! A list screen owns one [`ListState`]. User intent (typing a search,
//! clicking a sort header, paging, filtering) is applied through the
//! reducer methods, each of which reports whether the query changed so the
//! caller knows to refetch. The server answers with a [`ListResult`], which
//! the reducer folds back in to learn the page count.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum number of rows per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamp a requested page size into `[1, MAX_PAGE_SIZE]`.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Wire representation used in the `sortOrder` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Parse a wire value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// The combined search/sort/filter/pagination parameters sent to a
/// collection endpoint.
///
/// Fields are private; mutate through [`ListState`] so the page-reset
/// rules always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    search: String,
    sort_by: Option<String>,
    sort_order: SortOrder,
    filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// A fresh query on page 1 with the given page size.
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: clamp_limit(limit),
            search: String::new(),
            sort_by: None,
            sort_order: SortOrder::Asc,
            filters: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Serialize into query-string pairs.
    ///
    /// Order: `page`, `limit`, `search` (only when non-empty), `sortBy` and
    /// `sortOrder` (only when a sort key is set), then filters by key.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search".to_string(), self.search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            params.push(("sortBy".to_string(), sort_by.clone()));
            params.push(("sortOrder".to_string(), self.sort_order.to_string()));
        }
        for (key, value) in &self.filters {
            params.push((key.clone(), value.clone()));
        }
        params
    }

    /// Stable identity of this query, used as a cache key.
    ///
    /// Two queries with equal parameters always produce equal signatures.
    pub fn signature(&self) -> String {
        self.to_params()
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Escape the separators used by [`ListQuery::signature`].
fn escape(raw: &str) -> String {
    raw.replace('%', "%25")
        .replace('&', "%26")
        .replace('=', "%3D")
}

// ---------------------------------------------------------------------------
// ListResult
// ---------------------------------------------------------------------------

/// One page of a collection as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    #[serde(alias = "data")]
    pub items: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    /// `None` when the server did not say.
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default, alias = "total")]
    pub total_count: Option<u64>,
}

fn first_page() -> u32 {
    1
}

impl<T> ListResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: Some(0),
            total_count: Some(0),
        }
    }

    /// Number of pages at `limit` rows per page.
    ///
    /// Uses `totalPages` when present, otherwise derives it from the total
    /// count. `None` when the response carried neither.
    pub fn page_count(&self, limit: u32) -> Option<u32> {
        self.total_pages.or_else(|| {
            self.total_count.map(|count| {
                u32::try_from(count.div_ceil(u64::from(limit.max(1)))).unwrap_or(u32::MAX)
            })
        })
    }
}

// ---------------------------------------------------------------------------
// ListState (reducer)
// ---------------------------------------------------------------------------

/// Per-screen list state: the current query plus what the last response
/// told us about the collection size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    query: ListQuery,
    total_pages: Option<u32>,
    total_count: Option<u64>,
}

impl ListState {
    pub fn new(limit: u32) -> Self {
        Self {
            query: ListQuery::new(limit),
            total_pages: None,
            total_count: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Page count from the most recent result, if one has been applied.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Update the search text and return to page 1.
    pub fn set_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        let changed = self.query.search != text || self.query.page != 1;
        self.query.search = text.to_string();
        self.query.page = 1;
        changed
    }

    /// Sort by `column`.
    ///
    /// Clicking the active column flips the direction; clicking a new
    /// column sorts ascending. Always returns to page 1.
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        if self.query.sort_by.as_deref() == Some(column) {
            self.query.sort_order = self.query.sort_order.flipped();
        } else {
            self.query.sort_by = Some(column.to_string());
            self.query.sort_order = SortOrder::Asc;
        }
        self.query.page = 1;
        true
    }

    /// Move to page `n`.
    ///
    /// Accepted only when `n >= 1` and, once the page count is known,
    /// `n <= total_pages`. Anything else is a no-op returning `false`.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 {
            return false;
        }
        if let Some(total) = self.total_pages {
            if n > total {
                return false;
            }
        }
        let changed = self.query.page != n;
        self.query.page = n;
        changed
    }

    /// Change the page size and return to page 1.
    pub fn set_limit(&mut self, n: u32) -> bool {
        let limit = clamp_limit(n);
        let changed = self.query.limit != limit || self.query.page != 1;
        self.query.limit = limit;
        self.query.page = 1;
        changed
    }

    /// Set (or, with an empty value, clear) one filter and return to page 1.
    pub fn set_filter(&mut self, key: &str, value: &str) -> bool {
        let before = self.query.filters.get(key).cloned();
        if value.is_empty() {
            self.query.filters.remove(key);
        } else {
            self.query
                .filters
                .insert(key.to_string(), value.to_string());
        }
        let changed = before.as_deref() != self.query.filter(key) || self.query.page != 1;
        self.query.page = 1;
        changed
    }

    /// Clear every filter and the search text, returning to page 1.
    ///
    /// Sort and page size are kept.
    pub fn reset_filters(&mut self) -> bool {
        let changed =
            !self.query.filters.is_empty() || !self.query.search.is_empty() || self.query.page != 1;
        self.query.filters.clear();
        self.query.search.clear();
        self.query.page = 1;
        changed
    }

    /// Fold a server response back in.
    ///
    /// Records the page count and clamps the current page into
    /// `[1, max(total_pages, 1)]`. Returns `true` when the page moved, in
    /// which case the caller should refetch. A response without any totals
    /// leaves the page count unknown and the page untouched.
    pub fn apply_result<T>(&mut self, result: &ListResult<T>) -> bool {
        self.total_pages = result.page_count(self.query.limit);
        self.total_count = result.total_count;
        let Some(total_pages) = self.total_pages else {
            return false;
        };
        let clamped = self.query.page.clamp(1, total_pages.max(1));
        let moved = clamped != self.query.page;
        self.query.page = clamped;
        moved
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
