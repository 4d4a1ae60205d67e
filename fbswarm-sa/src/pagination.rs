//! Limit/offset paging and sort direction for list endpoints

/// Page size when the caller gives no `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest `limit` a list endpoint accepts
pub const MAX_PAGE_SIZE: i64 = 200;

/// Sanitized LIMIT/OFFSET pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Every row; SQLite reads a negative LIMIT as no limit
    pub fn unbounded() -> Self {
        Self {
            limit: -1,
            offset: 0,
        }
    }
}

/// Calculate paging from optional query parameters
///
/// A limit above [`MAX_PAGE_SIZE`] is capped; a non-positive limit falls back
/// to [`DEFAULT_PAGE_SIZE`]. Negative offsets are treated as zero.
///
/// # Examples
/// ```
/// use fbswarm_sa::pagination::calculate_page;
///
/// let p = calculate_page(Some(500), Some(20));
/// assert_eq!(p.limit, 200);
/// assert_eq!(p.offset, 20);
///
/// let p = calculate_page(None, Some(-3));
/// assert_eq!(p.limit, 50);
/// assert_eq!(p.offset, 0);
/// ```
pub fn calculate_page(limit: Option<i64>, offset: Option<i64>) -> Page {
    let limit = match limit {
        Some(l) if l > 0 => l.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };
    let offset = offset.unwrap_or(0).max(0);

    Page { limit, offset }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Case-insensitive parse of `asc`/`desc`
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}
