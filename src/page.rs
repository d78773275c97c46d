use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination inputs after lenient parsing. `page` keeps whatever integer the
/// caller sent, including zero and negatives; `page_size` is always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub page_size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Builds params from raw query strings. Unparseable values fall back to
    /// the defaults instead of failing the request, and a zero or negative
    /// pageSize falls back as well.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }
}

/// One page of an already-filtered collection. `total` and `total_pages`
/// always describe the whole collection, not the returned slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: i64,
    pub page_size: u32,
    pub total_pages: u64,
}

/// Slices `collection` into the requested window. Out-of-range pages yield an
/// empty `items` with the counting fields intact, and the requested page is
/// echoed back verbatim. Input order is preserved; nothing is re-sorted.
pub fn paginate<T>(collection: Vec<T>, params: &PageParams) -> Page<T> {
    let per_page = u64::from(params.page_size.max(1));
    let total = collection.len() as u64;
    let total_pages = (total + per_page - 1) / per_page;

    let items = if params.page < 1 {
        Vec::new()
    } else {
        let start = (params.page as u64 - 1).saturating_mul(per_page);
        collection
            .into_iter()
            .skip(start.min(total) as usize)
            .take(per_page as usize)
            .collect()
    };

    Page {
        items,
        total,
        page: params.page,
        page_size: params.page_size,
        total_pages,
    }
}
