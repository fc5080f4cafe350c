//! Search, sort and pagination for list pages.
//!
//! The backend returns whole lists for reference data, so filtering and
//! ordering happen here, driven by `q`, `sort`, `dir` and `page` query
//! parameters.

use std::borrow::Borrow;
use std::cmp::Ordering;

use serde::Deserialize;

pub const DEFAULT_PER_PAGE: usize = 25;
const MAX_PER_PAGE: usize = 200;

/// Sort direction for table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

/// Trait for column enums. Each sortable table defines its own column enum
/// implementing this trait.
pub trait SortableColumn: Sized + Default + Copy + PartialEq {
    /// Parse column name from query string parameter.
    fn parse(s: &str) -> Option<Self>;

    /// Convert column to query string parameter value.
    fn as_str(&self) -> &'static str;
}

/// Rows that can appear in a searchable, sortable table.
pub trait Listable {
    type Column: SortableColumn;

    /// `needle` is already lower-cased and non-empty.
    fn matches(&self, needle: &str) -> bool;

    fn compare(&self, other: &Self, column: Self::Column) -> Ordering;
}

/// Case-insensitive substring match helper for [`Listable::matches`].
pub fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// One page of a filtered, sorted list plus what the template needs to
/// render search, sort links and pager.
#[derive(Debug, Clone)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub q: String,
    pub column: C,
    pub dir: SortDirection,
}

impl<T, C: SortableColumn> Page<T, C> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn prev_page(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> usize {
        (self.page + 1).min(self.total_pages.max(1))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Query string for another page with the same search, sort and page size.
    pub fn page_query(&self, page: impl Borrow<usize>) -> String {
        format!(
            "q={}&sort={}&dir={}&page={}&per_page={}",
            urlencoding::encode(&self.q),
            self.column.as_str(),
            self.dir.as_str(),
            page.borrow(),
            self.per_page
        )
    }

    /// Query string for a column header link; clicking the active column
    /// flips the direction.
    pub fn sort_query(&self, column: &str) -> String {
        let dir = if self.column.as_str() == column {
            self.dir.toggle()
        } else {
            SortDirection::Asc
        };
        format!(
            "q={}&sort={}&dir={}&per_page={}",
            urlencoding::encode(&self.q),
            column,
            dir.as_str(),
            self.per_page
        )
    }

    /// Arrow shown next to the active column header.
    pub fn sort_indicator(&self, column: &str) -> &'static str {
        if self.column.as_str() != column {
            return "";
        }
        match self.dir {
            SortDirection::Asc => "\u{25b2}",
            SortDirection::Desc => "\u{25bc}",
        }
    }
}

pub fn build_page<T: Listable>(mut items: Vec<T>, params: &ListParams) -> Page<T, T::Column> {
    let q = params.q.as_deref().unwrap_or("").trim().to_string();
    if !q.is_empty() {
        let needle = q.to_lowercase();
        items.retain(|item| item.matches(&needle));
    }

    let column = params
        .sort
        .as_deref()
        .and_then(T::Column::parse)
        .unwrap_or_default();
    let dir = params
        .dir
        .as_deref()
        .map(SortDirection::parse)
        .unwrap_or_default();
    items.sort_by(|a, b| dir.apply(a.compare(b, column)));

    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = params.page.unwrap_or(1).clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        total,
        page,
        per_page,
        total_pages,
        q,
        column,
        dir,
    }
}
