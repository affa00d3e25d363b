//! Sorting and pagination shared by every list endpoint.

use crate::foundation::{CosignError, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT, sort: SortField::default(), direction: SortDirection::default() }
    }
}

impl ListQuery {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, CosignError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page == 0 {
            return Err(CosignError::invalid_input("page", "must be >= 1"));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(CosignError::invalid_input("limit", format!("must be in [1, {}]", MAX_PAGE_LIMIT)));
        }
        Ok(Self { page, limit, ..Self::default() })
    }

    pub fn with_sort(mut self, sort: SortField, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// Slices out the requested page, keeping the order of `items`.
    pub fn from_items(items: Vec<T>, query: &ListQuery) -> Self {
        let total = items.len();
        let skip = (query.page as usize - 1).saturating_mul(query.limit as usize);
        let items = items.into_iter().skip(skip).take(query.limit as usize).collect();
        Page { items, total, page: query.page, limit: query.limit }
    }
}

/// Timestamps a record exposes for sorting.
pub trait Timestamped {
    fn created_at_nanos(&self) -> u64;
    fn updated_at_nanos(&self) -> u64;
}

impl Timestamped for crate::domain::MultiSigAccount {
    fn created_at_nanos(&self) -> u64 {
        self.created_at_nanos
    }
    fn updated_at_nanos(&self) -> u64 {
        self.updated_at_nanos
    }
}

impl Timestamped for crate::domain::Transaction {
    fn created_at_nanos(&self) -> u64 {
        self.created_at_nanos
    }
    fn updated_at_nanos(&self) -> u64 {
        self.updated_at_nanos
    }
}

/// Sorts by the requested timestamp (ties broken by insertion order) and slices out the page.
pub fn paginate<T: Timestamped>(mut items: Vec<T>, query: &ListQuery) -> Page<T> {
    let key = |item: &T| match query.sort {
        SortField::CreatedAt => item.created_at_nanos(),
        SortField::UpdatedAt => item.updated_at_nanos(),
    };
    match query.direction {
        SortDirection::Asc => items.sort_by_key(|item| key(item)),
        SortDirection::Desc => items.sort_by_key(|item| std::cmp::Reverse(key(item))),
    }
    Page::from_items(items, query)
}
