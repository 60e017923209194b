//! # Repository Module
//!
//! Shop-scoped repositories over the pricing tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AdminService / StorefrontService                                      │
//! │       │                                                                 │
//! │       │  db.models(shop).replace_tiers(id, tiers)                      │
//! │       ▼                                                                 │
//! │  PricingModelRepository      AssociationRepository                     │
//! │  ├── insert / get / list     ├── model_for_product                     │
//! │  ├── update / set_active     ├── assign                                │
//! │  ├── replace_tiers (atomic)  └── unassign                              │
//! │  ├── delete / duplicate                                                │
//! │                              PricingCacheRepository                    │
//! │                              ├── get / put                             │
//! │                              └── invalidate_* / purge_expired          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (every query filtered by shop_id)                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod association;
pub mod cache;
pub mod model;

use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;

// =============================================================================
// Listing Types
// =============================================================================

/// Status filter for the admin listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    /// The `active` column value to match, if any.
    pub(crate) fn as_flag(&self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some(true),
            StatusFilter::Inactive => Some(false),
        }
    }
}

/// Admin listing query: name search, status, 1-based pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelFilter {
    pub query: Option<String>,
    pub status: StatusFilter,
    pub page: u32,
    pub limit: u32,
}

impl Default for ModelFilter {
    fn default() -> Self {
        ModelFilter {
            query: None,
            status: StatusFilter::All,
            page: 1,
            limit: 10,
        }
    }
}

impl ModelFilter {
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Page number clamped to ≥ 1.
    pub(crate) fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// Limit clamped to 1..=100.
    pub(crate) fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.effective_page() - 1) * i64::from(self.effective_limit())
    }

    /// Trimmed, lowercased search text; blank means no search.
    pub(crate) fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// One page of results. `total` counts the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (self.total + limit - 1) / limit
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }

    /// Transforms the items, keeping the paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clamps() {
        let filter = ModelFilter::default().page(0, 500);
        assert_eq!(filter.effective_page(), 1);
        assert_eq!(filter.effective_limit(), 100);
        assert_eq!(filter.offset(), 0);

        let filter = ModelFilter::default().page(3, 10);
        assert_eq!(filter.offset(), 20);
    }

    #[test]
    fn test_normalized_query() {
        assert_eq!(ModelFilter::default().search("  ").normalized_query(), None);
        assert_eq!(
            ModelFilter::default().search(" Bulk ").normalized_query(),
            Some("bulk".to_string())
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_page_math() {
        let page = Page { items: vec![1, 2], page: 1, limit: 2, total: 5 };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total, 5);
    }
}
