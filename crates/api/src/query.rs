//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Largest page a listing endpoint will return.
pub const MAX_PER_PAGE: i64 = 50;
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Page-based pagination (`?page=&per_page=`), 1-indexed.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    /// Clamped `(page, per_page)`.
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }

    /// `(limit, offset)` for the repository layer.
    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, per_page) = self.resolve();
        (per_page, (page - 1).saturating_mul(per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(PageParams::default().resolve(), (1, DEFAULT_PER_PAGE));

        let params = PageParams {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(params.resolve(), (1, MAX_PER_PAGE));

        let params = PageParams {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(params.limit_offset(), (10, 20));
    }
}
