// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 200;

/// Parâmetros de paginação por página (`?page=2&perPage=50`).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Retorna (page, per_page, offset) já saneados.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        // Páginas absurdas não podem estourar o OFFSET
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = (total + per_page - 1) / per_page;
        Self { items, total, page, per_page, total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let q = PageQuery::default();
        assert_eq!(q.normalize(), (1, DEFAULT_PER_PAGE, 0));

        let q = PageQuery { page: Some(0), per_page: Some(10_000) };
        assert_eq!(q.normalize(), (1, MAX_PER_PAGE, 0));

        let q = PageQuery { page: Some(3), per_page: Some(20) };
        assert_eq!(q.normalize(), (3, 20, 40));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let q = PageQuery { page: Some(i64::MAX), per_page: Some(MAX_PER_PAGE) };
        let (page, per_page, offset) = q.normalize();
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, MAX_PER_PAGE);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }
}
