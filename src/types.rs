/// Shared types used across the codebase
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config;

/// Pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        let api = &config::config().api;
        self.per_page
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size)
    }

    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.page() - 1) as i64) * self.limit()
    }
}

/// Standard pagination envelope for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            per_page: query.per_page(),
        }
    }
}
