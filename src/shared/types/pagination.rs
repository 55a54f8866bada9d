use serde::Serialize;

/// Pagination query parameters
#[derive(Debug, Clone, Copy)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PaginationParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let total_pages = total.div_ceil(params.limit);
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            total_pages,
        }
    }
}
