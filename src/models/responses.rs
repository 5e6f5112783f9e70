use serde::{Deserialize, Serialize};

// API Response wrappers - every endpoint answers with `{ "data": ... }`
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Paged list endpoints add a `meta` block.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.data.is_empty() || self.meta.page * self.meta.limit >= self.meta.total
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct PageMeta {
    pub total: u32,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct NavData {
    pub nav: crate::models::ShipNav,
}
