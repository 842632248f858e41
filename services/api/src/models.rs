//! API models for request and response payloads

use serde::Serialize;

pub mod booking;
pub mod location;
pub mod user;

pub use booking::*;
pub use location::*;
pub use user::*;

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };

        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}
