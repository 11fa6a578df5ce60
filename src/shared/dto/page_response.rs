use serde::{Deserialize, Serialize};

use crate::page::Page;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: usize,
    pub size: usize,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            total_pages: page.total_pages(),
            first: page.is_first(),
            last: page.is_last(),
            number_of_elements: page.items.len(),
            total_elements: page.total_elements,
            page: page.page,
            size: page.size,
            content: page.items,
        }
    }
}
