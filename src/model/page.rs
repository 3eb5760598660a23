//! Collection envelopes.

use serde::{Deserialize, Serialize};

/// A list response. Some endpoints return a bare array, others wrap it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Data { data: Vec<T> },
}

impl<T> ListBody<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) | ListBody::Items { items } | ListBody::Data { data: items } => items,
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "rows", alias = "data")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn page_count(&self) -> u32 {
        if self.page_size == 0 {
            return if self.items.is_empty() { 0 } else { 1 };
        }
        self.total.div_ceil(self.page_size as u64) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_shapes() {
        let bare: ListBody<i32> = serde_json::from_value(json!([1, 2])).unwrap();
        let wrapped: ListBody<i32> = serde_json::from_value(json!({"items": [3]})).unwrap();
        let data: ListBody<i32> = serde_json::from_value(json!({"data": [4], "total": 1})).unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(wrapped.into_vec(), vec![3]);
        assert_eq!(data.into_vec(), vec![4]);
    }

    #[test]
    fn test_page_math() {
        let page: Page<i32> =
            serde_json::from_value(json!({"rows": [1, 2], "total": 45, "page": 2, "page_size": 20})).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.page_count(), 3);
        assert!(page.has_next());
    }
}
