use serde::{Deserialize, Serialize};

use crate::entities::laptops;

/// Listing representation of a catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Laptop {
    pub id: i32,

    pub original_id: String,

    pub name: String,

    pub price: Option<f64>,

    pub shop: Option<String>,

    pub brand: Option<String>,

    pub ram: Option<String>,

    pub cpu: Option<String>,

    pub sales: Option<i64>,

    pub rating: Option<f64>,
}

impl From<laptops::Model> for Laptop {
    fn from(model: laptops::Model) -> Self {
        Self {
            id: model.id,
            original_id: model.original_id,
            name: model.name,
            price: model.price,
            shop: model.shop,
            brand: model.brand,
            ram: model.ram,
            cpu: model.cpu,
            sales: model.sales,
            rating: model.rating,
        }
    }
}

/// A cleaned catalog row ready to be written, keyed by `original_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct LaptopRecord {
    pub original_id: String,
    pub name: String,
    pub price: Option<f64>,
    pub shop: Option<String>,
    pub brand: Option<String>,
    pub ram: Option<String>,
    pub cpu: Option<String>,
    pub sales: Option<i64>,
    pub rating: Option<f64>,
    pub ram_gb: Option<i32>,
}

/// Filters accepted by the listing endpoint. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaptopFilter {
    pub brand: Option<String>,
    pub cpu: Option<String>,
    pub ram: Option<String>,
    pub ram_gb_min: Option<i32>,
    pub ram_gb_max: Option<i32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl LaptopFilter {
    #[must_use]
    pub fn by_brand(brand: Option<&str>) -> Self {
        Self {
            brand: brand.map(str::to_string),
            ..Self::default()
        }
    }
}

/// A page request; only applied when both values are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl Page {
    /// `(offset, limit)` when both values are positive and the offset fits a SQL integer.
    #[must_use]
    pub fn window(&self) -> Option<(u64, u64)> {
        let (page, size) = self.requested()?;
        let offset = (page - 1)
            .checked_mul(size)
            .filter(|offset| i64::try_from(*offset).is_ok())?;
        Some((offset, size))
    }

    /// A page was asked for but its offset cannot be represented.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.requested().is_some() && self.window().is_none()
    }

    fn requested(&self) -> Option<(u64, u64)> {
        match (self.page, self.page_size) {
            (Some(page), Some(size)) if page > 0 && size > 0 => Some((page, size)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        let page = Page {
            page: Some(3),
            page_size: Some(20),
        };
        assert_eq!(page.window(), Some((40, 20)));

        assert_eq!(Page::default().window(), None);
        assert_eq!(
            Page {
                page: Some(0),
                page_size: Some(20)
            }
            .window(),
            None
        );
    }

    #[test]
    fn test_page_window_overflow() {
        let page = Page {
            page: Some(u64::MAX),
            page_size: Some(2),
        };
        assert_eq!(page.window(), None);
        assert!(page.is_out_of_range());

        let page = Page {
            page: Some(2),
            page_size: Some(u64::MAX),
        };
        assert_eq!(page.window(), None);
        assert!(page.is_out_of_range());

        assert!(!Page::default().is_out_of_range());
    }
}
