//! Pagination and sort primitives shared by the store and the HTTP API.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of records per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// A sanitized page request. `limit` and `page` are both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub page: i64,
}

impl Page {
    /// Build a page, clamping both values to at least 1.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit: limit.max(1),
            page: page.max(1),
        }
    }

    /// Number of records to skip: `(page - 1) * limit`, saturating so
    /// absurd client-supplied values cannot overflow.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 1,
        }
    }
}

/// Sort direction. Parses case-insensitively from "asc"/"desc".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// Allow-listed sort fields for note listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteSortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "title")]
    Title,
}

impl NoteSortField {
    /// Database column backing this sort field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Title => "title",
        }
    }
}

impl FromStr for NoteSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(5, 1).offset(), 0);
        assert_eq!(Page::new(5, 2).offset(), 5);
        assert_eq!(Page::new(10, 3).offset(), 20);
    }

    #[test]
    fn test_page_clamps_to_one() {
        let page = Page::new(0, -3);
        assert_eq!(page.limit, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_offset_saturates_on_huge_values() {
        let page = Page::new(i64::MAX, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);
        assert!(Page::new(2, i64::MAX).offset() >= 0);
    }

    #[test]
    fn test_page_default() {
        let page = Page::default();
        assert_eq!(page.limit, 10);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_sort_direction_case_insensitive() {
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("Desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("ascending".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_note_sort_field_allow_list() {
        assert_eq!("createdAt".parse::<NoteSortField>(), Ok(NoteSortField::CreatedAt));
        assert_eq!("title".parse::<NoteSortField>(), Ok(NoteSortField::Title));
        // Exact-match only: no arbitrary columns reach the SQL layer.
        assert!("owner".parse::<NoteSortField>().is_err());
        assert!("CreatedAt".parse::<NoteSortField>().is_err());
    }

    #[test]
    fn test_note_sort_field_columns() {
        assert_eq!(NoteSortField::CreatedAt.column(), "created_at");
        assert_eq!(NoteSortField::Title.column(), "title");
    }
}
