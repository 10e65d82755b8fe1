use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(AppError::BadRequest(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if (page - 1).checked_mul(size).is_none() {
            return Err(AppError::BadRequest("page is out of range".to_string()));
        }
        Ok(Self { page, size })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            meta: PageMeta {
                total,
                page: request.page,
                size: request.size,
            },
        }
    }
}

/// Treats a blank `keyword=` query parameter as absent. `%`, `_` and `\`
/// are escaped, so clauses using the pattern need `ESCAPE '\'`.
pub fn keyword_pattern(keyword: Option<&str>) -> Option<String> {
    let keyword = keyword.map(str::trim).filter(|k| !k.is_empty())?;
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_offset() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!(req, PageRequest { page: 1, size: 10 });
        assert_eq!(req.offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(25)).unwrap().offset(), 50);
    }

    #[test]
    fn test_page_bounds() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(MAX_PAGE_SIZE + 1)).is_err());
        assert!(PageRequest::new(None, Some(MAX_PAGE_SIZE)).is_ok());
    }

    #[test]
    fn test_page_offset_overflow_rejected() {
        assert!(matches!(
            PageRequest::new(Some(i64::MAX), Some(MAX_PAGE_SIZE)),
            Err(AppError::BadRequest(_))
        ));
        let last = i64::MAX / MAX_PAGE_SIZE + 1;
        let req = PageRequest::new(Some(last), Some(MAX_PAGE_SIZE)).unwrap();
        assert_eq!(req.offset(), (last - 1) * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        assert_eq!(keyword_pattern(Some("  ")), None);
        assert_eq!(keyword_pattern(None), None);
        assert_eq!(keyword_pattern(Some("090")), Some("%090%".to_string()));
    }

    #[test]
    fn test_keyword_wildcards_are_escaped() {
        assert_eq!(keyword_pattern(Some("_")), Some("%\\_%".to_string()));
        assert_eq!(keyword_pattern(Some("50%")), Some("%50\\%%".to_string()));
        assert_eq!(keyword_pattern(Some("a\\b")), Some("%a\\\\b%".to_string()));
    }
}
