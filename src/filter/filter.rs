use super::error::FilterError;
use super::types::{FilterOrderInfo, SortColumn, SortDirection};
use crate::validator::{permitted_value, Validator};

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_SORT: &str = "id";

/// Sort keys accepted when listing services. A leading `-` sorts descending.
pub const SERVICE_SORT_SAFELIST: &[&str] = &["id", "title", "-id", "-title"];

/// Requested page, page size and sort key, plus the allow-list the sort key
/// is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            sort_safelist: SERVICE_SORT_SAFELIST,
        }
    }
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            ..Default::default()
        }
    }

    pub fn with_safelist(mut self, safelist: &'static [&'static str]) -> Self {
        self.sort_safelist = safelist;
        self
    }

    /// Column named by the sort key, without the direction prefix.
    ///
    /// Fails unless the key is present verbatim in the safelist.
    pub fn sort_column(&self) -> Result<SortColumn, FilterError> {
        if !permitted_value(self.sort.as_str(), self.sort_safelist) {
            return Err(FilterError::UnsafeSort(self.sort.clone()));
        }
        self.sort.trim_start_matches('-').parse()
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn order(&self) -> Result<FilterOrderInfo, FilterError> {
        Ok(FilterOrderInfo {
            column: self.sort_column()?,
            sort: self.sort_direction(),
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip before the requested page.
    pub fn offset(&self) -> Result<i64, FilterError> {
        self.page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(self.page_size))
            .ok_or(FilterError::OutOfRange {
                field: "page",
                value: self.page,
            })
    }

    /// Fails when page or page_size falls outside the range `validate_filters`
    /// accepts.
    pub fn check_bounds(&self) -> Result<(), FilterError> {
        if !(1..=MAX_PAGE).contains(&self.page) {
            return Err(FilterError::OutOfRange {
                field: "page",
                value: self.page,
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(FilterError::OutOfRange {
                field: "page_size",
                value: self.page_size,
            });
        }
        Ok(())
    }
}

pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(filters.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(filters.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
    v.check(
        permitted_value(filters.sort.as_str(), filters.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(filters: &Filters) -> std::collections::HashMap<String, String> {
        let mut v = Validator::new();
        validate_filters(&mut v, filters);
        v.into_errors()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(errors_for(&Filters::default()).is_empty());
    }

    #[test]
    fn descending_key_strips_prefix() {
        let f = Filters::new(1, 20, "-title");
        assert_eq!(f.sort_column().unwrap(), SortColumn::Title);
        assert_eq!(f.sort_direction(), SortDirection::Desc);

        let f = Filters::new(1, 20, "id");
        assert_eq!(f.sort_column().unwrap(), SortColumn::Id);
        assert_eq!(f.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn sort_key_outside_safelist_is_rejected() {
        let f = Filters::new(1, 20, "created_at");
        assert_eq!(
            f.sort_column(),
            Err(FilterError::UnsafeSort("created_at".to_string()))
        );
        assert_eq!(errors_for(&f)["sort"], "invalid sort value");

        let f = Filters::new(1, 20, "id; DROP TABLE services");
        assert!(f.sort_column().is_err());
    }

    #[test]
    fn safelist_governs_direction_prefixes() {
        static ASC_ONLY: &[&str] = &["id", "title"];
        let f = Filters::new(1, 20, "-id").with_safelist(ASC_ONLY);
        assert!(f.sort_column().is_err());
        assert_eq!(errors_for(&f)["sort"], "invalid sort value");
    }

    #[test]
    fn limit_and_offset() {
        let f = Filters::new(3, 25, "id");
        assert_eq!(f.limit(), 25);
        assert_eq!(f.offset(), Ok(50));
        assert_eq!(Filters::new(1, 100, "id").offset(), Ok(0));
    }

    #[test]
    fn offset_overflow_is_an_error() {
        let f = Filters::new(i64::MAX, 100, "id");
        assert_eq!(
            f.offset(),
            Err(FilterError::OutOfRange { field: "page", value: i64::MAX })
        );
        assert!(Filters::new(i64::MIN, 20, "id").offset().is_err());
    }

    #[test]
    fn bounds_match_validation_rules() {
        assert_eq!(Filters::default().check_bounds(), Ok(()));
        assert_eq!(Filters::new(MAX_PAGE, MAX_PAGE_SIZE, "id").check_bounds(), Ok(()));

        let err = Filters::new(0, 20, "id").check_bounds().unwrap_err();
        assert_eq!(err.field(), "page");
        let err = Filters::new(MAX_PAGE + 1, 20, "id").check_bounds().unwrap_err();
        assert_eq!(err.field(), "page");
        let err = Filters::new(1, 0, "id").check_bounds().unwrap_err();
        assert_eq!(err.field(), "page_size");
        let err = Filters::new(1, MAX_PAGE_SIZE + 1, "id").check_bounds().unwrap_err();
        assert_eq!(err.field(), "page_size");
    }

    #[test]
    fn page_bounds() {
        let errors = errors_for(&Filters::new(0, 20, "id"));
        assert_eq!(errors["page"], "must be greater than zero");

        let errors = errors_for(&Filters::new(MAX_PAGE + 1, 20, "id"));
        assert_eq!(errors["page"], "must be a maximum of 10 million");

        assert!(errors_for(&Filters::new(MAX_PAGE, 20, "id")).is_empty());
    }

    #[test]
    fn page_size_bounds() {
        let errors = errors_for(&Filters::new(1, 0, "id"));
        assert_eq!(errors["page_size"], "must be greater than zero");

        let errors = errors_for(&Filters::new(1, 101, "id"));
        assert_eq!(errors["page_size"], "must be a maximum of 100");

        assert!(errors_for(&Filters::new(1, 100, "id")).is_empty());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = errors_for(&Filters::new(-1, 500, "nope"));
        assert_eq!(errors.len(), 3);
    }
}
