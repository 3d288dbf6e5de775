use std::fmt;
use std::str::FromStr;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Columns a listing may be ordered by.
///
/// The SQL text comes from this enum, never from request input, so an
/// ORDER BY clause can only ever name one of these columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
}

impl SortColumn {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
        }
    }
}

impl FromStr for SortColumn {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortColumn::Id),
            "title" => Ok(SortColumn::Title),
            other => Err(FilterError::UnknownColumn(other.to_string())),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: SortColumn,
    pub sort: SortDirection,
}

/// Optional full-text query over service titles. `None` matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSearch(Option<String>);

impl TitleSearch {
    pub fn new(query: &str) -> Self {
        // Whitespace-only input is treated as no filter rather than an empty
        // tsquery, which would match nothing.
        let trimmed = query.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    pub fn any() -> Self {
        Self(None)
    }

    pub fn query(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Bound parameter for the search predicate; the empty string is the
    /// match-all value.
    pub fn as_param(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }
}

impl From<Option<String>> for TitleSearch {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(TitleSearch::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_parses_known_columns_only() {
        assert_eq!("id".parse::<SortColumn>().unwrap(), SortColumn::Id);
        assert_eq!("title".parse::<SortColumn>().unwrap(), SortColumn::Title);
        assert!("title; DROP TABLE services".parse::<SortColumn>().is_err());
        assert!("-id".parse::<SortColumn>().is_err());
    }

    #[test]
    fn blank_title_search_matches_all() {
        assert_eq!(TitleSearch::new("   "), TitleSearch::any());
        assert_eq!(TitleSearch::new("").as_param(), "");
        assert_eq!(TitleSearch::new(" plumbing ").query(), Some("plumbing"));
        assert_eq!(TitleSearch::from(None), TitleSearch::any());
    }
}
