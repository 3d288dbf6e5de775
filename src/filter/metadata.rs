use serde::Serialize;

/// Pagination details returned alongside a page of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// An empty result yields all-zero metadata.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_all_zero() {
        assert_eq!(calculate_metadata(0, 1, 20), Metadata::default());
        assert_eq!(calculate_metadata(0, 7, 100), Metadata::default());
    }

    #[test]
    fn last_page_rounds_up() {
        let m = calculate_metadata(41, 2, 20);
        assert_eq!(
            m,
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 3,
                total_records: 41,
            }
        );
        assert_eq!(calculate_metadata(40, 1, 20).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }

    #[test]
    fn serializes_snake_case_fields() {
        let value = serde_json::to_value(calculate_metadata(5, 1, 2)).unwrap();
        assert_eq!(value["last_page"], 3);
        assert_eq!(value["total_records"], 5);
        assert_eq!(value["first_page"], 1);
    }
}
