use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::filter::{FilterError, FilterOrderInfo, Filters, TitleSearch};

/// The one query shape used to list services.
///
/// The total match count comes from a window aggregate in the same
/// statement, and `id ASC` always breaks ties so page boundaries are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQuery {
    pub title: TitleSearch,
    pub order: FilterOrderInfo,
    pub limit: i64,
    pub offset: i64,
}

impl ServiceQuery {
    /// Fails on a sort key outside the safelist or a page outside the
    /// accepted range, before any SQL is assembled.
    pub fn new(title: TitleSearch, filters: &Filters) -> Result<Self, FilterError> {
        filters.check_bounds()?;
        Ok(Self {
            title,
            order: filters.order()?,
            limit: filters.limit(),
            offset: filters.offset()?,
        })
    }

    pub fn to_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) OVER() AS total_records, id, created_at, title, description, version \
             FROM services \
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '') \
             ORDER BY {} {}, id ASC \
             LIMIT $2 OFFSET $3",
            self.order.column.to_sql(),
            self.order.sort.to_sql(),
        )
    }

    /// Binds `$1` (title), `$2` (limit) and `$3` (offset) onto `sql`.
    pub fn bind<'q>(&'q self, sql: &'q str) -> Query<'q, Postgres, PgArguments> {
        sqlx::query(sql)
            .bind(self.title.as_param())
            .bind(self.limit)
            .bind(self.offset)
    }
}
