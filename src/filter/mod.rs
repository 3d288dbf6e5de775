pub mod error;
pub mod filter;
pub mod metadata;
pub mod types;

pub use error::FilterError;
pub use filter::{validate_filters, Filters, SERVICE_SORT_SAFELIST};
pub use metadata::{calculate_metadata, Metadata};
pub use types::{FilterOrderInfo, SortColumn, SortDirection, TitleSearch};
