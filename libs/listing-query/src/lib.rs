//! Property search core.
//!
//! Turns raw query-string items into a typed predicate tree plus sort and
//! pagination instructions. Nothing in this crate performs I/O; storage
//! backends consume [`SearchPlan`] and render the predicate in their own
//! query language.
//!
//! ```
//! use homestead_query::{plan, ListingQuery, SearchVariant};
//!
//! let items = vec![
//!     ("type".to_string(), "HOUSE".to_string()),
//!     ("bedrooms".to_string(), "5".to_string()),
//! ];
//! let query = ListingQuery::from_items(&items);
//! let plan = plan(&SearchVariant::List, &query).unwrap();
//! assert_eq!(
//!     plan.filter.to_document(),
//!     serde_json::json!({
//!         "isActive": true,
//!         "type": "house",
//!         "specifications.bedrooms": { "$gte": 5 }
//!     })
//! );
//! ```

#![forbid(unsafe_code)]

mod compile;
mod error;
mod field;
mod pagination;
mod params;
mod predicate;
mod price;
mod sort;

pub use compile::{compile, plan, FilterBuilder, SearchPlan, SearchVariant};
pub use error::{QueryError, Result};
pub use field::Field;
pub use pagination::{PagePlan, PaginationMeta};
pub use params::{ListingQuery, NormalizerOptions, DEFAULT_PAGE_SIZE};
pub use predicate::{Condition, Op, Predicate, Range, Scalar, TextPattern};
pub use price::PriceBucket;
pub use sort::{SortField, SortOrder, SortSpec};
