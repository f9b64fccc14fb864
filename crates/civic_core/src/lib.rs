pub mod config;
pub mod dataset;
pub mod dates;
pub mod error;
pub mod projections;
pub mod query;
pub mod schema;
pub mod session;
pub mod style;

pub use query::{query, set_status, Filter, QueryConfig, SortKey};
pub use schema::{Issue, Severity, Status};
pub use session::Session;
