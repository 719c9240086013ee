//! Location subsystem: name tables, term resolution, and page retrieval.

pub mod fetch;
pub mod resolver;
pub mod tables;
pub mod types;

pub use fetch::{fetch_document, location_url, DEFAULT_BASE_URL};
pub use resolver::LocationResolver;
pub use tables::NameTables;
pub use types::{
    group_by_kind, FetchError, LocationDescriptor, LocationKind, ResolveError, TableError,
};
