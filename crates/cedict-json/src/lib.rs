pub mod export;
pub mod handlers;
pub mod index;

pub use export::{ExportError, ExportOptions, Field, OutputFormat, parse_fields, write_json};
pub use handlers::{AppState, router};
pub use index::{KeyIndex, LookupParams, QueryResult, normalize_query, parse_letters};
