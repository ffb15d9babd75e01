//! Tabular dataset loading, schema resolution and input path lookup.

pub mod paths;
pub mod schema;
pub mod table;

pub use paths::{PathResolution, resolve_data_path};
pub use schema::{Schema, SchemaError};
pub use table::{DatasetError, Table};
