pub mod error;
pub mod format;
pub mod manager;
pub mod metadata;
pub mod table;

pub use error::{Result, SchemaError};
pub use format::TableFormat;
pub use manager::StatusTableManager;
pub use metadata::{ColumnSpec, ColumnType, Metadata, MetadataStore};
pub use table::StatusTable;
