pub mod error;
pub mod excel;
pub mod shape;

pub use error::{ExportError, Result};
pub use excel::{read_excel, values_sheet_name, write_excel};
pub use shape::write_shapefile;
