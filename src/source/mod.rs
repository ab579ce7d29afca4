// Dataset sources: where customer CSV exports are read from.

pub mod fetcher;
pub mod traits;

pub use fetcher::{MAX_EXPORT_BYTES, SourceImpl, has_csv_extension, validate_file_format};
pub use traits::RowSource;
