// CSV ingestion: text -> validated billing rows

pub mod csv_parser;
pub mod validator;

pub use csv_parser::{CsvParser, Parser, detect_delimiter};
pub use validator::validate_csv_data;
