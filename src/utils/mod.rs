pub mod format;
pub mod table;

pub use format::{explorer_url, format_algo, format_date, short_address};
pub use table::Table;
