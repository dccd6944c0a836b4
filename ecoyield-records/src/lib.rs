//! ecoyield-records: merged price history, rate series, fact table assembly and CSV files

pub mod csv_store;
pub mod facts;
pub mod history;
pub mod series;

pub use facts::FactBuilder;
pub use history::{CategoryPrice, average_by_date_category, latest_price_by_category, merge_histories};
pub use series::{SeriesRow, SeriesTable};
