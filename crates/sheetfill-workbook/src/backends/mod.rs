#[cfg(feature = "calamine")]
pub mod calamine;
#[cfg(feature = "csv")]
pub mod csv;

#[cfg(feature = "calamine")]
pub use calamine::CalamineAdapter;
#[cfg(feature = "csv")]
pub use csv::CsvAdapter;
