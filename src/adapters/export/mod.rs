//! Export adapters - renderers for researcher downloads.

mod csv_exporter;

pub use csv_exporter::{escape_field, SessionCsvExporter};
