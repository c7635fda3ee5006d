//! Read-model serialization for external collaborators: the JSON session
//! report and CSV exports.

pub mod history_csv;
pub mod report;

pub use history_csv::{
    history_csv_to_path, q_table_csv_to_path, write_history_csv, write_q_table_csv,
};
pub use report::SessionReport;
