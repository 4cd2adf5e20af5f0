//! CSV dataset loading and JSON report writing for the grove estimators.

mod dataset;
mod error;
mod reader;
mod writer;

pub use dataset::LabeledDataset;
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::ReportWriter;
