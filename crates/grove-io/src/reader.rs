//! CSV dataset reader with shape validation.

use std::path::{Path, PathBuf};

use grove_rf::Scalar;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::dataset::LabeledDataset;

/// Reads a feature table (optionally with a label column) from a CSV file.
///
/// Expected CSV format:
/// - Header row required, one name per column
/// - Every row has the same number of columns as the header
/// - Cells that parse as finite floats are numeric, all others categorical
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::UnknownLabelColumn`] | Label column missing from the header |
/// | [`IoError::NoFeatureColumns`] | No columns left besides the label |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct DatasetReader {
    path: PathBuf,
    label_column: Option<String>,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            label_column: None,
        }
    }

    /// Split the named column off as labels.
    #[must_use]
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Read and validate the CSV file, returning a [`LabeledDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LabeledDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // Flexible so ragged rows surface as InconsistentRowLength, not CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        let label_index = self
            .label_column
            .as_deref()
            .map(|column| {
                header
                    .iter()
                    .position(|h| h.trim() == column)
                    .ok_or_else(|| IoError::UnknownLabelColumn {
                        path: self.path.clone(),
                        column: column.to_string(),
                    })
            })
            .transpose()?;

        let feature_names: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != label_index)
            .map(|(_, name)| name.trim().to_string())
            .collect();
        if feature_names.is_empty() {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }

        let mut features = Vec::new();
        let mut labels = label_index.map(|_| Vec::new());

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(feature_names.len());
            for (col_index, raw) in record.iter().enumerate() {
                let cell = Scalar::parse(raw);
                if Some(col_index) == label_index {
                    if let Some(labels) = labels.as_mut() {
                        labels.push(cell);
                    }
                } else {
                    row.push(cell);
                }
            }
            features.push(row);
        }

        if features.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_samples = features.len(),
            n_features = feature_names.len(),
            labeled = labels.is_some(),
            "dataset loaded"
        );

        Ok(LabeledDataset::new(feature_names, features, labels))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_mixed_labeled_dataset() {
        let csv = "color,diameter,fruit\ngreen,3,apple\nyellow,3,apple\nred,1,grape\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path())
            .with_label_column("fruit")
            .read()
            .unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.feature_names(), &["color", "diameter"]);
        assert_eq!(
            ds.features()[2],
            vec![Scalar::from("red"), Scalar::from(1.0)]
        );
        assert_eq!(ds.labels().unwrap()[2], Scalar::from("grape"));
    }

    #[test]
    fn label_column_can_be_anywhere() {
        let csv = "y,a,b\n1,0.5,2\n0,0.25,4\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).with_label_column("y").read().unwrap();
        assert_eq!(ds.feature_names(), &["a", "b"]);
        assert_eq!(ds.labels().unwrap(), &[Scalar::from(1.0), Scalar::from(0.0)]);
        assert_eq!(ds.numeric_features().unwrap(), vec![vec![0.5, 2.0], vec![0.25, 4.0]]);
    }

    #[test]
    fn unlabeled_reads_every_column() {
        let csv = "a,b\n1,2\n3,4\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_features(), 2);
        assert!(ds.labels().is_none());
    }

    #[test]
    fn unknown_label_column_error() {
        let f = write_csv("a,b\n1,2\n");
        let err = DatasetReader::new(f.path())
            .with_label_column("species")
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::UnknownLabelColumn { .. }));
    }

    #[test]
    fn no_feature_columns_error() {
        let f = write_csv("label\nx\ny\n");
        let err = DatasetReader::new(f.path())
            .with_label_column("label")
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::NoFeatureColumns { .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv("a,b\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn inconsistent_row_length_error() {
        let f = write_csv("a,b\n1,2\n3\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_error() {
        let err = DatasetReader::new(Path::new("/nonexistent/grove/data.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn non_finite_text_is_categorical() {
        let f = write_csv("a\nNaN\n");
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.features()[0][0], Scalar::from("NaN"));
    }
}
