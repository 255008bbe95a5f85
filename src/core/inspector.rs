use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

pub const SAMPLE_VALUES: usize = 3;

/// 零售面板資料集的檔案清單
pub const RETAIL_FILES: [&str; 8] = [
    "transaction_data.csv",
    "product.csv",
    "hh_demographic.csv",
    "coupon.csv",
    "campaign_table.csv",
    "campaign_desc.csv",
    "causal_data.csv",
    "coupon_redempt.csv",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSample {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileInspection {
    Found {
        file_name: String,
        columns: Vec<ColumnSample>,
        total_rows: usize,
    },
    Missing {
        file_name: String,
    },
    Unreadable {
        file_name: String,
        error: String,
    },
}

impl FileInspection {
    pub fn file_name(&self) -> &str {
        match self {
            FileInspection::Found { file_name, .. }
            | FileInspection::Missing { file_name }
            | FileInspection::Unreadable { file_name, .. } => file_name,
        }
    }
}

pub fn inspect_data_dir<P: AsRef<Path>>(dir: P, files: &[String]) -> Vec<FileInspection> {
    files
        .iter()
        .map(|file_name| {
            let path = dir.as_ref().join(file_name);
            if !path.is_file() {
                tracing::warn!("❌ {} - file not found", file_name);
                return FileInspection::Missing {
                    file_name: file_name.clone(),
                };
            }

            match inspect_file(&path) {
                Ok((columns, total_rows)) => {
                    tracing::info!(
                        "📁 {}: {} columns, {} rows",
                        file_name,
                        columns.len(),
                        total_rows
                    );
                    FileInspection::Found {
                        file_name: file_name.clone(),
                        columns,
                        total_rows,
                    }
                }
                Err(e) => {
                    tracing::warn!("❌ {} - read failed: {}", file_name, e);
                    FileInspection::Unreadable {
                        file_name: file_name.clone(),
                        error: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

fn inspect_file(path: &Path) -> Result<(Vec<ColumnSample>, usize)> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut columns: Vec<ColumnSample> = reader
        .headers()?
        .iter()
        .map(|header| ColumnSample {
            column: header.to_string(),
            values: Vec::new(),
        })
        .collect();

    let mut total_rows = 0;
    for record in reader.records() {
        let record = record?;
        total_rows += 1;
        for (column, value) in columns.iter_mut().zip(record.iter()) {
            if column.values.len() < SAMPLE_VALUES && !value.trim().is_empty() {
                column.values.push(value.to_string());
            }
        }
    }

    Ok((columns, total_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_reports_columns_samples_and_missing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("product.csv"),
            "PRODUCT_ID,COMMODITY_DESC\n1,MILK\n2,\n3,BREAD\n4,EGGS\n5,CHEESE\n",
        )
        .unwrap();

        let files = vec!["product.csv".to_string(), "coupon.csv".to_string()];
        let report = inspect_data_dir(dir.path(), &files);

        match &report[0] {
            FileInspection::Found {
                columns,
                total_rows,
                ..
            } => {
                assert_eq!(*total_rows, 5);
                assert_eq!(columns[0].column, "PRODUCT_ID");
                assert_eq!(columns[0].values, vec!["1", "2", "3"]);
                assert_eq!(columns[1].values, vec!["MILK", "BREAD", "EGGS"]);
            }
            other => panic!("unexpected inspection: {:?}", other),
        }
        assert!(matches!(report[1], FileInspection::Missing { .. }));
        assert_eq!(report[1].file_name(), "coupon.csv");
    }

    #[test]
    fn test_ragged_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.csv"), "a,b\n1,2,3\n").unwrap();

        let report = inspect_data_dir(dir.path(), &["bad.csv".to_string()]);
        assert!(matches!(report[0], FileInspection::Unreadable { .. }));
    }
}
