//! Ingestion 错误类型

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 文件无法打开或读取
    #[error("failed to read {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV 结构错误 (编码、引号等)
    #[error("malformed csv in {path}: {source}")]
    Csv {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// 必需列缺失
    #[error("{table} table {path} has no column matching {aliases:?}")]
    MissingColumn {
        /// 表名
        table: &'static str,
        /// 文件路径
        path: PathBuf,
        /// 接受的列名
        aliases: Vec<String>,
    },
}

impl IngestionError {
    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Io { source, .. } => ContractError::Io(source),
            IngestionError::MissingColumn { table, aliases, .. } => ContractError::MissingColumn {
                table: table.to_string(),
                aliases,
            },
            other => ContractError::Other(other.to_string()),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
