// エラー型定義
//
// 比較エンジン本体は全域関数でありエラーを定義しません。
// ここではイントロスペクション、スナップショットファイル、設定読み込みで
// 発生するエラーを thiserror で定義します。

use thiserror::Error;

/// データベースエラー
///
/// 接続、カタログ取得、SQL適用時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction {
        /// エラーメッセージ
        message: String,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// トランザクションエラーかどうか
    pub fn is_transaction(&self) -> bool {
        matches!(self, DatabaseError::Transaction { .. })
    }

    /// sqlxのエラーからクエリエラーを作成
    pub fn query(context: &str, sql: &str, error: sqlx::Error) -> Self {
        DatabaseError::Query {
            message: format!("{}: {}", context, error),
            sql: Some(sql.to_string()),
        }
    }
}

/// I/Oエラー
///
/// スナップショットファイルやSQLファイルの操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_file_write(&self) -> bool {
        matches!(self, IoError::FileWrite { .. })
    }
}

/// スナップショットファイルのエラー
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// JSON parse error
    #[error("Failed to parse snapshot file: {path} (cause: {cause})")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Checksum mismatch (file was modified after export)
    #[error("Snapshot checksum mismatch: {path} (expected: {expected}, actual: {actual})")]
    ChecksumMismatch {
        /// ファイルパス
        path: String,
        /// ファイルに記録されたチェックサム
        expected: String,
        /// 内容から再計算したチェックサム
        actual: String,
    },
}

impl SnapshotError {
    /// パースエラーかどうか
    pub fn is_parse(&self) -> bool {
        matches!(self, SnapshotError::Parse { .. })
    }

    /// チェックサム不一致エラーかどうか
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, SnapshotError::ChecksumMismatch { .. })
    }
}

/// 設定エラー
///
/// 設定ファイルの検証時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 正規表現が不正
    #[error("Invalid not_null_constraint_pattern '{pattern}': {cause}")]
    InvalidPattern {
        /// 指定されたパターン
        pattern: String,
        /// エラー原因
        cause: String,
    },

    /// 数値が範囲外
    #[error("'{field}' must be greater than 0 (got {value})")]
    NonPositive {
        /// 設定項目名
        field: String,
        /// 指定値
        value: u64,
    },
}
