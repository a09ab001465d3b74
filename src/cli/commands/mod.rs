// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod compare;
pub mod export;
pub mod row_counts;
pub mod table_formatter;
pub mod xml_report;

use crate::adapters::catalog_introspector::{CatalogIntrospector, PostgresCatalogIntrospector};
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::snapshot_store::SnapshotStore;
use crate::cli::OutputFormat;
use crate::core::config::CompareConfig;
use crate::core::error::DatabaseError;
use crate::core::snapshot::DatabaseSnapshot;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// コマンド出力の共通インターフェース
///
/// JSON出力は `Serialize` 実装をそのまま使います。
pub trait CommandOutput: Serialize {
    /// コンソール表示用テキスト
    fn to_text(&self) -> String;

    /// XMLレポート
    fn to_xml(&self) -> String;
}

/// 出力フォーマットに応じて出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(output.to_text()),
        OutputFormat::Xml => Ok(output.to_xml()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}

/// 差分の有無を伴うコマンド結果
///
/// 差分がある場合、終了コードは 2 になります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub has_differences: bool,
}

/// 取得対象（比較の左右、またはエクスポート元）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// エクスポート元
    Source,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Source => "source",
        }
    }
}

/// スナップショット取得元
///
/// 既存の `.json` ファイルはスナップショットファイル、それ以外は接続文字列として扱います。
pub struct SnapshotLoader<'a> {
    config: &'a CompareConfig,
    show_progress: bool,
}

impl<'a> SnapshotLoader<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self {
            config,
            show_progress: true,
        }
    }

    /// 進捗表示を無効にする（テスト・非対話実行用）
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// スナップショットを取得
    ///
    /// # Arguments
    ///
    /// * `source` - 接続文字列またはスナップショットファイルのパス
    /// * `side` - 左右どちらの取得か（進捗表示に使用）
    /// * `apply_sql` - 取得前に適用するSQL（接続文字列の場合のみ有効）
    pub async fn load(
        &self,
        source: &str,
        side: Side,
        apply_sql: Option<&str>,
    ) -> Result<DatabaseSnapshot> {
        if SnapshotStore::is_snapshot_file(source) {
            if apply_sql.is_some() {
                return Err(anyhow!(
                    "--apply-sql-file requires a database connection for the {} side, got snapshot file: {}",
                    side.label(),
                    source
                ));
            }
            debug!(side = side.label(), path = source, "Loading snapshot file");
            return SnapshotStore::new()
                .load(Path::new(source))
                .with_context(|| format!("Failed to load {} snapshot", side.label()));
        }

        let spinner = self.spinner(&format!("Connecting to {} database...", side.label()));

        let connection = DatabaseConnectionService::new(self.config);
        let result: Result<DatabaseSnapshot, DatabaseError> = async {
            let pool = connection.create_pool(source).await?;
            let snapshot = PostgresCatalogIntrospector::new()
                .capture(&pool, source, apply_sql)
                .await;
            connection.close_pool(pool).await;
            snapshot
        }
        .await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        result.with_context(|| format!("Failed to capture {} database", side.label()))
    }

    /// 進捗スピナーを表示（stderrに出力）
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct SampleOutput {
        count: usize,
        #[serde(skip)]
        text_message: String,
    }

    impl CommandOutput for SampleOutput {
        fn to_text(&self) -> String {
            self.text_message.clone()
        }

        fn to_xml(&self) -> String {
            format!("<sample count=\"{}\"/>", self.count)
        }
    }

    #[test]
    fn test_render_output_formats() {
        let output = SampleOutput {
            count: 2,
            text_message: "two".to_string(),
        };

        assert_eq!(render_output(&output, &OutputFormat::Table).unwrap(), "two");
        assert_eq!(
            render_output(&output, &OutputFormat::Xml).unwrap(),
            "<sample count=\"2\"/>"
        );
        let json = render_output(&output, &OutputFormat::Json).unwrap();
        assert!(json.contains("\"count\": 2"));
        assert!(!json.contains("text_message"));
    }

    #[tokio::test]
    async fn test_apply_sql_rejected_for_snapshot_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("right.json");
        SnapshotStore::new()
            .save(&path, &DatabaseSnapshot::new("file", "PostgreSQL 16.1"))
            .unwrap();

        let config = CompareConfig::default();
        let loader = SnapshotLoader::new(&config).without_progress();
        let err = loader
            .load(path.to_str().unwrap(), Side::Right, Some("SELECT 1"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("--apply-sql-file"));
    }

    #[tokio::test]
    async fn test_load_snapshot_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("left.json");
        let snapshot = DatabaseSnapshot::new("postgres://localhost/app", "PostgreSQL 16.1");
        SnapshotStore::new().save(&path, &snapshot).unwrap();

        let config = CompareConfig::default();
        let loaded = SnapshotLoader::new(&config)
            .without_progress()
            .load(path.to_str().unwrap(), Side::Left, None)
            .await
            .unwrap();

        assert_eq!(loaded.source, "postgres://localhost/app");
    }
}
