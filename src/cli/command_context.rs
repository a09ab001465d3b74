// コマンド共通コンテキスト
//
// 設定ファイル読み込みと、設定に依存するサービスの組み立てをCLI層で集約する。

use crate::cli::commands::SnapshotLoader;
use crate::core::config::CompareConfig;
use crate::services::config_loader::ConfigLoader;
use crate::services::definition_normalizer::NotNullConstraintFilter;
use crate::services::schema_analyzer::SchemaAnalyzer;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config_path: Option<PathBuf>,
    pub config: CompareConfig,
}

impl CommandContext {
    /// 設定を読み込んでコンテキストを作成
    ///
    /// `config_path` が省略された場合はカレントディレクトリの `.pgcmp.yaml`、
    /// それもなければデフォルト設定を使用します。
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = ConfigLoader::resolve(config_path.as_deref())
            .with_context(|| "Failed to load configuration")?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// 設定済みの値から直接作成
    pub fn with_config(config: CompareConfig) -> Self {
        Self {
            config_path: None,
            config,
        }
    }

    /// 設定に従ったスキーマ解析サービス
    pub fn analyzer(&self) -> Result<SchemaAnalyzer> {
        let filter =
            NotNullConstraintFilter::new(self.config.not_null_constraint_pattern.as_deref())
                .with_context(|| "Invalid not_null_constraint_pattern")?;
        Ok(SchemaAnalyzer::new(filter))
    }

    /// スナップショット取得サービス
    pub fn snapshot_loader(&self, show_progress: bool) -> SnapshotLoader<'_> {
        let loader = SnapshotLoader::new(&self.config);
        if show_progress {
            loader
        } else {
            loader.without_progress()
        }
    }
}
