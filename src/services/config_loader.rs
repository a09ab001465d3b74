// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::CompareConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    pub fn from_file(path: &Path) -> Result<CompareConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: CompareConfig =
            serde_saphyr::from_str(&content).with_context(|| "Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// 設定を解決する
    ///
    /// パスが明示された場合はそのファイルを必須とし、
    /// 省略時はデフォルトパスが存在すれば読み込み、なければデフォルト値を使います。
    pub fn resolve(path: Option<&Path>) -> Result<CompareConfig> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(CompareConfig::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(CompareConfig::default())
                }
            }
        }
    }
}
