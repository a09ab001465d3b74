// 比較設定
//
// 設定ファイル（YAML形式）で指定する比較オプションと接続オプション。
// ファイルI/Oは services::config_loader が担当します。

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 自動生成されたNOT NULL制約名のデフォルトパターン
///
/// PostgreSQL 18 以降は `2200_16385_1_not_null` のような名前で
/// NOT NULL 制約がカタログに現れるため、比較対象から除外します。
pub const DEFAULT_NOT_NULL_CONSTRAINT_PATTERN: &str = r"^\d+[-_]\d+[-_]\d+_not_null$";

/// 比較設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareConfig {
    /// 除外する制約名のパターン（`null` でフィルタ無効）
    #[serde(default = "default_not_null_constraint_pattern")]
    pub not_null_constraint_pattern: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 1つの接続先あたりの最大接続数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_not_null_constraint_pattern() -> Option<String> {
    Some(DEFAULT_NOT_NULL_CONSTRAINT_PATTERN.to_string())
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    2
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            not_null_constraint_pattern: default_not_null_constraint_pattern(),
            connect_timeout: default_connect_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl CompareConfig {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = ".pgcmp.yaml";

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pattern) = &self.not_null_constraint_pattern {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                cause: e.to_string(),
            })?;
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::NonPositive {
                field: "connect_timeout".to_string(),
                value: 0,
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_connections".to_string(),
                value: 0,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CompareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout, 30);
        assert_eq!(config.max_connections, 2);
        assert_eq!(
            config.not_null_constraint_pattern.as_deref(),
            Some(DEFAULT_NOT_NULL_CONSTRAINT_PATTERN)
        );
    }

    #[test]
    fn test_validate_rejects_invalid_pattern() {
        let config = CompareConfig {
            not_null_constraint_pattern: Some("([".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not_null_constraint_pattern"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = CompareConfig {
            connect_timeout: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompareConfig {
            max_connections: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_pattern_is_valid() {
        let config = CompareConfig {
            not_null_constraint_pattern: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
