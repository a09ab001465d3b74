// データベース接続アダプター
//
// SQLxを使用したPostgreSQL接続プールの管理を行います。

use crate::core::config::CompareConfig;
use crate::core::error::DatabaseError;
use crate::core::snapshot::redact_connection_string;
use sqlx::pool::PoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone)]
pub struct DatabaseConnectionService {
    max_connections: u32,
    connect_timeout: u64,
}

impl DatabaseConnectionService {
    /// 設定から接続サービスを作成
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            connect_timeout: config.connect_timeout,
        }
    }

    /// データベース接続プールを作成
    ///
    /// # Arguments
    ///
    /// * `connection_string` - `postgres://` 形式の接続文字列
    ///
    /// # Returns
    ///
    /// 接続プールまたはエラー
    pub async fn create_pool(&self, connection_string: &str) -> Result<PgPool, DatabaseError> {
        self.pool_options()
            .connect(connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!(
                    "Failed to connect to {}",
                    redact_connection_string(connection_string)
                ),
                cause: e.to_string(),
            })
    }

    /// プールオプションを作成
    pub fn pool_options(&self) -> PoolOptions<Postgres> {
        PoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout))
    }

    /// 接続プールを閉じる
    pub async fn close_pool(&self, pool: PgPool) {
        pool.close().await;
    }
}

impl Default for DatabaseConnectionService {
    fn default() -> Self {
        Self::new(&CompareConfig::default())
    }
}
