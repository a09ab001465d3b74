// スナップショットファイルの読み書き
//
// DatabaseSnapshot をチェックサム付きのJSONファイルとして保存し、
// 読み込み時に内容が改変されていないことを検証します。

use crate::core::error::{IoError, SnapshotError};
use crate::core::snapshot::DatabaseSnapshot;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// 保存時のファイル形式
#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    checksum: String,
    snapshot: &'a DatabaseSnapshot,
}

/// 読み込み時のファイル形式
#[derive(Deserialize)]
struct SnapshotFile {
    checksum: String,
    snapshot: DatabaseSnapshot,
}

/// スナップショットファイルストア
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore;

impl SnapshotStore {
    pub fn new() -> Self {
        Self
    }

    /// スナップショットをJSONファイルに保存
    ///
    /// # Arguments
    ///
    /// * `path` - 出力先ファイルパス
    /// * `snapshot` - 保存するスナップショット
    ///
    /// # Returns
    ///
    /// 記録したチェックサム
    pub fn save(&self, path: &Path, snapshot: &DatabaseSnapshot) -> Result<String> {
        let checksum = snapshot.checksum();
        let file = SnapshotFileRef {
            checksum: checksum.clone(),
            snapshot,
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        debug!(path = %path.display(), checksum = %checksum, "Snapshot saved");
        Ok(checksum)
    }

    /// JSONファイルからスナップショットを読み込み、チェックサムを検証
    pub fn load(&self, path: &Path) -> Result<DatabaseSnapshot> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let file: SnapshotFile =
            serde_json::from_str(&content).map_err(|e| SnapshotError::Parse {
                path: path.display().to_string(),
                cause: e.to_string(),
            })?;

        let actual = file.snapshot.checksum();
        if actual != file.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: file.checksum,
                actual,
            }
            .into());
        }

        debug!(path = %path.display(), "Snapshot loaded");
        Ok(file.snapshot)
    }

    /// 引数がスナップショットファイルを指しているかどうか
    ///
    /// 既存の `.json` ファイルであればファイル、それ以外は接続文字列として扱います。
    pub fn is_snapshot_file(source: &str) -> bool {
        let path = Path::new(source);
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}
