// exportコマンドハンドラー
//
// データベースのカタログを取得し、チェックサム付きのスナップショットファイルとして保存します。
// 保存したファイルは compare / row-counts の引数として接続文字列の代わりに使えます。

use crate::adapters::snapshot_store::SnapshotStore;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::Side;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// exportコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ExportCommand {
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 取得元の接続文字列
    pub source: String,
    /// 出力先ファイル
    pub output: PathBuf,
    /// 既存ファイルを確認なしで上書き
    pub force: bool,
    /// 進捗スピナーを表示するか
    pub show_progress: bool,
}

/// exportコマンドハンドラー
#[derive(Debug, Default)]
pub struct ExportCommandHandler {}

impl ExportCommandHandler {
    /// 新しいExportCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// exportコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - exportコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 成功時はエクスポート結果のサマリー、失敗時はエラーメッセージ
    pub async fn execute(&self, command: &ExportCommand) -> Result<String> {
        // 上書き確認（接続前に行う）
        self.check_output_path(command)?;

        let context = CommandContext::load(command.config_path.clone())?;
        let snapshot = context
            .snapshot_loader(command.show_progress)
            .load(&command.source, Side::Source, None)
            .await?;

        let checksum = SnapshotStore::new()
            .save(&command.output, &snapshot)
            .with_context(|| format!("Failed to write snapshot file: {:?}", command.output))?;

        Ok(format!(
            "Exported snapshot to {}\n{}\nChecksum: {}",
            command.output.display(),
            snapshot.summary(),
            checksum
        ))
    }

    fn check_output_path(&self, command: &ExportCommand) -> Result<()> {
        if command.output.exists() && !command.force {
            return Err(anyhow!(
                "Output file already exists: {:?}\nUse --force to overwrite.",
                command.output
            ));
        }
        Ok(())
    }
}
