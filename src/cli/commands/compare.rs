// compareコマンドハンドラー
//
// 2つのスナップショットを取得して解析し、指定フォーマットでレポートを出力します。
// 責務は以下の3層に分離されています:
// - 取得: SnapshotLoader（接続文字列またはスナップショットファイル）
// - 解析: SchemaAnalyzer（services層）
// - 出力: table_formatter / xml_report / JSON

use crate::cli::command_context::CommandContext;
use crate::cli::commands::table_formatter::format_comparison_table;
use crate::cli::commands::xml_report::generate_comparison_xml;
use crate::cli::commands::{render_output, CommandOutput, CommandResult, Side};
use crate::cli::OutputFormat;
use crate::core::analysis::{Action, AnalysisResult, SummaryRow};
use crate::core::catalog::ObjectKind;
use crate::services::row_count_comparator::{compare_counts, RowCountComparison};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// compareコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct CompareCommand {
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// あるべき姿（接続文字列またはスナップショットファイル）
    pub left: String,
    /// 現状（接続文字列またはスナップショットファイル）
    pub right: String,
    /// 右側の取得前に適用するSQLファイル
    pub apply_sql_file: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
    /// 進捗スピナーを表示するか
    pub show_progress: bool,
}

/// 接続先情報
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub source: String,
    pub postgres_version: String,
}

/// 差分のあるノード1件
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceEntry {
    pub kind: ObjectKind,
    pub name: String,
    pub action: Action,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// compareコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct CompareOutput {
    pub left: ConnectionInfo,
    pub right: ConnectionInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_warning: Option<String>,
    pub summary: Vec<SummaryRow>,
    pub differences: Vec<DifferenceEntry>,
    /// SQL適用前後の行数比較（SQL適用時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_counts: Option<RowCountComparison>,
    pub number_of_differences: usize,
    pub has_differences: bool,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
    /// XML出力メッセージ
    #[serde(skip)]
    pub xml_message: String,
}

impl CommandOutput for CompareOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }

    fn to_xml(&self) -> String {
        self.xml_message.clone()
    }
}

/// 差分を出力する種別の順序
const DIFFERENCE_KINDS: [ObjectKind; 9] = [
    ObjectKind::Schema,
    ObjectKind::Table,
    ObjectKind::Column,
    ObjectKind::Index,
    ObjectKind::Constraint,
    ObjectKind::View,
    ObjectKind::MaterializedView,
    ObjectKind::Trigger,
    ObjectKind::Function,
];

/// compareコマンドハンドラー
#[derive(Debug, Default)]
pub struct CompareCommandHandler {}

impl CompareCommandHandler {
    /// 新しいCompareCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// compareコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - compareコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 整形済みレポートと差分の有無
    pub async fn execute(&self, command: &CompareCommand) -> Result<CommandResult> {
        let context = CommandContext::load(command.config_path.clone())?;
        let analyzer = context.analyzer()?;

        let apply_sql = match &command.apply_sql_file {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read SQL file: {:?}", path))?,
            ),
            None => None,
        };

        let loader = context.snapshot_loader(command.show_progress);
        let left = loader.load(&command.left, Side::Left, None).await?;
        let right = loader
            .load(&command.right, Side::Right, apply_sql.as_deref())
            .await?;

        let spinner = loader.spinner("Analyzing differences...");
        let result = analyzer.analyze(&left, &right);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if let Some(warning) = result.version_warning() {
            eprintln!("{}", warning.yellow());
        }

        // SQL適用後 = left、適用前 = right として比較
        let row_counts = apply_sql
            .as_ref()
            .map(|_| compare_counts(&right.row_counts(), &right.row_counts_before));

        let output = self.build_output(&result, row_counts, &command.format);
        info!(
            differences = output.number_of_differences,
            has_differences = output.has_differences,
            "Comparison finished"
        );

        Ok(CommandResult {
            output: render_output(&output, &command.format)?,
            has_differences: output.has_differences,
        })
    }

    /// 解析結果から出力構造体を組み立てる
    ///
    /// 整形済みテキストは指定フォーマットのもののみ生成します。
    pub fn build_output(
        &self,
        result: &AnalysisResult,
        row_counts: Option<RowCountComparison>,
        format: &OutputFormat,
    ) -> CompareOutput {
        let differences = Self::collect_differences(result);
        debug!(differences = differences.len(), "Collected difference entries");

        let text_message = match format {
            OutputFormat::Table => format_comparison_table(result),
            _ => String::new(),
        };
        let xml_message = match format {
            OutputFormat::Xml => generate_comparison_xml(result, row_counts.as_ref()),
            _ => String::new(),
        };

        CompareOutput {
            left: ConnectionInfo {
                source: result.left.source.clone(),
                postgres_version: result.left.major_version(),
            },
            right: ConnectionInfo {
                source: result.right.source.clone(),
                postgres_version: result.right.major_version(),
            },
            version_warning: result.version_warning(),
            summary: result.summary.clone(),
            differences,
            row_counts,
            number_of_differences: result.count_differences(),
            has_differences: result.has_differences(),
            text_message,
            xml_message,
        }
    }

    fn collect_differences(result: &AnalysisResult) -> Vec<DifferenceEntry> {
        DIFFERENCE_KINDS
            .iter()
            .flat_map(|kind| result.rows_of(*kind))
            .filter(|row| row.is_different())
            .map(|row| {
                let modified = row.is_modified();
                DifferenceEntry {
                    kind: row.kind(),
                    name: row.full_name(),
                    action: row.action(),
                    description: row.action_description(),
                    modifications: row.get_modifications(),
                    detail: modified.then(|| row.modification_detail()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Column, Schema, Table};
    use crate::core::snapshot::DatabaseSnapshot;
    use crate::services::schema_analyzer::SchemaAnalyzer;

    fn snapshots() -> (DatabaseSnapshot, DatabaseSnapshot) {
        let mut left = DatabaseSnapshot::new("left-db", "PostgreSQL 16.1");
        let mut right = DatabaseSnapshot::new("right-db", "PostgreSQL 16.1");
        for snapshot in [&mut left, &mut right] {
            snapshot.add_schema(Schema::new("public", "postgres"));
            snapshot.add_table(Table::new("public", "users"));
        }
        left.add_column(Column::new("public", "users", "email", "text", true));
        (left, right)
    }

    #[test]
    fn test_build_output_json_fields() {
        let (left, right) = snapshots();
        let result = SchemaAnalyzer::default().analyze(&left, &right);
        let output =
            CompareCommandHandler::new().build_output(&result, None, &OutputFormat::Json);

        assert!(output.has_differences);
        assert_eq!(output.number_of_differences, 1);
        assert_eq!(output.differences.len(), 3);
        assert!(output.text_message.is_empty());

        let json = render_output(&output, &OutputFormat::Json).unwrap();
        assert!(json.contains("\"description\": \"add column public.users.email\""));
        assert!(json.contains("\"action\": \"ADD\""));
        assert!(!json.contains("row_counts"));
    }

    #[test]
    fn test_build_output_table_and_xml() {
        let (left, right) = snapshots();
        let result = SchemaAnalyzer::default().analyze(&left, &right);
        let handler = CompareCommandHandler::new();

        let table = handler.build_output(&result, None, &OutputFormat::Table);
        assert!(table.to_text().contains("add column public.users.email"));
        assert!(table.to_xml().is_empty());

        let xml = handler.build_output(&result, None, &OutputFormat::Xml);
        let report = xml.to_xml();
        assert!(report.contains("<database_comparison>"));
        assert!(report.contains("<name>public.users.email</name>"));
        assert!(report.contains("<number_of_differences>1</number_of_differences>"));
    }
}
