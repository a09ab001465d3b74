// row-countsコマンドハンドラー
//
// スキーマ比較を行わず、両側のテーブル行数のみを比較します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::table_formatter::format_row_count_table;
use crate::cli::commands::xml_report::generate_row_count_xml;
use crate::cli::commands::{render_output, CommandOutput, CommandResult, Side};
use crate::cli::OutputFormat;
use crate::core::snapshot::DatabaseSnapshot;
use crate::services::row_count_comparator::{compare_row_counts, RowCountComparison};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// row-countsコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct RowCountsCommand {
    pub config_path: Option<PathBuf>,
    pub left: String,
    pub right: String,
    pub format: OutputFormat,
    pub show_progress: bool,
}

/// row-countsコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct RowCountsOutput {
    pub left: String,
    pub right: String,
    #[serde(flatten)]
    pub comparison: RowCountComparison,
    pub number_of_differences: usize,
    #[serde(skip)]
    pub text_message: String,
    #[serde(skip)]
    pub xml_message: String,
}

impl CommandOutput for RowCountsOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }

    fn to_xml(&self) -> String {
        self.xml_message.clone()
    }
}

/// row-countsコマンドハンドラー
#[derive(Debug, Default)]
pub struct RowCountsCommandHandler {}

impl RowCountsCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    /// row-countsコマンドを実行
    pub async fn execute(&self, command: &RowCountsCommand) -> Result<CommandResult> {
        let context = CommandContext::load(command.config_path.clone())?;
        let loader = context.snapshot_loader(command.show_progress);

        let left = loader.load(&command.left, Side::Left, None).await?;
        let right = loader.load(&command.right, Side::Right, None).await?;

        let output = self.build_output(&left, &right, &command.format);
        info!(
            tables = output.comparison.entries.len(),
            differences = output.number_of_differences,
            "Row count comparison finished"
        );

        Ok(CommandResult {
            output: render_output(&output, &command.format)?,
            has_differences: output.number_of_differences > 0,
        })
    }

    pub fn build_output(
        &self,
        left: &DatabaseSnapshot,
        right: &DatabaseSnapshot,
        format: &OutputFormat,
    ) -> RowCountsOutput {
        let comparison = compare_row_counts(left, right);

        let text_message = match format {
            OutputFormat::Table => format_row_count_table(&comparison),
            _ => String::new(),
        };
        let xml_message = match format {
            OutputFormat::Xml => generate_row_count_xml(left, right, &comparison),
            _ => String::new(),
        };

        RowCountsOutput {
            left: left.source.clone(),
            right: right.source.clone(),
            number_of_differences: comparison.differences(),
            comparison,
            text_message,
            xml_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Table;

    #[test]
    fn test_build_output_counts_differences() {
        let mut left = DatabaseSnapshot::new("left-db", "PostgreSQL 16.1");
        let mut right = DatabaseSnapshot::new("right-db", "PostgreSQL 16.1");
        left.add_table(Table::new("public", "users").with_row_count(10));
        right.add_table(Table::new("public", "users").with_row_count(10));
        left.add_table(Table::new("public", "orders").with_row_count(4));
        right.add_table(Table::new("public", "orders").with_row_count(1));

        let output = RowCountsCommandHandler::new().build_output(&left, &right, &OutputFormat::Json);

        assert_eq!(output.number_of_differences, 1);
        let json = render_output(&output, &OutputFormat::Json).unwrap();
        assert!(json.contains("\"entries\""));
        assert!(json.contains("\"status\": \"differs\""));
    }
}
