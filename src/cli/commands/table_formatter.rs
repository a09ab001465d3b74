// コンソール表形式フォーマッター
//
// 比較結果と行数比較結果を comfy-table で罫線付きの表に整形します。
// --no-color 指定時やパイプ出力時は装飾を付けません。

use crate::core::analysis::{Action, AnalysisResult, AnalysisRow};
use crate::core::catalog::ObjectKind;
use crate::services::row_count_comparator::{RowCountComparison, RowCountStatus};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

/// 比較表のセクション順
const SECTION_ORDER: [(ObjectKind, &str); 9] = [
    (ObjectKind::Schema, "Schema"),
    (ObjectKind::Table, "Table"),
    (ObjectKind::Column, "Column"),
    (ObjectKind::View, "View"),
    (ObjectKind::MaterializedView, "Matview"),
    (ObjectKind::Index, "Index"),
    (ObjectKind::Constraint, "Constraint"),
    (ObjectKind::Trigger, "Trigger"),
    (ObjectKind::Function, "Function"),
];

/// 見出しと右寄せ列を設定した表を作成
fn create_table(headers: &[&str], right_aligned: &[usize]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    // colored の判定（--no-color, NO_COLOR, 非TTY）に合わせる
    if colored::control::SHOULD_COLORIZE.should_colorize() {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }

    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for index in right_aligned {
        if let Some(column) = table.column_mut(*index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

/// 解析結果を比較表に整形
///
/// 先頭にサマリー行、続いて種別ごとに全ノードを並べます。
/// Detail列には追加・削除時は操作説明、変更時は変更詳細を表示します。
pub fn format_comparison_table(result: &AnalysisResult) -> String {
    let mut table = create_table(&["Type", "Item", "Left", "Right", "Detail"], &[2, 3]);

    for row in &result.summary {
        table.add_row(vec![
            Cell::new("Summary").fg(Color::Cyan),
            Cell::new(&row.object_type),
            Cell::new(row.left_count),
            Cell::new(row.right_count),
            Cell::new(""),
        ]);
    }

    for (kind, label) in SECTION_ORDER {
        for row in result.rows_of(kind) {
            table.add_row(vec![
                Cell::new(label).fg(Color::Cyan),
                Cell::new(row.full_name()),
                presence_mark(row.in_left()),
                presence_mark(row.in_right()),
                detail_cell(row),
            ]);
        }
    }

    format!("{}\n{}", "Database Comparison".italic(), table)
}

fn presence_mark(present: bool) -> Cell {
    if present {
        Cell::new("✓").fg(Color::Green)
    } else {
        Cell::new("")
    }
}

fn detail_cell(row: &dyn AnalysisRow) -> Cell {
    match row.action() {
        Action::Add => Cell::new(row.action_description()).fg(Color::Yellow),
        Action::Remove => Cell::new(row.action_description()).fg(Color::Red),
        Action::Modify => Cell::new(row.modification_detail()).fg(Color::Cyan),
        Action::None => Cell::new(""),
    }
}

/// 行数比較結果を表に整形
pub fn format_row_count_table(comparison: &RowCountComparison) -> String {
    let mut table = create_table(&["Table", "Left", "Right", "Status"], &[1, 2]);

    for entry in &comparison.entries {
        let status_color = match entry.status {
            RowCountStatus::Match => Color::Green,
            RowCountStatus::Differs => Color::Cyan,
            RowCountStatus::Added => Color::Yellow,
            RowCountStatus::Removed => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&entry.table),
            Cell::new(count_label(entry.left_count)),
            Cell::new(count_label(entry.right_count)),
            Cell::new(entry.status.as_str()).fg(status_color),
        ]);
    }

    format!(
        "{}\n{}\n\n{}",
        "Row Count Comparison".italic(),
        table,
        format!(
            "Tables with different row counts: {}",
            comparison.differences()
        )
        .bold()
    )
}

fn count_label(count: Option<i64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}
