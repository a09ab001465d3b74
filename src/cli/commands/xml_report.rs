// XMLレポート生成
//
// 比較結果を <database_comparison>、行数比較結果を <row_count_comparison> として出力します。
// 各セクションには差分のあるノードのみを出力し、2スペースでインデントします。

use crate::core::analysis::{AnalysisResult, AnalysisRow};
use crate::core::catalog::ObjectKind;
use crate::core::snapshot::DatabaseSnapshot;
use crate::services::row_count_comparator::{RowCountComparison, RowCountStatus};
use std::fmt::Write;

/// XMLテキスト・属性値のエスケープ
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// インデント付きXMLライター
#[derive(Debug)]
pub struct XmlWriter {
    output: String,
    open: Vec<String>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            output: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
            open: Vec::new(),
        }
    }

    fn indent(&mut self) {
        let depth = self.open.len();
        self.output.push_str(&"  ".repeat(depth));
    }

    /// 開始タグ
    pub fn start(&mut self, name: &str) {
        self.indent();
        writeln!(self.output, "<{}>", name).unwrap();
        self.open.push(name.to_string());
    }

    /// 直近の開始タグを閉じる
    pub fn end(&mut self) {
        if let Some(name) = self.open.pop() {
            self.indent();
            writeln!(self.output, "</{}>", name).unwrap();
        }
    }

    /// テキストのみを持つ要素
    pub fn text_element(&mut self, name: &str, text: &str) {
        self.text_element_with_attrs(name, &[], text);
    }

    /// 属性とテキストを持つ要素
    pub fn text_element_with_attrs(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) {
        self.indent();
        let attributes: String = attrs
            .iter()
            .map(|(key, value)| format!(" {}=\"{}\"", key, escape_xml(value)))
            .collect();
        if text.is_empty() {
            writeln!(self.output, "<{}{}/>", name, attributes).unwrap();
        } else {
            writeln!(
                self.output,
                "<{}{}>{}</{}>",
                name,
                attributes,
                escape_xml(text),
                name
            )
            .unwrap();
        }
    }

    /// 子を持たない要素
    pub fn empty_element(&mut self, name: &str) {
        self.indent();
        writeln!(self.output, "<{}/>", name).unwrap();
    }

    /// 未終了のタグをすべて閉じて文字列を返す
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.end();
        }
        self.output
    }
}

/// 差分ノードのセクション定義（出力順）
const SECTIONS: [(ObjectKind, &str, &str); 9] = [
    (ObjectKind::Schema, "schemas", "schema"),
    (ObjectKind::Table, "tables", "table"),
    (ObjectKind::Column, "columns", "column"),
    (ObjectKind::Index, "indexes", "index"),
    (ObjectKind::Constraint, "constraints", "constraint"),
    (ObjectKind::View, "views", "view"),
    (ObjectKind::MaterializedView, "materialized_views", "materialized_view"),
    (ObjectKind::Trigger, "triggers", "trigger"),
    (ObjectKind::Function, "functions", "function"),
];

/// 比較結果のXMLレポートを生成
///
/// # Arguments
///
/// * `result` - 解析結果
/// * `row_counts` - SQL適用前後の行数比較（SQL適用時のみ）
pub fn generate_comparison_xml(
    result: &AnalysisResult,
    row_counts: Option<&RowCountComparison>,
) -> String {
    let mut xml = XmlWriter::new();
    xml.start("database_comparison");

    write_connections(&mut xml, result.left, result.right, true);

    if let Some(warning) = result.version_warning() {
        xml.text_element("version_warning", &warning);
    }

    xml.start("summary");
    for row in &result.summary {
        xml.start("item");
        xml.text_element("type", &row.object_type);
        xml.text_element("left_count", &row.left_count.to_string());
        xml.text_element("right_count", &row.right_count.to_string());
        xml.text_element("different", bool_text(row.is_different()));
        xml.end();
    }
    xml.end();

    for (kind, section, element) in SECTIONS {
        let rows: Vec<&dyn AnalysisRow> = result
            .rows_of(kind)
            .into_iter()
            .filter(|row| row.is_different())
            .collect();
        if rows.is_empty() {
            xml.empty_element(section);
            continue;
        }
        xml.start(section);
        for row in rows {
            write_difference(&mut xml, element, row);
        }
        xml.end();
    }

    if let Some(row_counts) = row_counts {
        write_row_count_changes(&mut xml, row_counts);
    }

    xml.text_element(
        "number_of_differences",
        &result.count_differences().to_string(),
    );

    xml.finish()
}

fn write_connections(
    xml: &mut XmlWriter,
    left: &DatabaseSnapshot,
    right: &DatabaseSnapshot,
    with_version: bool,
) {
    xml.start("connections");
    for (name, snapshot) in [("left", left), ("right", right)] {
        if with_version {
            let version = snapshot.major_version();
            xml.text_element_with_attrs(
                name,
                &[("postgres_version", version.as_str())],
                &snapshot.source,
            );
        } else {
            xml.text_element(name, &snapshot.source);
        }
    }
    xml.end();
}

fn write_difference(xml: &mut XmlWriter, element: &str, row: &dyn AnalysisRow) {
    xml.start(element);
    // スキーマはローカル名、それ以外は完全修飾名
    let name = match row.kind() {
        ObjectKind::Schema => row.name().to_string(),
        _ => row.full_name(),
    };
    xml.text_element("name", &name);
    xml.text_element("action", &row.action_description());
    if row.is_modified() {
        xml.text_element("detail", &row.modification_detail());
    }
    xml.end();
}

/// SQL適用前後の行数変化
///
/// 比較は「適用後 = left、適用前 = right」で行われている前提です。
fn write_row_count_changes(xml: &mut XmlWriter, row_counts: &RowCountComparison) {
    let changed: Vec<_> = row_counts.changed().collect();
    if changed.is_empty() {
        xml.empty_element("row_counts");
        return;
    }

    xml.start("row_counts");
    for entry in changed {
        xml.start("row_count");
        xml.text_element("name", &entry.table);
        match entry.status {
            RowCountStatus::Differs => {
                xml.text_element("action", "modified");
                xml.text_element("before_count", &entry.right_count.unwrap_or(0).to_string());
                xml.text_element("after_count", &entry.left_count.unwrap_or(0).to_string());
                xml.text_element("change", &entry.change_label());
            }
            RowCountStatus::Removed => {
                xml.text_element("action", "removed");
                xml.text_element("rows_removed", &entry.right_count.unwrap_or(0).to_string());
            }
            RowCountStatus::Added => {
                xml.text_element("action", "added");
                xml.text_element("rows_added", &entry.left_count.unwrap_or(0).to_string());
            }
            RowCountStatus::Match => {}
        }
        xml.end();
    }
    xml.end();
}

/// 行数比較のXMLレポートを生成
pub fn generate_row_count_xml(
    left: &DatabaseSnapshot,
    right: &DatabaseSnapshot,
    comparison: &RowCountComparison,
) -> String {
    let mut xml = XmlWriter::new();
    xml.start("row_count_comparison");

    write_connections(&mut xml, left, right, false);

    if comparison.entries.is_empty() {
        xml.empty_element("tables");
    } else {
        xml.start("tables");
        for entry in &comparison.entries {
            xml.start("table");
            xml.text_element("name", &entry.table);
            if let Some(count) = entry.left_count {
                xml.text_element("left_count", &count.to_string());
            }
            if let Some(count) = entry.right_count {
                xml.text_element("right_count", &count.to_string());
            }
            xml.text_element("status", entry.status.as_str());
            xml.text_element(
                "differs",
                bool_text(entry.status != RowCountStatus::Match),
            );
            xml.end();
        }
        xml.end();
    }

    xml.text_element(
        "number_of_differences",
        &comparison.differences().to_string(),
    );

    xml.finish()
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
