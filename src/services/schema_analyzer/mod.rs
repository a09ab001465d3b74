// スキーマ解析サービス
//
// 2つのスナップショットを突き合わせ、スキーマ → テーブル → カラム等の
// 差分解析ツリーを構築します。子オブジェクトは親が両側に存在する場合のみ解析し、
// 片側にしか存在しないスキーマやテーブルの中身は展開しません。

mod column_comparator;
mod constraint_comparator;
mod function_comparator;
mod index_comparator;
mod trigger_comparator;
mod view_comparator;

use crate::core::analysis::{
    AnalysisResult, AnalysisRow, ObjectAnalysis, SchemaAnalysis, TableAnalysis,
};
use crate::core::catalog::{CatalogObject, Schema, Table};
use crate::core::snapshot::DatabaseSnapshot;
use crate::services::definition_normalizer::NotNullConstraintFilter;
use crate::services::key_set_reconciler::{reconcile, KeyPresence};
use crate::services::result_aggregator::build_summary;
use std::fmt::Display;
use tracing::debug;

/// スキーマ解析サービス
#[derive(Debug, Clone, Default)]
pub struct SchemaAnalyzer {
    not_null_filter: NotNullConstraintFilter,
}

impl SchemaAnalyzer {
    /// 新しいSchemaAnalyzerを作成
    pub fn new(not_null_filter: NotNullConstraintFilter) -> Self {
        Self { not_null_filter }
    }

    /// 2つのスナップショットを解析
    ///
    /// # Arguments
    ///
    /// * `left` - あるべき姿のスナップショット
    /// * `right` - 現状のスナップショット
    ///
    /// # Returns
    ///
    /// サマリーとスキーマ名順の解析ツリー
    pub fn analyze<'a>(
        &self,
        left: &'a DatabaseSnapshot,
        right: &'a DatabaseSnapshot,
    ) -> AnalysisResult<'a> {
        let summary = build_summary(left, right, &self.not_null_filter);

        let schemas = reconcile(left.schemas.iter(), right.schemas.iter())
            .into_iter()
            .map(|presence| self.analyze_schema(left, right, presence))
            .collect::<Vec<_>>();

        debug!(
            schemas = schemas.len(),
            different = schemas.iter().filter(|s| s.is_different()).count(),
            "Schema analysis completed"
        );

        AnalysisResult {
            left,
            right,
            summary,
            schemas,
        }
    }

    fn analyze_schema<'a>(
        &self,
        left: &'a DatabaseSnapshot,
        right: &'a DatabaseSnapshot,
        presence: KeyPresence<'a, Schema>,
    ) -> SchemaAnalysis<'a> {
        let node = SchemaAnalysis::new(presence.left, presence.right);
        if !presence.in_both() {
            return node;
        }

        let name = node.name.clone();
        let in_schema = |schema: &str| schema == name;

        let tables = reconcile(
            left.tables.iter().filter(|(_, t)| in_schema(&t.table_schema)),
            right.tables.iter().filter(|(_, t)| in_schema(&t.table_schema)),
        )
        .into_iter()
        .map(|presence| self.analyze_table(left, right, presence))
        .collect::<Vec<_>>();

        let views = leaves(
            left.views.iter().filter(|(_, v)| in_schema(&v.table_schema)),
            right.views.iter().filter(|(_, v)| in_schema(&v.table_schema)),
        );
        let materialized_views = leaves(
            left.materialized_views
                .iter()
                .filter(|(_, m)| in_schema(&m.schema_name)),
            right
                .materialized_views
                .iter()
                .filter(|(_, m)| in_schema(&m.schema_name)),
        );
        let functions = leaves(
            left.functions.iter().filter(|(_, f)| in_schema(&f.schema_name)),
            right.functions.iter().filter(|(_, f)| in_schema(&f.schema_name)),
        );

        debug!(
            schema = %name,
            tables = tables.len(),
            views = views.len(),
            materialized_views = materialized_views.len(),
            functions = functions.len(),
            "Analyzed schema"
        );

        node.with_children(tables, views, materialized_views, functions)
    }

    fn analyze_table<'a>(
        &self,
        left: &'a DatabaseSnapshot,
        right: &'a DatabaseSnapshot,
        presence: KeyPresence<'a, Table>,
    ) -> TableAnalysis<'a> {
        let node = TableAnalysis::new(presence.left, presence.right);
        if !presence.in_both() {
            return node;
        }

        let (schema, table) = (node.schema_name.clone(), node.name.clone());
        let in_table = |s: &str, t: &str| s == schema && t == table;

        let columns = leaves(
            left.columns
                .iter()
                .filter(|(_, c)| in_table(&c.table_schema, &c.table_name)),
            right
                .columns
                .iter()
                .filter(|(_, c)| in_table(&c.table_schema, &c.table_name)),
        );
        let triggers = leaves(
            left.triggers
                .iter()
                .filter(|(_, t)| in_table(&t.event_object_schema, &t.event_object_table)),
            right
                .triggers
                .iter()
                .filter(|(_, t)| in_table(&t.event_object_schema, &t.event_object_table)),
        );
        let indexes = leaves(
            left.indexes
                .iter()
                .filter(|(_, i)| in_table(&i.schema_name, &i.table_name)),
            right
                .indexes
                .iter()
                .filter(|(_, i)| in_table(&i.schema_name, &i.table_name)),
        );
        let constraints = leaves(
            left.constraints.iter().filter(|(_, c)| {
                in_table(&c.table_schema, &c.table_name) && self.not_null_filter.keeps(c)
            }),
            right.constraints.iter().filter(|(_, c)| {
                in_table(&c.table_schema, &c.table_name) && self.not_null_filter.keeps(c)
            }),
        );

        debug!(
            schema = %schema,
            table = %table,
            columns = columns.len(),
            triggers = triggers.len(),
            indexes = indexes.len(),
            constraints = constraints.len(),
            "Analyzed table"
        );

        node.with_children(columns, triggers, indexes, constraints)
    }
}

/// 葉ノードの一覧を構築
fn leaves<'a, T, L, R>(left: L, right: R) -> Vec<ObjectAnalysis<'a, T>>
where
    T: CatalogObject + 'a,
    L: IntoIterator<Item = (&'a String, &'a T)>,
    R: IntoIterator<Item = (&'a String, &'a T)>,
{
    reconcile(left, right)
        .into_iter()
        .map(|presence| ObjectAnalysis::new(presence.left, presence.right))
        .collect()
}

/// 値が異なる場合に `field: old -> new` を追加
pub(crate) fn push_change(mods: &mut Vec<String>, field: &str, old: String, new: String) {
    if old != new {
        mods.push(format!("{}: {} -> {}", field, old, new));
    }
}

/// 真偽値の表示（True / False）
pub(crate) fn display_flag(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// 任意値の表示（欠損時は None）
pub(crate) fn display_opt<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}
