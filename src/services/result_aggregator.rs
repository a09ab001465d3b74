// 解析結果の集計
//
// 種別ごとの件数サマリーを作成します。
// 差分件数とバージョン警告は AnalysisResult 側で計算します。

use crate::core::analysis::SummaryRow;
use crate::core::catalog::ObjectKind;
use crate::core::snapshot::DatabaseSnapshot;
use crate::services::definition_normalizer::NotNullConstraintFilter;

/// サマリーの表示順
pub const SUMMARY_ORDER: [ObjectKind; 10] = [
    ObjectKind::Schema,
    ObjectKind::Table,
    ObjectKind::Column,
    ObjectKind::Index,
    ObjectKind::Constraint,
    ObjectKind::View,
    ObjectKind::Trigger,
    ObjectKind::Function,
    ObjectKind::MaterializedView,
    ObjectKind::Sequence,
];

/// 種別ごとの件数サマリーを作成
///
/// 制約の件数は自動生成NOT NULL制約を除外した後の値です。
///
/// # Arguments
///
/// * `left` - あるべき姿のスナップショット
/// * `right` - 現状のスナップショット
/// * `filter` - 制約の除外フィルタ
pub fn build_summary(
    left: &DatabaseSnapshot,
    right: &DatabaseSnapshot,
    filter: &NotNullConstraintFilter,
) -> Vec<SummaryRow> {
    SUMMARY_ORDER
        .iter()
        .map(|kind| {
            SummaryRow::new(
                kind.plural_label(),
                object_count(left, *kind, filter),
                object_count(right, *kind, filter),
            )
        })
        .collect()
}

fn object_count(
    snapshot: &DatabaseSnapshot,
    kind: ObjectKind,
    filter: &NotNullConstraintFilter,
) -> usize {
    match kind {
        ObjectKind::Schema => snapshot.schemas.len(),
        ObjectKind::Table => snapshot.tables.len(),
        ObjectKind::Column => snapshot.columns.len(),
        ObjectKind::Index => snapshot.indexes.len(),
        ObjectKind::Constraint => snapshot
            .constraints
            .values()
            .filter(|c| filter.keeps(c))
            .count(),
        ObjectKind::View => snapshot.views.len(),
        ObjectKind::Trigger => snapshot.triggers.len(),
        ObjectKind::Function => snapshot.functions.len(),
        ObjectKind::MaterializedView => snapshot.materialized_views.len(),
        ObjectKind::Sequence => snapshot.sequences.len(),
    }
}
