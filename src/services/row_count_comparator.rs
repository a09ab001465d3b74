// 行数比較サービス
//
// スキーマ比較を行わず、テーブルごとの行数のみを比較します。
// SQL適用前後の行数比較にも同じ分類を使います。

use crate::core::snapshot::DatabaseSnapshot;
use crate::services::key_set_reconciler::reconcile;
use serde::Serialize;
use std::collections::BTreeMap;

/// 行数比較の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowCountStatus {
    /// 両側に存在し行数が一致
    Match,
    /// 両側に存在し行数が異なる
    Differs,
    /// 左側のみに存在
    Added,
    /// 右側のみに存在
    Removed,
}

impl RowCountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCountStatus::Match => "match",
            RowCountStatus::Differs => "differs",
            RowCountStatus::Added => "added",
            RowCountStatus::Removed => "removed",
        }
    }
}

/// テーブル1件分の行数比較
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCountEntry {
    pub table: String,
    pub left_count: Option<i64>,
    pub right_count: Option<i64>,
    pub status: RowCountStatus,
}

impl RowCountEntry {
    /// 右側から左側への増減
    pub fn change(&self) -> i64 {
        self.left_count.unwrap_or(0) - self.right_count.unwrap_or(0)
    }

    /// 符号付きの増減（`+3` / `-2` / `0`）
    pub fn change_label(&self) -> String {
        let change = self.change();
        if change > 0 {
            format!("+{}", change)
        } else {
            change.to_string()
        }
    }
}

/// 行数比較の結果（テーブル名の辞書順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowCountComparison {
    pub entries: Vec<RowCountEntry>,
}

impl RowCountComparison {
    /// 一致しないテーブルの件数
    pub fn differences(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status != RowCountStatus::Match)
            .count()
    }

    pub fn has_differences(&self) -> bool {
        self.differences() > 0
    }

    /// 一致しないエントリのみ
    pub fn changed(&self) -> impl Iterator<Item = &RowCountEntry> {
        self.entries
            .iter()
            .filter(|e| e.status != RowCountStatus::Match)
    }
}

/// 2つのスナップショットのテーブル行数を比較
///
/// 行数が未取得のテーブルは 0 件として扱います。
pub fn compare_row_counts(left: &DatabaseSnapshot, right: &DatabaseSnapshot) -> RowCountComparison {
    compare_counts(&left.row_counts(), &right.row_counts())
}

/// 「テーブル -> 行数」のマップ同士を比較
///
/// # Arguments
///
/// * `left` - 比較元（SQL適用前後の比較では適用後）
/// * `right` - 比較先（SQL適用前後の比較では適用前）
pub fn compare_counts(
    left: &BTreeMap<String, i64>,
    right: &BTreeMap<String, i64>,
) -> RowCountComparison {
    let entries = reconcile(left.iter(), right.iter())
        .into_iter()
        .map(|presence| {
            let status = match (presence.left, presence.right) {
                (Some(l), Some(r)) if l == r => RowCountStatus::Match,
                (Some(_), Some(_)) => RowCountStatus::Differs,
                (Some(_), None) => RowCountStatus::Added,
                _ => RowCountStatus::Removed,
            };
            RowCountEntry {
                table: presence.key.to_string(),
                left_count: presence.left.copied(),
                right_count: presence.right.copied(),
                status,
            }
        })
        .collect();

    RowCountComparison { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Table;

    fn counts(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_classification() {
        let left = counts(&[("public.a", 1), ("public.b", 5), ("public.new", 2)]);
        let right = counts(&[("public.a", 1), ("public.b", 3), ("public.old", 7)]);

        let comparison = compare_counts(&left, &right);
        let statuses: Vec<(&str, RowCountStatus)> = comparison
            .entries
            .iter()
            .map(|e| (e.table.as_str(), e.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("public.a", RowCountStatus::Match),
                ("public.b", RowCountStatus::Differs),
                ("public.new", RowCountStatus::Added),
                ("public.old", RowCountStatus::Removed),
            ]
        );
        assert_eq!(comparison.differences(), 3);
        assert_eq!(comparison.changed().count(), 3);
    }

    #[test]
    fn test_change_label() {
        let comparison = compare_counts(
            &counts(&[("t", 10), ("u", 1)]),
            &counts(&[("t", 7), ("u", 4)]),
        );
        assert_eq!(comparison.entries[0].change_label(), "+3");
        assert_eq!(comparison.entries[1].change_label(), "-3");
    }

    #[test]
    fn test_compare_snapshots_treats_missing_count_as_zero() {
        let mut left = DatabaseSnapshot::new("left", "");
        left.add_table(Table::new("public", "users"));
        let mut right = DatabaseSnapshot::new("right", "");
        right.add_table(Table::new("public", "users").with_row_count(0));

        let comparison = compare_row_counts(&left, &right);
        assert!(!comparison.has_differences());
    }
}
