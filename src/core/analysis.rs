// 差分解析ツリーのドメインモデル
//
// 2つのスナップショットを突き合わせた結果を、スキーマ → テーブル → カラム等の
// 入れ子構造で表現します。アクションと差分有無は保持せず、読み出しのたびに
// 存在フラグとフィールド比較から再計算します。

use crate::core::catalog::{
    CatalogObject, Column, Constraint, Function, Index, MaterializedView, ObjectKind, Schema,
    Table, Trigger, View,
};
use crate::core::snapshot::DatabaseSnapshot;
use serde::Serialize;
use std::fmt;

/// 右側（現状）を左側（あるべき姿）に合わせるためのアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    None,
    Add,
    Remove,
    Modify,
}

impl Action {
    /// 存在フラグと変更有無からアクションを導出
    ///
    /// 片側にしか存在しない場合はフィールド比較の結果に関わらず ADD / REMOVE になります。
    pub fn derive(in_left: bool, in_right: bool, is_modified: bool) -> Self {
        match (in_left, in_right) {
            (true, false) => Action::Add,
            (false, true) => Action::Remove,
            _ if is_modified => Action::Modify,
            _ => Action::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::None => "",
            Action::Add => "ADD",
            Action::Remove => "REMOVE",
            Action::Modify => "MODIFY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 種別ごとのフィールド比較
///
/// 比較対象のフィールドと報告順は各種別の実装で明示的に列挙します。
/// 両側が存在する場合のみ呼び出されます。
pub trait ComparableObject: CatalogObject {
    /// 変更内容の説明（`field: old -> new` 形式）を報告順に返す
    fn modifications(left: &Self, right: &Self) -> Vec<String>;

    /// 旧/新の比較テキスト（複数行）
    fn modification_detail(left: &Self, right: &Self, full_name: &str, mods: &[String])
        -> String;
}

/// 解析ノード共通の読み出しインターフェース
///
/// レポート出力はこのトレイトだけに依存します。
pub trait AnalysisRow {
    fn kind(&self) -> ObjectKind;

    /// ローカル名（完全修飾ではない）
    fn name(&self) -> &str;

    /// 表示用の完全修飾名
    fn full_name(&self) -> String;

    fn in_left(&self) -> bool;

    fn in_right(&self) -> bool;

    /// 自身のフィールド比較結果（子ノードは含まない）
    fn get_modifications(&self) -> Vec<String>;

    /// 旧/新の比較テキスト
    fn modification_detail(&self) -> String;

    /// 両側に存在し、フィールドが異なるかどうか
    fn is_modified(&self) -> bool {
        !self.get_modifications().is_empty()
    }

    /// 差分があるかどうか（コンテナは子孫の差分も含む）
    fn is_different(&self) -> bool {
        self.has_own_difference()
    }

    /// 自身の存在フラグまたはフィールドの差分があるかどうか
    ///
    /// 差分件数の集計に使用し、子孫からの伝播は含みません。
    fn has_own_difference(&self) -> bool {
        self.in_left() != self.in_right() || self.is_modified()
    }

    fn action(&self) -> Action {
        Action::derive(self.in_left(), self.in_right(), self.is_modified())
    }

    /// 人が読むためのアクション説明（例: `create schema audit`）
    fn action_description(&self) -> String {
        let kind = self.kind();
        let (add, remove, modify) = kind.verbs();
        let verb = match self.action() {
            Action::Add => Some(add),
            Action::Remove => Some(remove),
            Action::Modify => modify,
            Action::None => None,
        };
        match verb {
            Some(verb) => format!("{} {} {}", verb, kind.noun(), self.full_name()),
            None => String::new(),
        }
    }
}

/// 葉ノード（カラム、インデックス、制約、トリガー、ビュー、マテビュー、関数）
#[derive(Debug, Clone)]
pub struct ObjectAnalysis<'a, T> {
    pub name: String,
    pub schema_name: String,
    pub table_name: Option<String>,
    pub in_left: bool,
    pub in_right: bool,
    /// 左スナップショット内のオブジェクトへの参照
    pub left_object: Option<&'a T>,
    /// 右スナップショット内のオブジェクトへの参照
    pub right_object: Option<&'a T>,
}

pub type ColumnAnalysis<'a> = ObjectAnalysis<'a, Column>;
pub type IndexAnalysis<'a> = ObjectAnalysis<'a, Index>;
pub type ConstraintAnalysis<'a> = ObjectAnalysis<'a, Constraint>;
pub type TriggerAnalysis<'a> = ObjectAnalysis<'a, Trigger>;
pub type ViewAnalysis<'a> = ObjectAnalysis<'a, View>;
pub type MaterializedViewAnalysis<'a> = ObjectAnalysis<'a, MaterializedView>;
pub type FunctionAnalysis<'a> = ObjectAnalysis<'a, Function>;

impl<'a, T: CatalogObject> ObjectAnalysis<'a, T> {
    /// キーの所属情報からノードを作成
    ///
    /// 名前はどちらか存在する側のオブジェクトから取得します。
    pub fn new(left: Option<&'a T>, right: Option<&'a T>) -> Self {
        let reference = left.or(right);
        Self {
            name: reference.map(|o| o.local_name()).unwrap_or_default(),
            schema_name: reference
                .map(|o| o.schema_name().to_string())
                .unwrap_or_default(),
            table_name: reference.and_then(|o| o.table_name().map(str::to_string)),
            in_left: left.is_some(),
            in_right: right.is_some(),
            left_object: left,
            right_object: right,
        }
    }
}

impl<T: ComparableObject> AnalysisRow for ObjectAnalysis<'_, T> {
    fn kind(&self) -> ObjectKind {
        T::KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> String {
        T::KIND.full_name(&self.schema_name, self.table_name.as_deref(), &self.name)
    }

    fn in_left(&self) -> bool {
        self.in_left
    }

    fn in_right(&self) -> bool {
        self.in_right
    }

    fn get_modifications(&self) -> Vec<String> {
        match (self.left_object, self.right_object) {
            (Some(left), Some(right)) => T::modifications(left, right),
            _ => Vec::new(),
        }
    }

    fn modification_detail(&self) -> String {
        let (Some(left), Some(right)) = (self.left_object, self.right_object) else {
            return String::new();
        };
        let mods = T::modifications(left, right);
        if mods.is_empty() {
            return String::new();
        }
        T::modification_detail(left, right, &self.full_name(), &mods)
    }
}

/// テーブルノード（カラム、トリガー、インデックス、制約を子に持つ）
#[derive(Debug, Clone)]
pub struct TableAnalysis<'a> {
    pub name: String,
    pub schema_name: String,
    pub in_left: bool,
    pub in_right: bool,
    pub left_object: Option<&'a Table>,
    pub right_object: Option<&'a Table>,
    pub columns: Vec<ColumnAnalysis<'a>>,
    pub triggers: Vec<TriggerAnalysis<'a>>,
    pub indexes: Vec<IndexAnalysis<'a>>,
    pub constraints: Vec<ConstraintAnalysis<'a>>,
}

impl<'a> TableAnalysis<'a> {
    pub fn new(left: Option<&'a Table>, right: Option<&'a Table>) -> Self {
        let reference = left.or(right);
        Self {
            name: reference.map(|t| t.local_name()).unwrap_or_default(),
            schema_name: reference
                .map(|t| t.table_schema.clone())
                .unwrap_or_default(),
            in_left: left.is_some(),
            in_right: right.is_some(),
            left_object: left,
            right_object: right,
            columns: Vec::new(),
            triggers: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// 子ノードを設定して確定する
    pub fn with_children(
        self,
        columns: Vec<ColumnAnalysis<'a>>,
        triggers: Vec<TriggerAnalysis<'a>>,
        indexes: Vec<IndexAnalysis<'a>>,
        constraints: Vec<ConstraintAnalysis<'a>>,
    ) -> Self {
        Self {
            columns,
            triggers,
            indexes,
            constraints,
            ..self
        }
    }

    pub fn left_row_count(&self) -> Option<i64> {
        self.left_object.and_then(|t| t.row_count)
    }

    pub fn right_row_count(&self) -> Option<i64> {
        self.right_object.and_then(|t| t.row_count)
    }

    /// 両側に存在し、行数が異なるかどうか
    pub fn row_count_differs(&self) -> bool {
        self.in_left && self.in_right && self.left_row_count() != self.right_row_count()
    }

    /// 子ノードの総数
    pub fn child_count(&self) -> usize {
        self.columns.len() + self.triggers.len() + self.indexes.len() + self.constraints.len()
    }
}

impl AnalysisRow for TableAnalysis<'_> {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Table
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> String {
        ObjectKind::Table.full_name(&self.schema_name, None, &self.name)
    }

    fn in_left(&self) -> bool {
        self.in_left
    }

    fn in_right(&self) -> bool {
        self.in_right
    }

    fn get_modifications(&self) -> Vec<String> {
        Vec::new()
    }

    fn modification_detail(&self) -> String {
        String::new()
    }

    // 行数の差は行数比較モードで扱うため含めない
    fn is_different(&self) -> bool {
        self.in_left != self.in_right
            || self.columns.iter().any(|c| c.is_different())
            || self.triggers.iter().any(|t| t.is_different())
            || self.indexes.iter().any(|i| i.is_different())
            || self.constraints.iter().any(|c| c.is_different())
    }
}

/// スキーマノード（テーブル、ビュー、マテビュー、関数を子に持つ）
#[derive(Debug, Clone)]
pub struct SchemaAnalysis<'a> {
    pub name: String,
    pub in_left: bool,
    pub in_right: bool,
    pub left_object: Option<&'a Schema>,
    pub right_object: Option<&'a Schema>,
    pub tables: Vec<TableAnalysis<'a>>,
    pub views: Vec<ViewAnalysis<'a>>,
    pub materialized_views: Vec<MaterializedViewAnalysis<'a>>,
    pub functions: Vec<FunctionAnalysis<'a>>,
}

impl<'a> SchemaAnalysis<'a> {
    pub fn new(left: Option<&'a Schema>, right: Option<&'a Schema>) -> Self {
        Self {
            name: left
                .or(right)
                .map(|s| s.schema_name.clone())
                .unwrap_or_default(),
            in_left: left.is_some(),
            in_right: right.is_some(),
            left_object: left,
            right_object: right,
            tables: Vec::new(),
            views: Vec::new(),
            materialized_views: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// 子ノードを設定して確定する
    pub fn with_children(
        self,
        tables: Vec<TableAnalysis<'a>>,
        views: Vec<ViewAnalysis<'a>>,
        materialized_views: Vec<MaterializedViewAnalysis<'a>>,
        functions: Vec<FunctionAnalysis<'a>>,
    ) -> Self {
        Self {
            tables,
            views,
            materialized_views,
            functions,
            ..self
        }
    }
}

impl AnalysisRow for SchemaAnalysis<'_> {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> String {
        self.name.clone()
    }

    fn in_left(&self) -> bool {
        self.in_left
    }

    fn in_right(&self) -> bool {
        self.in_right
    }

    fn get_modifications(&self) -> Vec<String> {
        Vec::new()
    }

    fn modification_detail(&self) -> String {
        String::new()
    }

    fn is_different(&self) -> bool {
        self.in_left != self.in_right
            || self.tables.iter().any(|t| t.is_different())
            || self.views.iter().any(|v| v.is_different())
            || self.materialized_views.iter().any(|m| m.is_different())
            || self.functions.iter().any(|f| f.is_different())
    }
}

/// 種別ごとの件数サマリー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub object_type: String,
    pub left_count: usize,
    pub right_count: usize,
}

impl SummaryRow {
    pub fn new(object_type: impl Into<String>, left_count: usize, right_count: usize) -> Self {
        Self {
            object_type: object_type.into(),
            left_count,
            right_count,
        }
    }

    pub fn is_different(&self) -> bool {
        self.left_count != self.right_count
    }
}

/// 解析結果
#[derive(Debug, Clone)]
pub struct AnalysisResult<'a> {
    pub left: &'a DatabaseSnapshot,
    pub right: &'a DatabaseSnapshot,
    pub summary: Vec<SummaryRow>,
    /// スキーマ名の辞書順
    pub schemas: Vec<SchemaAnalysis<'a>>,
}

/// 差分件数の集計対象となる種別
const COUNTED_KINDS: [ObjectKind; 9] = [
    ObjectKind::Schema,
    ObjectKind::Table,
    ObjectKind::Column,
    ObjectKind::Index,
    ObjectKind::Constraint,
    ObjectKind::Trigger,
    ObjectKind::View,
    ObjectKind::MaterializedView,
    ObjectKind::Function,
];

impl<'a> AnalysisResult<'a> {
    /// いずれかのスキーマに差分があるかどうか
    pub fn has_differences(&self) -> bool {
        self.schemas.iter().any(|s| s.is_different())
    }

    /// 全階層の差分件数
    ///
    /// 自身の存在フラグまたはフィールドに差分があるノードのみを数えます。
    /// 子孫の差分によってコンテナが重複して数えられることはありません。
    pub fn count_differences(&self) -> usize {
        COUNTED_KINDS
            .iter()
            .map(|kind| {
                self.rows_of(*kind)
                    .into_iter()
                    .filter(|row| row.has_own_difference())
                    .count()
            })
            .sum()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableAnalysis<'a>> + '_ {
        self.schemas.iter().flat_map(|s| s.tables.iter())
    }

    /// 指定種別の全ノードを、スキーマ・テーブルの辞書順に平坦化して返す
    pub fn rows_of(&self, kind: ObjectKind) -> Vec<&dyn AnalysisRow> {
        match kind {
            ObjectKind::Schema => self.schemas.iter().map(as_row).collect(),
            ObjectKind::Table => self.tables().map(as_row).collect(),
            ObjectKind::Column => self
                .tables()
                .flat_map(|t| t.columns.iter().map(as_row))
                .collect(),
            ObjectKind::Index => self
                .tables()
                .flat_map(|t| t.indexes.iter().map(as_row))
                .collect(),
            ObjectKind::Constraint => self
                .tables()
                .flat_map(|t| t.constraints.iter().map(as_row))
                .collect(),
            ObjectKind::Trigger => self
                .tables()
                .flat_map(|t| t.triggers.iter().map(as_row))
                .collect(),
            ObjectKind::View => self
                .schemas
                .iter()
                .flat_map(|s| s.views.iter().map(as_row))
                .collect(),
            ObjectKind::MaterializedView => self
                .schemas
                .iter()
                .flat_map(|s| s.materialized_views.iter().map(as_row))
                .collect(),
            ObjectKind::Function => self
                .schemas
                .iter()
                .flat_map(|s| s.functions.iter().map(as_row))
                .collect(),
            ObjectKind::Sequence => Vec::new(),
        }
    }

    /// メジャーバージョンが異なるかどうか
    pub fn versions_differ(&self) -> bool {
        self.left.major_version() != self.right.major_version()
    }

    /// バージョン差異の警告メッセージ（参考情報のみ）
    pub fn version_warning(&self) -> Option<String> {
        if !self.versions_differ() {
            return None;
        }
        Some(format!(
            "Warning: PostgreSQL versions differ (left: {}, right: {}). Some differences may be due to version-specific output formatting.",
            self.left.major_version(),
            self.right.major_version()
        ))
    }
}

fn as_row<R: AnalysisRow>(row: &R) -> &dyn AnalysisRow {
    row
}
