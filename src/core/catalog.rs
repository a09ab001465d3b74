// カタログオブジェクトのドメインモデル
//
// スナップショット取得時点のデータベースオブジェクトを表現する不変レコード群。
// 各種別は安定した名前要素のみから合成キーを構築します（OID等のサロゲートIDは使わない）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// カタログオブジェクト共通インターフェース
///
/// 合成キーの導出はオブジェクト自身の定義の一部であり、
/// 差分エンジン側で再計算しません。
pub trait CatalogObject {
    /// オブジェクト種別
    const KIND: ObjectKind;

    /// 比較用の合成キー
    fn key(&self) -> String;

    /// 親スコープ内でのローカル名
    fn local_name(&self) -> String;

    /// 所属スキーマ名
    fn schema_name(&self) -> &str;

    /// 所属テーブル名（テーブル配下のオブジェクトのみ）
    fn table_name(&self) -> Option<&str> {
        None
    }
}

/// オブジェクト種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Schema,
    Table,
    Column,
    Index,
    Constraint,
    Trigger,
    View,
    MaterializedView,
    Function,
    Sequence,
}

impl ObjectKind {
    /// 操作説明に使う名詞
    pub fn noun(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "schema",
            ObjectKind::Table => "table",
            ObjectKind::Column => "column",
            ObjectKind::Index => "index",
            ObjectKind::Constraint => "constraint",
            ObjectKind::Trigger => "trigger",
            ObjectKind::View => "view",
            ObjectKind::MaterializedView => "materialized view",
            ObjectKind::Function => "function",
            ObjectKind::Sequence => "sequence",
        }
    }

    /// サマリー表示名
    pub fn plural_label(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "Schemas",
            ObjectKind::Table => "Tables",
            ObjectKind::Column => "Columns",
            ObjectKind::Index => "Indexes",
            ObjectKind::Constraint => "Constraints",
            ObjectKind::Trigger => "Triggers",
            ObjectKind::View => "Views",
            ObjectKind::MaterializedView => "Materialized Views",
            ObjectKind::Function => "Functions",
            ObjectKind::Sequence => "Sequences",
        }
    }

    /// 追加・削除・変更時の動詞
    ///
    /// 変更の動詞を持たない種別（スキーマ、テーブル、シーケンス）は `None` を返します。
    pub fn verbs(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            ObjectKind::Column => ("add", "drop", Some("alter")),
            ObjectKind::Constraint => ("add", "drop", Some("replace")),
            ObjectKind::Index => ("create", "drop", Some("recreate")),
            ObjectKind::Trigger
            | ObjectKind::View
            | ObjectKind::MaterializedView
            | ObjectKind::Function => ("create", "drop", Some("replace")),
            ObjectKind::Schema | ObjectKind::Table | ObjectKind::Sequence => {
                ("create", "drop", None)
            }
        }
    }

    /// 表示用の完全修飾名を組み立てる
    ///
    /// インデックスはスキーマ直下の名前空間を持つため `schema.index` 形式、
    /// カラム・制約・トリガーは `schema.table.name` 形式になります。
    pub fn full_name(&self, schema: &str, table: Option<&str>, name: &str) -> String {
        match (self, table) {
            (ObjectKind::Schema, _) => name.to_string(),
            (ObjectKind::Column | ObjectKind::Constraint | ObjectKind::Trigger, Some(table)) => {
                format!("{}.{}.{}", schema, table, name)
            }
            _ => format!("{}.{}", schema, name),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.noun())
    }
}

/// スキーマ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub schema_name: String,
    pub schema_owner: String,
}

impl Schema {
    pub fn new(schema_name: impl Into<String>, schema_owner: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_owner: schema_owner.into(),
        }
    }
}

impl CatalogObject for Schema {
    const KIND: ObjectKind = ObjectKind::Schema;

    fn key(&self) -> String {
        self.schema_name.clone()
    }

    fn local_name(&self) -> String {
        self.schema_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.schema_name
    }
}

/// テーブル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub table_schema: String,
    pub table_name: String,
    pub table_type: String,
    /// 取得時点の行数（`COUNT(*)`）
    pub row_count: Option<i64>,
}

impl Table {
    pub fn new(table_schema: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            table_schema: table_schema.into(),
            table_name: table_name.into(),
            table_type: "BASE TABLE".to_string(),
            row_count: None,
        }
    }

    pub fn with_row_count(mut self, row_count: i64) -> Self {
        self.row_count = Some(row_count);
        self
    }
}

impl CatalogObject for Table {
    const KIND: ObjectKind = ObjectKind::Table;

    fn key(&self) -> String {
        format!("{}.{}", self.table_schema, self.table_name)
    }

    fn local_name(&self) -> String {
        self.table_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.table_schema
    }
}

/// カラム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub column_default: Option<String>,
    pub is_nullable: bool,
    pub data_type: String,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

impl Column {
    pub fn new(
        table_schema: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            table_schema: table_schema.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
            column_default: None,
            is_nullable,
            data_type: data_type.into(),
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
        }
    }
}

impl CatalogObject for Column {
    const KIND: ObjectKind = ObjectKind::Column;

    fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.table_schema, self.table_name, self.column_name
        )
    }

    fn local_name(&self) -> String {
        self.column_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.table_schema
    }

    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }
}

/// インデックス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub schema_name: String,
    pub table_name: String,
    pub index_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    /// `pg_get_indexdef()` の出力
    pub index_definition: String,
}

impl CatalogObject for Index {
    const KIND: ObjectKind = ObjectKind::Index;

    // インデックス名はスキーマ内で一意
    fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.index_name)
    }

    fn local_name(&self) -> String {
        self.index_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.schema_name
    }

    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }
}

/// 制約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub constraint_schema: String,
    pub constraint_name: String,
    pub table_schema: String,
    pub table_name: String,
    /// PRIMARY KEY / FOREIGN KEY / UNIQUE / CHECK
    pub constraint_type: String,
    /// `pg_get_constraintdef()` の出力
    pub constraint_definition: Option<String>,
}

impl CatalogObject for Constraint {
    const KIND: ObjectKind = ObjectKind::Constraint;

    fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.table_schema, self.table_name, self.constraint_name
        )
    }

    fn local_name(&self) -> String {
        self.constraint_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.table_schema
    }

    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }
}

/// トリガー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub trigger_schema: String,
    pub trigger_name: String,
    pub event_manipulation: String,
    pub event_object_schema: String,
    pub event_object_table: String,
    pub action_timing: String,
    pub action_orientation: String,
    pub action_statement: String,
}

impl CatalogObject for Trigger {
    const KIND: ObjectKind = ObjectKind::Trigger;

    fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.trigger_schema, self.event_object_table, self.trigger_name
        )
    }

    fn local_name(&self) -> String {
        self.trigger_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.event_object_schema
    }

    fn table_name(&self) -> Option<&str> {
        Some(&self.event_object_table)
    }
}

/// ビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub table_schema: String,
    pub table_name: String,
    pub view_definition: Option<String>,
    /// information_schema 由来の YES / NO
    pub is_updatable: String,
    pub is_insertable_into: String,
}

impl CatalogObject for View {
    const KIND: ObjectKind = ObjectKind::View;

    fn key(&self) -> String {
        format!("{}.{}", self.table_schema, self.table_name)
    }

    fn local_name(&self) -> String {
        self.table_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.table_schema
    }
}

/// マテリアライズドビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub schema_name: String,
    pub matview_name: String,
    pub definition: String,
    pub has_indexes: bool,
    pub is_populated: bool,
}

impl CatalogObject for MaterializedView {
    const KIND: ObjectKind = ObjectKind::MaterializedView;

    fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.matview_name)
    }

    fn local_name(&self) -> String {
        self.matview_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.schema_name
    }
}

/// 関数・プロシージャ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub schema_name: String,
    pub function_name: String,
    /// function / procedure
    pub function_type: String,
    /// `pg_get_function_arguments()` の出力（オーバーロード識別に使用）
    pub argument_types: String,
    pub return_type: Option<String>,
    pub function_definition: Option<String>,
    pub language: String,
    pub is_strict: bool,
    /// immutable / stable / volatile
    pub volatility: String,
}

impl CatalogObject for Function {
    const KIND: ObjectKind = ObjectKind::Function;

    fn key(&self) -> String {
        format!(
            "{}.{}({})",
            self.schema_name, self.function_name, self.argument_types
        )
    }

    fn local_name(&self) -> String {
        format!("{}({})", self.function_name, self.argument_types)
    }

    fn schema_name(&self) -> &str {
        &self.schema_name
    }
}

/// シーケンス（サマリーの件数比較のみに使用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub sequence_schema: String,
    pub sequence_name: String,
    pub data_type: String,
    pub start_value: i64,
    pub minimum_value: i64,
    pub maximum_value: i64,
    pub increment: i64,
    pub cycle_option: String,
}

impl CatalogObject for Sequence {
    const KIND: ObjectKind = ObjectKind::Sequence;

    fn key(&self) -> String {
        format!("{}.{}", self.sequence_schema, self.sequence_name)
    }

    fn local_name(&self) -> String {
        self.sequence_name.clone()
    }

    fn schema_name(&self) -> &str {
        &self.sequence_schema
    }
}
