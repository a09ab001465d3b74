// SQL識別子クォートユーティリティ
//
// 行数取得クエリでスキーマ名・テーブル名を安全に埋め込むために使用します。

/// PostgreSQL用識別子クォート（ダブルクォート）
///
/// 識別子内のダブルクォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use pgcmp::adapters::sql_quote::quote_identifier;
/// assert_eq!(quote_identifier("users"), r#""users""#);
/// assert_eq!(quote_identifier(r#"table"name"#), r#""table""name""#);
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// スキーマ修飾付きのテーブル名（`"schema"."table"`）
pub fn quote_qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}
