// カタログイントロスペクター
//
// PostgreSQLのシステムカタログと information_schema からオブジェクト定義を取得し、
// DatabaseSnapshot を構築します。取得はすべて1つのトランザクション内で行い、
// 最後に必ずロールバックします（SQL適用時も変更は永続化されない）。
//
// information_schema のドメイン型（sql_identifier 等）は text / int4 にキャストして取得します。

use crate::adapters::sql_quote::quote_qualified;
use crate::core::catalog::{
    Column, Constraint, Function, Index, MaterializedView, Schema, Sequence, Table, Trigger, View,
};
use crate::core::error::DatabaseError;
use crate::core::snapshot::{redact_connection_string, DatabaseSnapshot};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// システムスキーマの除外条件（`{col}` を対象カラムに置換して使用）
const SYSTEM_SCHEMA_FILTER: &str = "{col} NOT IN ('pg_catalog', 'information_schema', 'pg_toast') \
     AND {col} NOT LIKE 'pg_temp_%' \
     AND {col} NOT LIKE 'pg_toast_temp_%'";

fn exclude_system_schemas(column: &str) -> String {
    SYSTEM_SCHEMA_FILTER.replace("{col}", column)
}

/// カタログ取得インターフェース
#[async_trait(?Send)]
pub trait CatalogIntrospector: Send + Sync {
    /// スナップショットを取得
    ///
    /// # Arguments
    ///
    /// * `pool` - 接続プール
    /// * `source` - 取得元の接続文字列（パスワードは伏せて記録される）
    /// * `apply_sql` - 取得前に適用するSQL（トランザクションはロールバックされる）
    async fn capture(
        &self,
        pool: &PgPool,
        source: &str,
        apply_sql: Option<&str>,
    ) -> Result<DatabaseSnapshot, DatabaseError>;
}

/// PostgreSQL用イントロスペクター
#[derive(Debug, Clone, Default)]
pub struct PostgresCatalogIntrospector;

impl PostgresCatalogIntrospector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl CatalogIntrospector for PostgresCatalogIntrospector {
    async fn capture(
        &self,
        pool: &PgPool,
        source: &str,
        apply_sql: Option<&str>,
    ) -> Result<DatabaseSnapshot, DatabaseError> {
        let mut tx = pool.begin().await.map_err(|e| DatabaseError::Transaction {
            message: format!("Failed to begin transaction: {}", e),
        })?;

        // 失敗時は tx のドロップでロールバックされる
        let snapshot = capture_in_transaction(&mut *tx, source, apply_sql).await?;

        tx.rollback().await.map_err(|e| DatabaseError::Transaction {
            message: format!("Failed to roll back transaction: {}", e),
        })?;

        info!(
            source = %snapshot.source,
            version = %snapshot.major_version(),
            schemas = snapshot.schemas.len(),
            tables = snapshot.tables.len(),
            "Captured catalog snapshot"
        );

        Ok(snapshot)
    }
}

async fn capture_in_transaction(
    conn: &mut PgConnection,
    source: &str,
    apply_sql: Option<&str>,
) -> Result<DatabaseSnapshot, DatabaseError> {
    let row_counts_before = match apply_sql {
        Some(sql) => {
            let before = fetch_row_counts(conn).await?;
            debug!(tables = before.len(), "Captured row counts before applying SQL");
            sqlx::raw_sql(sql)
                .execute(&mut *conn)
                .await
                .map_err(|e| DatabaseError::Query {
                    message: format!("Failed to apply SQL: {}", e),
                    sql: None,
                })?;
            before
        }
        None => BTreeMap::new(),
    };

    let version = fetch_version(conn).await?;
    let mut snapshot = DatabaseSnapshot::new(redact_connection_string(source), version);
    snapshot.row_counts_before = row_counts_before;

    for schema in fetch_schemas(conn).await? {
        snapshot.add_schema(schema);
    }
    for table in fetch_tables(conn).await? {
        snapshot.add_table(table);
    }
    for column in fetch_columns(conn).await? {
        snapshot.add_column(column);
    }
    for index in fetch_indexes(conn).await? {
        snapshot.add_index(index);
    }
    for constraint in fetch_constraints(conn).await? {
        snapshot.add_constraint(constraint);
    }
    for view in fetch_views(conn).await? {
        snapshot.add_view(view);
    }
    for trigger in fetch_triggers(conn).await? {
        snapshot.add_trigger(trigger);
    }
    for function in fetch_functions(conn).await? {
        snapshot.add_function(function);
    }
    for matview in fetch_materialized_views(conn).await? {
        snapshot.add_materialized_view(matview);
    }
    for sequence in fetch_sequences(conn).await? {
        snapshot.add_sequence(sequence);
    }

    debug!(summary = %snapshot.summary(), "Catalog fetched");
    Ok(snapshot)
}

async fn fetch_version(conn: &mut PgConnection) -> Result<String, DatabaseError> {
    let sql = "SELECT version()";
    sqlx::query_scalar::<_, String>(sql)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch server version", sql, e))
}

async fn fetch_schemas(conn: &mut PgConnection) -> Result<Vec<Schema>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT schema_name::text, schema_owner::text
        FROM information_schema.schemata
        WHERE {}
        ORDER BY schema_name
        "#,
        exclude_system_schemas("schema_name")
    );

    let rows = sqlx::query_as::<_, (String, String)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch schemas", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(|(schema_name, schema_owner)| Schema {
            schema_name,
            schema_owner,
        })
        .collect())
}

/// ベーステーブルの一覧（スキーマ名, テーブル名, 種別）
async fn fetch_base_tables(
    conn: &mut PgConnection,
) -> Result<Vec<(String, String, String)>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT table_schema::text, table_name::text, table_type::text
        FROM information_schema.tables
        WHERE {}
          AND table_type = 'BASE TABLE'
        ORDER BY table_schema, table_name
        "#,
        exclude_system_schemas("table_schema")
    );

    sqlx::query_as::<_, (String, String, String)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch tables", &sql, e))
}

async fn count_rows(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_qualified(schema, table));
    sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to count rows", &sql, e))
}

async fn fetch_tables(conn: &mut PgConnection) -> Result<Vec<Table>, DatabaseError> {
    let mut tables = Vec::new();
    for (table_schema, table_name, table_type) in fetch_base_tables(conn).await? {
        let row_count = count_rows(conn, &table_schema, &table_name).await?;
        tables.push(Table {
            table_schema,
            table_name,
            table_type,
            row_count: Some(row_count),
        });
    }
    Ok(tables)
}

/// テーブルごとの行数（`schema.table` -> 件数）
async fn fetch_row_counts(
    conn: &mut PgConnection,
) -> Result<BTreeMap<String, i64>, DatabaseError> {
    let mut counts = BTreeMap::new();
    for (schema, table, _) in fetch_base_tables(conn).await? {
        let count = count_rows(conn, &schema, &table).await?;
        counts.insert(format!("{}.{}", schema, table), count);
    }
    Ok(counts)
}

type ColumnRow = (
    String,
    String,
    String,
    Option<String>,
    bool,
    String,
    Option<i32>,
    Option<i32>,
    Option<i32>,
);

async fn fetch_columns(conn: &mut PgConnection) -> Result<Vec<Column>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            table_schema::text,
            table_name::text,
            column_name::text,
            column_default::text,
            (is_nullable = 'YES') AS is_nullable,
            data_type::text,
            character_maximum_length::int4,
            numeric_precision::int4,
            numeric_scale::int4
        FROM information_schema.columns
        WHERE {}
        ORDER BY table_schema, table_name, column_name
        "#,
        exclude_system_schemas("table_schema")
    );

    let rows = sqlx::query_as::<_, ColumnRow>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch columns", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(
                table_schema,
                table_name,
                column_name,
                column_default,
                is_nullable,
                data_type,
                character_maximum_length,
                numeric_precision,
                numeric_scale,
            )| Column {
                table_schema,
                table_name,
                column_name,
                column_default,
                is_nullable,
                data_type,
                character_maximum_length,
                numeric_precision,
                numeric_scale,
            },
        )
        .collect())
}

async fn fetch_indexes(conn: &mut PgConnection) -> Result<Vec<Index>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            n.nspname::text AS schema_name,
            t.relname::text AS table_name,
            i.relname::text AS index_name,
            ix.indisunique AS is_unique,
            ix.indisprimary AS is_primary,
            pg_get_indexdef(ix.indexrelid) AS index_definition
        FROM pg_index ix
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE {}
        ORDER BY n.nspname, t.relname, i.relname
        "#,
        exclude_system_schemas("n.nspname")
    );

    let rows = sqlx::query_as::<_, (String, String, String, bool, bool, String)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch indexes", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(schema_name, table_name, index_name, is_unique, is_primary, index_definition)| {
                Index {
                    schema_name,
                    table_name,
                    index_name,
                    is_unique,
                    is_primary,
                    index_definition,
                }
            },
        )
        .collect())
}

// check_clause は正規化されていないため pg_get_constraintdef() を使う
async fn fetch_constraints(conn: &mut PgConnection) -> Result<Vec<Constraint>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            tc.constraint_schema::text,
            tc.constraint_name::text,
            tc.table_schema::text,
            tc.table_name::text,
            tc.constraint_type::text,
            pg_get_constraintdef(c.oid) AS constraint_definition
        FROM information_schema.table_constraints tc
        JOIN pg_namespace tn ON tn.nspname = tc.table_schema
        JOIN pg_class t ON t.relnamespace = tn.oid AND t.relname = tc.table_name
        LEFT JOIN pg_namespace cn ON cn.nspname = tc.constraint_schema
        LEFT JOIN pg_constraint c
          ON c.connamespace = cn.oid
         AND c.conname = tc.constraint_name
         AND c.conrelid = t.oid
        WHERE {}
        ORDER BY tc.constraint_schema, tc.table_name, tc.constraint_name
        "#,
        exclude_system_schemas("tc.constraint_schema")
    );

    let rows = sqlx::query_as::<_, (String, String, String, String, String, Option<String>)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch constraints", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(
                constraint_schema,
                constraint_name,
                table_schema,
                table_name,
                constraint_type,
                constraint_definition,
            )| Constraint {
                constraint_schema,
                constraint_name,
                table_schema,
                table_name,
                constraint_type,
                constraint_definition,
            },
        )
        .collect())
}

async fn fetch_views(conn: &mut PgConnection) -> Result<Vec<View>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            table_schema::text,
            table_name::text,
            view_definition::text,
            is_updatable::text,
            is_insertable_into::text
        FROM information_schema.views
        WHERE {}
        ORDER BY table_schema, table_name
        "#,
        exclude_system_schemas("table_schema")
    );

    let rows = sqlx::query_as::<_, (String, String, Option<String>, String, String)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch views", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(table_schema, table_name, view_definition, is_updatable, is_insertable_into)| View {
                table_schema,
                table_name,
                view_definition,
                is_updatable,
                is_insertable_into,
            },
        )
        .collect())
}

type TriggerRow = (String, String, String, String, String, String, String, String);

async fn fetch_triggers(conn: &mut PgConnection) -> Result<Vec<Trigger>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            trigger_schema::text,
            trigger_name::text,
            event_manipulation::text,
            event_object_schema::text,
            event_object_table::text,
            action_timing::text,
            action_orientation::text,
            action_statement::text
        FROM information_schema.triggers
        WHERE {}
        ORDER BY trigger_schema, event_object_table, trigger_name
        "#,
        exclude_system_schemas("trigger_schema")
    );

    let rows = sqlx::query_as::<_, TriggerRow>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch triggers", &sql, e))?;

    // 複数イベントのトリガーはイベントごとに行が返るが、キーが同じため後勝ちになる
    Ok(rows
        .into_iter()
        .map(
            |(
                trigger_schema,
                trigger_name,
                event_manipulation,
                event_object_schema,
                event_object_table,
                action_timing,
                action_orientation,
                action_statement,
            )| Trigger {
                trigger_schema,
                trigger_name,
                event_manipulation,
                event_object_schema,
                event_object_table,
                action_timing,
                action_orientation,
                action_statement,
            },
        )
        .collect())
}

type FunctionRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    bool,
    String,
);

async fn fetch_functions(conn: &mut PgConnection) -> Result<Vec<Function>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            n.nspname::text AS schema_name,
            p.proname::text AS function_name,
            CASE p.prokind WHEN 'p' THEN 'procedure' ELSE 'function' END AS function_type,
            pg_get_function_arguments(p.oid) AS argument_types,
            pg_get_function_result(p.oid) AS return_type,
            pg_get_functiondef(p.oid) AS function_definition,
            l.lanname::text AS language,
            p.proisstrict AS is_strict,
            CASE p.provolatile
                WHEN 'i' THEN 'immutable'
                WHEN 's' THEN 'stable'
                ELSE 'volatile'
            END AS volatility
        FROM pg_proc p
        JOIN pg_namespace n ON n.oid = p.pronamespace
        JOIN pg_language l ON l.oid = p.prolang
        WHERE {}
          AND p.prokind IN ('f', 'p')
        ORDER BY n.nspname, p.proname, pg_get_function_arguments(p.oid)
        "#,
        exclude_system_schemas("n.nspname")
    );

    let rows = sqlx::query_as::<_, FunctionRow>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch functions", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(
                schema_name,
                function_name,
                function_type,
                argument_types,
                return_type,
                function_definition,
                language,
                is_strict,
                volatility,
            )| Function {
                schema_name,
                function_name,
                function_type,
                argument_types,
                return_type,
                function_definition,
                language,
                is_strict,
                volatility,
            },
        )
        .collect())
}

async fn fetch_materialized_views(
    conn: &mut PgConnection,
) -> Result<Vec<MaterializedView>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            n.nspname::text AS schema_name,
            c.relname::text AS matview_name,
            pg_get_viewdef(c.oid) AS definition,
            EXISTS(SELECT 1 FROM pg_index WHERE indrelid = c.oid) AS has_indexes,
            c.relispopulated AS is_populated
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind = 'm'
          AND {}
        ORDER BY n.nspname, c.relname
        "#,
        exclude_system_schemas("n.nspname")
    );

    let rows = sqlx::query_as::<_, (String, String, Option<String>, bool, bool)>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch materialized views", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(schema_name, matview_name, definition, has_indexes, is_populated)| {
                MaterializedView {
                    schema_name,
                    matview_name,
                    definition: definition.unwrap_or_default(),
                    has_indexes,
                    is_populated,
                }
            },
        )
        .collect())
}

type SequenceRow = (String, String, String, i64, i64, i64, i64, String);

async fn fetch_sequences(conn: &mut PgConnection) -> Result<Vec<Sequence>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT
            sequence_schema::text,
            sequence_name::text,
            data_type::text,
            start_value::bigint,
            minimum_value::bigint,
            maximum_value::bigint,
            increment::bigint,
            cycle_option::text
        FROM information_schema.sequences
        WHERE {}
        ORDER BY sequence_schema, sequence_name
        "#,
        exclude_system_schemas("sequence_schema")
    );

    let rows = sqlx::query_as::<_, SequenceRow>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("Failed to fetch sequences", &sql, e))?;

    Ok(rows
        .into_iter()
        .map(
            |(
                sequence_schema,
                sequence_name,
                data_type,
                start_value,
                minimum_value,
                maximum_value,
                increment,
                cycle_option,
            )| Sequence {
                sequence_schema,
                sequence_name,
                data_type,
                start_value,
                minimum_value,
                maximum_value,
                increment,
                cycle_option,
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_system_schemas() {
        let filter = exclude_system_schemas("n.nspname");
        assert!(filter.starts_with("n.nspname NOT IN ('pg_catalog'"));
        assert!(filter.contains("n.nspname NOT LIKE 'pg_temp_%'"));
        assert!(filter.contains("n.nspname NOT LIKE 'pg_toast_temp_%'"));
        assert!(!filter.contains("{col}"));
    }
}
