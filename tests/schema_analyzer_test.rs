/// スキーマ解析エンジンのテスト
///
/// スナップショット同士の照合・差分分類・上位ノードへの伝播・差分件数の集計を
/// ライブラリAPI経由で検証します。

#[cfg(test)]
mod schema_analyzer_tests {
    use pgcmp::core::analysis::{Action, AnalysisRow};
    use pgcmp::core::catalog::{Column, Constraint, ObjectKind, Schema, Table, Trigger};
    use pgcmp::core::snapshot::DatabaseSnapshot;
    use pgcmp::services::definition_normalizer::normalize_definition;
    use pgcmp::services::key_set_reconciler::reconcile;
    use pgcmp::services::schema_analyzer::SchemaAnalyzer;
    use std::collections::BTreeMap;

    /// public スキーマに users / orders テーブルを持つスナップショット
    fn base_snapshot(source: &str) -> DatabaseSnapshot {
        let mut snapshot = DatabaseSnapshot::new(source, "PostgreSQL 16.1");
        snapshot.add_schema(Schema::new("public", "postgres"));
        snapshot.add_table(Table::new("public", "users"));
        snapshot.add_table(Table::new("public", "orders"));
        snapshot.add_column(Column::new("public", "users", "id", "integer", false));
        snapshot.add_column(Column::new("public", "users", "name", "text", true));
        snapshot.add_column(Column::new("public", "orders", "id", "integer", false));
        snapshot
    }

    fn check_constraint(definition: &str) -> Constraint {
        Constraint {
            constraint_schema: "public".to_string(),
            constraint_name: "users_age_check".to_string(),
            table_schema: "public".to_string(),
            table_name: "users".to_string(),
            constraint_type: "CHECK".to_string(),
            constraint_definition: Some(definition.to_string()),
        }
    }

    fn audit_trigger(statement: &str) -> Trigger {
        Trigger {
            trigger_schema: "public".to_string(),
            trigger_name: "users_audit".to_string(),
            event_manipulation: "UPDATE".to_string(),
            event_object_schema: "public".to_string(),
            event_object_table: "users".to_string(),
            action_timing: "AFTER".to_string(),
            action_orientation: "ROW".to_string(),
            action_statement: statement.to_string(),
        }
    }

    /// 同一のスナップショットでは差分がないことを確認
    #[test]
    fn test_identical_snapshots_have_no_differences() {
        let left = base_snapshot("left");
        let right = base_snapshot("right");

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        assert!(!result.has_differences());
        assert_eq!(result.count_differences(), 0);
        assert!(result.summary.iter().all(|row| !row.is_different()));
        assert!(result.version_warning().is_none());
    }

    /// 1カラムの型変更がテーブル・スキーマに伝播し、兄弟ノードには伝播しないことを確認
    #[test]
    fn test_column_change_propagates_to_ancestors_only() {
        let left = base_snapshot("left");
        let mut right = base_snapshot("right");
        right.add_column(Column::new("public", "users", "name", "varchar", true));

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let schema = &result.schemas[0];
        assert!(schema.is_different());
        assert_eq!(schema.action(), Action::None);

        let users = schema.tables.iter().find(|t| t.name == "users").unwrap();
        let orders = schema.tables.iter().find(|t| t.name == "orders").unwrap();
        assert!(users.is_different());
        assert!(!orders.is_different());
        assert!(orders.columns.iter().all(|c| !c.is_different()));

        let id = users.columns.iter().find(|c| c.name == "id").unwrap();
        let name = users.columns.iter().find(|c| c.name == "name").unwrap();
        assert!(!id.is_different());
        assert_eq!(name.action(), Action::Modify);
        assert_eq!(name.get_modifications(), vec!["type: varchar -> text"]);

        assert_eq!(result.count_differences(), 1);
    }

    /// 片側にしか存在しないテーブルは子ノードを展開しないことを確認
    #[test]
    fn test_one_sided_table_is_not_expanded() {
        let mut left = base_snapshot("left");
        let right = base_snapshot("right");
        left.add_table(Table::new("public", "invoices"));
        left.add_column(Column::new("public", "invoices", "id", "integer", false));
        left.add_trigger(Trigger {
            event_object_table: "invoices".to_string(),
            ..audit_trigger("EXECUTE FUNCTION audit()")
        });

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let invoices = result.schemas[0]
            .tables
            .iter()
            .find(|t| t.name == "invoices")
            .unwrap();
        assert_eq!(invoices.action(), Action::Add);
        assert_eq!(invoices.action_description(), "create table public.invoices");
        assert_eq!(invoices.child_count(), 0);
        assert_eq!(result.count_differences(), 1);
    }

    /// キャストの違いのみのCHECK制約は差分なしと判定されることを確認
    #[test]
    fn test_cast_only_constraint_difference_is_ignored() {
        let mut left = base_snapshot("left");
        let mut right = base_snapshot("right");
        left.add_constraint(check_constraint("CHECK ((age >= 0))"));
        right.add_constraint(check_constraint("CHECK ((age)::integer >= 0)"));

        assert_eq!(
            normalize_definition(Some("CHECK ((age >= 0))")).as_deref(),
            Some("CHECK age 0")
        );
        assert_eq!(
            normalize_definition(Some("CHECK ((age)::integer >= 0)")).as_deref(),
            Some("CHECK age 0")
        );

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let constraints = result.rows_of(ObjectKind::Constraint);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].action(), Action::None);
        assert!(!result.has_differences());
    }

    /// 左側のみのスキーマが1件の差分として数えられることを確認
    #[test]
    fn test_left_only_schema_counts_once() {
        let mut left = base_snapshot("left");
        let right = base_snapshot("right");
        left.add_schema(Schema::new("audit", "postgres"));
        left.add_table(Table::new("audit", "events"));

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let names: Vec<&str> = result.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["audit", "public"]);

        let audit = &result.schemas[0];
        assert_eq!(audit.action(), Action::Add);
        assert_eq!(audit.action_description(), "create schema audit");
        assert!(audit.tables.is_empty());
        assert_eq!(result.schemas[1].action(), Action::None);
        assert!(!result.schemas[1].is_different());

        assert_eq!(result.count_differences(), 1);

        let schema_summary = result
            .summary
            .iter()
            .find(|row| row.object_type == "Schemas")
            .unwrap();
        assert_eq!((schema_summary.left_count, schema_summary.right_count), (2, 1));
    }

    /// トリガーの実行文のみが異なる場合の変更内容を確認
    #[test]
    fn test_trigger_statement_change() {
        let mut left = base_snapshot("left");
        let mut right = base_snapshot("right");
        left.add_trigger(audit_trigger("EXECUTE FUNCTION audit_v2()"));
        right.add_trigger(audit_trigger("EXECUTE FUNCTION audit_v1()"));

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let triggers = result.rows_of(ObjectKind::Trigger);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].get_modifications(), vec!["statement changed"]);
        assert_eq!(triggers[0].action(), Action::Modify);
        assert_eq!(
            triggers[0].action_description(),
            "replace trigger public.users.users_audit"
        );
        assert!(triggers[0]
            .modification_detail()
            .starts_with("replace trigger public.users.users_audit"));
    }

    /// 実行文の記号だけが異なる場合も差分として扱われることを確認
    #[test]
    fn test_trigger_statement_symbol_change_is_detected() {
        let mut left = base_snapshot("left");
        let mut right = base_snapshot("right");
        left.add_trigger(audit_trigger("EXECUTE FUNCTION log('a-b')"));
        right.add_trigger(audit_trigger("EXECUTE FUNCTION log('a_b')"));

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let triggers = result.rows_of(ObjectKind::Trigger);
        assert_eq!(triggers[0].get_modifications(), vec!["statement changed"]);
        assert!(result.has_differences());
        assert_eq!(result.count_differences(), 1);
    }

    /// 右側のみのカラムは削除として分類されることを確認
    #[test]
    fn test_right_only_column_is_removed() {
        let left = base_snapshot("left");
        let mut right = base_snapshot("right");
        right.add_column(Column::new("public", "users", "legacy", "text", true));

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        let columns = result.rows_of(ObjectKind::Column);
        let legacy = columns.iter().find(|c| c.name() == "legacy").unwrap();
        assert_eq!(legacy.action(), Action::Remove);
        assert_eq!(legacy.action_description(), "drop column public.users.legacy");
        assert!(!legacy.is_modified());
    }

    /// キー照合が入力順に依存せず辞書順で出力されることを確認
    #[test]
    fn test_reconcile_is_order_invariant() {
        let left = BTreeMap::from([("B".to_string(), 2), ("A".to_string(), 1)]);
        let right: Vec<(String, i32)> = vec![("B".to_string(), 2), ("A".to_string(), 1)];

        let presences = reconcile(left.iter(), right.iter().map(|(k, v)| (k, v)));

        let keys: Vec<&str> = presences.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert!(presences.iter().all(|p| p.in_both()));
    }

    /// 正規化が冪等であることを確認
    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "CHECK ((status)::text = ANY ((ARRAY['a'::character varying, 'b'::character varying])::text[]))",
            "  SELECT id,\n\tname FROM users  ",
            "",
            "::bigint",
        ];
        for input in inputs {
            let once = normalize_definition(Some(input));
            let twice = normalize_definition(once.as_deref());
            assert_eq!(once, twice, "input: {:?}", input);
        }
        assert_eq!(normalize_definition(None), None);
    }

    /// メジャーバージョンが異なる場合に警告が出ることを確認
    #[test]
    fn test_version_warning() {
        let left = base_snapshot("left");
        let mut right = base_snapshot("right");
        right.server_version = "PostgreSQL 15.4 on x86_64-pc-linux-gnu".to_string();

        let result = SchemaAnalyzer::default().analyze(&left, &right);

        assert_eq!(
            result.version_warning().as_deref(),
            Some("Warning: PostgreSQL versions differ (left: 16.1, right: 15.4). Some differences may be due to version-specific output formatting.")
        );
        assert!(!result.has_differences());
    }
}
