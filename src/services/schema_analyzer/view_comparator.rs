// ビュー・マテリアライズドビューの差分検出

use crate::core::analysis::ComparableObject;
use crate::core::catalog::{MaterializedView, View};
use crate::services::definition_normalizer::definitions_differ;

use super::{display_opt, push_change};

impl ComparableObject for View {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "updatable",
            right.is_updatable.clone(),
            left.is_updatable.clone(),
        );
        push_change(
            &mut mods,
            "insertable",
            right.is_insertable_into.clone(),
            left.is_insertable_into.clone(),
        );
        if definitions_differ(
            left.view_definition.as_deref(),
            right.view_definition.as_deref(),
        ) {
            mods.push("definition changed".to_string());
        }
        mods
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("replace view {}", full_name),
            format!("  old: {}", display_opt(right.view_definition.as_deref())),
            format!("  new: {}", display_opt(left.view_definition.as_deref())),
        ]
        .join("\n")
    }
}

// マテビューは更新可否の属性を持たないため定義のみ比較する
impl ComparableObject for MaterializedView {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        if definitions_differ(Some(left.definition.as_str()), Some(right.definition.as_str())) {
            vec!["definition changed".to_string()]
        } else {
            Vec::new()
        }
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("replace materialized view {}", full_name),
            format!("  old: {}", right.definition),
            format!("  new: {}", left.definition),
        ]
        .join("\n")
    }
}
