// インデックスの差分検出

use crate::core::analysis::ComparableObject;
use crate::core::catalog::Index;
use crate::services::definition_normalizer::definitions_differ;

use super::{display_flag, push_change};

impl ComparableObject for Index {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "unique",
            display_flag(right.is_unique),
            display_flag(left.is_unique),
        );
        push_change(
            &mut mods,
            "primary",
            display_flag(right.is_primary),
            display_flag(left.is_primary),
        );
        if definitions_differ(
            Some(left.index_definition.as_str()),
            Some(right.index_definition.as_str()),
        ) {
            mods.push("definition changed".to_string());
        }
        mods
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("recreate index {}", full_name),
            format!("  old: {}", right.index_definition),
            format!("  new: {}", left.index_definition),
        ]
        .join("\n")
    }
}
