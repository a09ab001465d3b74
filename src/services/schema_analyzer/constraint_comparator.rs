// 制約の差分検出
//
// 定義は正規化後のテキストで比較し、表示には元のテキストを使います。

use crate::core::analysis::ComparableObject;
use crate::core::catalog::Constraint;
use crate::services::definition_normalizer::definitions_differ;

use super::{display_opt, push_change};

impl ComparableObject for Constraint {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "type",
            right.constraint_type.clone(),
            left.constraint_type.clone(),
        );
        if definitions_differ(
            left.constraint_definition.as_deref(),
            right.constraint_definition.as_deref(),
        ) {
            mods.push("definition changed".to_string());
        }
        mods
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("replace constraint {}", full_name),
            format!(
                "  old: {}",
                display_opt(right.constraint_definition.as_deref())
            ),
            format!("  new: {}", display_opt(left.constraint_definition.as_deref())),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(definition: &str) -> Constraint {
        Constraint {
            constraint_schema: "public".to_string(),
            constraint_name: "users_age_check".to_string(),
            table_schema: "public".to_string(),
            table_name: "users".to_string(),
            constraint_type: "CHECK".to_string(),
            constraint_definition: Some(definition.to_string()),
        }
    }

    #[test]
    fn test_redundant_cast_is_not_a_change() {
        let left = check("CHECK ((age)::integer >= 0)");
        let right = check("CHECK ((age >= 0))");
        assert!(Constraint::modifications(&left, &right).is_empty());
    }

    #[test]
    fn test_definition_change() {
        let left = check("CHECK ((age >= 18))");
        let right = check("CHECK ((age >= 0))");
        assert_eq!(
            Constraint::modifications(&left, &right),
            vec!["definition changed"]
        );
    }

    #[test]
    fn test_type_change_precedes_definition() {
        let left = check("CHECK ((email IS NOT NULL))");
        let mut right = check("UNIQUE (email)");
        right.constraint_type = "UNIQUE".to_string();

        assert_eq!(
            Constraint::modifications(&left, &right),
            vec!["type: UNIQUE -> CHECK", "definition changed"]
        );
    }

    #[test]
    fn test_modification_detail() {
        let left = check("CHECK ((age >= 18))");
        let right = check("CHECK ((age >= 0))");
        let mods = Constraint::modifications(&left, &right);

        assert_eq!(
            Constraint::modification_detail(&left, &right, "public.users.users_age_check", &mods),
            "replace constraint public.users.users_age_check\n  old: CHECK ((age >= 0))\n  new: CHECK ((age >= 18))"
        );
    }
}
