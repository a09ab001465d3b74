// カラムレベルの差分検出

use crate::core::analysis::ComparableObject;
use crate::core::catalog::Column;

use super::{display_opt, push_change};

impl ComparableObject for Column {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "type",
            right.data_type.clone(),
            left.data_type.clone(),
        );
        push_change(
            &mut mods,
            "max_length",
            display_opt(right.character_maximum_length),
            display_opt(left.character_maximum_length),
        );
        push_change(
            &mut mods,
            "precision",
            display_opt(right.numeric_precision),
            display_opt(left.numeric_precision),
        );
        push_change(
            &mut mods,
            "scale",
            display_opt(right.numeric_scale),
            display_opt(left.numeric_scale),
        );
        push_change(
            &mut mods,
            "nullable",
            nullability(right).to_string(),
            nullability(left).to_string(),
        );
        push_change(
            &mut mods,
            "default",
            display_opt(right.column_default.as_deref()),
            display_opt(left.column_default.as_deref()),
        );
        mods
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("alter column {}", full_name),
            format!("  old: {}", column_spec(right)),
            format!("  new: {}", column_spec(left)),
        ]
        .join("\n")
    }
}

fn nullability(column: &Column) -> &'static str {
    if column.is_nullable {
        "null"
    } else {
        "not null"
    }
}

/// カラム定義の表示（例: `character varying(255) not null default 'x'`）
fn column_spec(column: &Column) -> String {
    let mut spec = column.data_type.clone();

    match (
        column.character_maximum_length.filter(|len| *len != 0),
        column.numeric_precision.filter(|p| *p != 0),
        column.numeric_scale.filter(|s| *s != 0),
    ) {
        (Some(length), _, _) => spec.push_str(&format!("({})", length)),
        (None, Some(precision), Some(scale)) => {
            spec.push_str(&format!("({},{})", precision, scale))
        }
        (None, Some(precision), None) => spec.push_str(&format!("({})", precision)),
        _ => {}
    }

    spec.push(' ');
    spec.push_str(nullability(column));

    if let Some(default) = column.column_default.as_deref().filter(|d| !d.is_empty()) {
        spec.push_str(" default ");
        spec.push_str(default);
    }
    spec
}
