// 関数・プロシージャの差分検出

use crate::core::analysis::ComparableObject;
use crate::core::catalog::Function;

use super::{display_flag, display_opt, push_change};

impl ComparableObject for Function {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "return_type",
            display_opt(right.return_type.as_deref()),
            display_opt(left.return_type.as_deref()),
        );
        push_change(
            &mut mods,
            "language",
            right.language.clone(),
            left.language.clone(),
        );
        push_change(
            &mut mods,
            "strict",
            display_flag(right.is_strict),
            display_flag(left.is_strict),
        );
        push_change(
            &mut mods,
            "volatility",
            right.volatility.clone(),
            left.volatility.clone(),
        );
        if left.function_definition != right.function_definition {
            mods.push("body changed".to_string());
        }
        mods
    }

    // 本文は長くなるため変更内容の一覧を表示する
    fn modification_detail(_left: &Self, _right: &Self, full_name: &str, mods: &[String]) -> String {
        std::iter::once(format!("replace function {}", full_name))
            .chain(mods.iter().map(|m| format!("  {}", m)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
