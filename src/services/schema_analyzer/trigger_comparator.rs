// トリガーの差分検出

use crate::core::analysis::ComparableObject;
use crate::core::catalog::Trigger;

use super::push_change;

impl ComparableObject for Trigger {
    fn modifications(left: &Self, right: &Self) -> Vec<String> {
        let mut mods = Vec::new();
        push_change(
            &mut mods,
            "event",
            right.event_manipulation.clone(),
            left.event_manipulation.clone(),
        );
        push_change(
            &mut mods,
            "timing",
            right.action_timing.clone(),
            left.action_timing.clone(),
        );
        push_change(
            &mut mods,
            "orientation",
            right.action_orientation.clone(),
            left.action_orientation.clone(),
        );
        // 実行文は正規化せずそのまま比較する
        if left.action_statement != right.action_statement {
            mods.push("statement changed".to_string());
        }
        mods
    }

    fn modification_detail(left: &Self, right: &Self, full_name: &str, _mods: &[String]) -> String {
        [
            format!("replace trigger {}", full_name),
            format!("  old: {}", signature(right)),
            format!("  new: {}", signature(left)),
        ]
        .join("\n")
    }
}

/// `AFTER INSERT ROW` 形式
fn signature(trigger: &Trigger) -> String {
    format!(
        "{} {} {}",
        trigger.action_timing, trigger.event_manipulation, trigger.action_orientation
    )
}
