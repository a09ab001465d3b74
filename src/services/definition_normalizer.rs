// 定義テキストの正規化
//
// pg_get_constraintdef() 等の出力はバージョンや経路によって
// 冗長なキャストや括弧の有無が揺れるため、比較前に正規化します。
// SQLの意味解析は行わず、テキストの変換のみを行います。

use crate::core::catalog::Constraint;
use crate::core::config::DEFAULT_NOT_NULL_CONSTRAINT_PATTERN;
use regex::Regex;
use std::sync::LazyLock;

/// 除去する型キャスト
static CAST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::(?:character varying|text|integer|bigint|smallint)(?:\[\])?")
        .expect("valid cast regex")
});

/// 英数字以外の連続
static NON_ALNUM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid separator regex"));

/// 定義テキストを比較用に正規化
///
/// 1. 既知の型キャスト（`::text`, `::integer[]` など）を除去
/// 2. ASCII英数字以外の連続を1つの空白に置換
/// 3. 前後の空白を除去
///
/// 冪等であり、`None` はそのまま `None` を返します。
///
/// # Arguments
///
/// * `definition` - 定義テキスト
///
/// # Returns
///
/// 正規化後のテキスト
pub fn normalize_definition(definition: Option<&str>) -> Option<String> {
    let definition = definition?;
    let without_casts = CAST_REGEX.replace_all(definition, "");
    let separated = NON_ALNUM_REGEX.replace_all(&without_casts, " ");
    Some(separated.trim().to_string())
}

/// 正規化後の定義が異なるかどうか
pub fn definitions_differ(left: Option<&str>, right: Option<&str>) -> bool {
    normalize_definition(left) != normalize_definition(right)
}

/// 自動生成されたNOT NULL制約の除外フィルタ
#[derive(Debug, Clone)]
pub struct NotNullConstraintFilter {
    pattern: Option<Regex>,
}

impl NotNullConstraintFilter {
    /// パターン文字列からフィルタを作成（`None` で無効）
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = pattern.map(Regex::new).transpose()?;
        Ok(Self { pattern })
    }

    /// 何も除外しないフィルタ
    pub fn disabled() -> Self {
        Self { pattern: None }
    }

    /// 除外対象の制約名かどうか
    pub fn is_excluded(&self, constraint_name: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.is_match(constraint_name))
    }

    /// 比較対象として残すかどうか
    pub fn keeps(&self, constraint: &Constraint) -> bool {
        !self.is_excluded(&constraint.constraint_name)
    }
}

impl Default for NotNullConstraintFilter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_NOT_NULL_CONSTRAINT_PATTERN).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_none() {
        assert_eq!(normalize_definition(None), None);
    }

    #[test]
    fn test_normalize_strips_casts_and_parentheses() {
        let with_cast = normalize_definition(Some("CHECK ((age)::integer >= 0)"));
        let without_cast = normalize_definition(Some("CHECK ((age >= 0))"));
        assert_eq!(with_cast.as_deref(), Some("CHECK age 0"));
        assert_eq!(with_cast, without_cast);
    }

    #[test]
    fn test_normalize_array_casts() {
        let normalized = normalize_definition(Some(
            "CHECK ((status)::text = ANY ((ARRAY['a'::character varying, 'b'::character varying])::text[]))",
        ));
        assert_eq!(normalized.as_deref(), Some("CHECK status ANY ARRAY a b"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "CHECK ((price)::bigint > 0)",
            "  FOREIGN KEY (user_id) REFERENCES users(id)  ",
            "",
            "日本語 (x)",
        ];
        for input in inputs {
            let once = normalize_definition(Some(input));
            let twice = normalize_definition(once.as_deref());
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn test_normalize_empty_string_stays_some() {
        assert_eq!(normalize_definition(Some("")), Some(String::new()));
        assert_eq!(normalize_definition(Some("(( ))")), Some(String::new()));
    }

    #[test]
    fn test_definitions_differ() {
        assert!(!definitions_differ(
            Some("CHECK ((age)::integer >= 0)"),
            Some("CHECK ((age >= 0))")
        ));
        assert!(definitions_differ(Some("CHECK (age > 0)"), Some("CHECK (age >= 1)")));
        assert!(definitions_differ(Some("x"), None));
    }

    #[test]
    fn test_not_null_filter_default_pattern() {
        let filter = NotNullConstraintFilter::default();
        assert!(filter.is_excluded("2200_16385_1_not_null"));
        assert!(filter.is_excluded("2200-16385-2_not_null"));
        assert!(!filter.is_excluded("users_email_not_null"));
        assert!(!filter.is_excluded("users_pkey"));
    }

    #[test]
    fn test_not_null_filter_custom_and_disabled() {
        let filter = NotNullConstraintFilter::new(Some("^tmp_")).unwrap();
        assert!(filter.is_excluded("tmp_check"));
        assert!(!filter.is_excluded("2200_16385_1_not_null"));

        let disabled = NotNullConstraintFilter::disabled();
        assert!(!disabled.is_excluded("2200_16385_1_not_null"));

        assert!(NotNullConstraintFilter::new(Some("([")).is_err());
    }
}
