// キー集合の突き合わせ
//
// 左右のコレクションの合成キーの和集合を辞書順に列挙し、
// 各キーがどちら側に存在するかを分類します。

use std::collections::BTreeMap;

/// キーごとの所属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPresence<'a, T> {
    pub key: &'a str,
    pub left: Option<&'a T>,
    pub right: Option<&'a T>,
}

impl<T> KeyPresence<'_, T> {
    pub fn in_left(&self) -> bool {
        self.left.is_some()
    }

    pub fn in_right(&self) -> bool {
        self.right.is_some()
    }

    /// 両側に存在するかどうか（子オブジェクトの解析対象になる）
    pub fn in_both(&self) -> bool {
        self.in_left() && self.in_right()
    }
}

/// 左右のコレクションを突き合わせる
///
/// 親スコープでの絞り込みは呼び出し側で済ませたイテレータを渡します。
/// 結果はキーの辞書順で、少なくとも片側に存在するキーのみを含みます。
///
/// # Arguments
///
/// * `left` - 左側（あるべき姿）の `(キー, オブジェクト)`
/// * `right` - 右側（現状）の `(キー, オブジェクト)`
pub fn reconcile<'a, T, L, R>(left: L, right: R) -> Vec<KeyPresence<'a, T>>
where
    L: IntoIterator<Item = (&'a String, &'a T)>,
    R: IntoIterator<Item = (&'a String, &'a T)>,
{
    let mut merged: BTreeMap<&'a str, KeyPresence<'a, T>> = BTreeMap::new();

    for (key, object) in left {
        merged
            .entry(key.as_str())
            .or_insert_with(|| KeyPresence {
                key: key.as_str(),
                left: None,
                right: None,
            })
            .left = Some(object);
    }

    for (key, object) in right {
        merged
            .entry(key.as_str())
            .or_insert_with(|| KeyPresence {
                key: key.as_str(),
                left: None,
                right: None,
            })
            .right = Some(object);
    }

    merged.into_values().collect()
}
