// Services Layer
// 比較エンジン（正規化、突き合わせ、解析、集計）と設定読み込み

pub mod config_loader;
pub mod definition_normalizer;
pub mod key_set_reconciler;
pub mod result_aggregator;
pub mod row_count_comparator;
pub mod schema_analyzer;
