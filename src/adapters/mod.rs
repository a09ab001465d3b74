// Adapters
// データベースとファイルシステムへのアクセスを抽象化

pub mod catalog_introspector;
pub mod database;
pub mod snapshot_store;
pub mod sql_quote;
