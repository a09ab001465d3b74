// pgcmpライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインモデル（カタログオブジェクト、スナップショット、解析ノード）
// - services: 照合・差分解析・集計などのビジネスロジック
// - adapters: データベースとファイルシステムへのアクセスを抽象化

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
