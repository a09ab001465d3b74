// Core Domain
// カタログモデル、スナップショット、差分解析ツリーの純粋なドメインモデル

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod snapshot;
