//! lchat 共通ライブラリ
//!
//! エラー型・メッセージ型・設定・推論エンジン、および Ports & Adapters の共通部分を提供します。

/// エラーハンドリング
pub mod error;

/// 会話メッセージ（role + content）
pub mod msg;

/// 表示側へ流すイベントと EventSink
pub mod sink;

/// config.json の設定型
pub mod config;

/// 推論エンジン（llama.cpp / llama.cpp server / echo）
pub mod llm;

/// ドメイン型（Newtype）
pub mod domain;

/// Outbound ポート
pub mod ports;

/// Outbound ポートの標準実装
pub mod adapter;
