//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（標準入力・モデル置き場・割り込み・表示・推論エンジン）を使うための trait

pub mod inbound;
pub mod outbound;
