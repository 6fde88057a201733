//! イベント Sink を生成する Outbound ポート
//!
//! ターンごとに新しい Sink 列を取得するために使用する。

use common::sink::EventSink;

/// イベント Sink の列を生成する（呼び出しごとに新しいインスタンスを返してよい）
pub trait EventSinkFactory {
    fn create_sinks(&self, show_stats: bool) -> Vec<Box<dyn EventSink>>;
}
