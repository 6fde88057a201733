//! トークンのバイト列を UTF-8 文字列へ戻す
//!
//! 1 トークンが文字の途中で切れることがあるので、未完のバイトはデコーダ内に残して次のトークンへ持ち越す。

use encoding_rs::{CoderResult, Decoder};

pub struct TokenDecoder {
    decoder: Decoder,
}

impl TokenDecoder {
    pub fn new() -> Self {
        Self {
            decoder: encoding_rs::UTF_8.new_decoder(),
        }
    }

    /// 1 トークン分を読み、確定した文字列を返す（未完の文字は次回へ）
    pub fn push(&mut self, bytes: &[u8]) -> String {
        let mut out = String::new();
        self.decode(bytes, false, &mut out);
        out
    }

    /// ストリーム終端。残った未完バイトは U+FFFD になる
    pub fn finish(mut self) -> String {
        let mut out = String::new();
        self.decode(&[], true, &mut out);
        out
    }

    fn decode(&mut self, mut src: &[u8], last: bool, out: &mut String) {
        loop {
            // decode_to_string は String を伸ばさないので、毎回必要量を確保する
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 4);
            out.reserve(needed);
            let (result, read, _) = self.decoder.decode_to_string(src, out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}
