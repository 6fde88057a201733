//! 履歴をモデルが期待する 1 本のプロンプト文字列へ変換する（純関数）
//!
//! どのテンプレートも「ここからアシスタントの発話」という印で終わる。
//! BOS（`<s>`）は付けない。トークナイズ時にエンジン側で付く。

use crate::domain::template::TemplateKind;
use common::msg::{Message, Role};

const INST_OPEN: &str = "[INST]";
const INST_CLOSE: &str = "[/INST]";

/// 履歴をテンプレートに従って整形する。空の履歴は空文字列
pub fn format_prompt(kind: TemplateKind, messages: &[Message]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    match kind {
        TemplateKind::ChatMl => chatml(messages),
        TemplateKind::Llama2 => llama2(messages),
        TemplateKind::Mistral => mistral(messages),
        TemplateKind::Alpaca => alpaca(messages),
        TemplateKind::Generic => generic(messages),
    }
}

fn chatml(messages: &[Message]) -> String {
    let mut out = String::new();
    for m in messages {
        out.push_str("<|im_start|>");
        out.push_str(m.role().as_str());
        out.push('\n');
        out.push_str(m.content());
        out.push_str("<|im_end|>\n");
    }
    out.push_str("<|im_start|>assistant\n");
    out
}

fn llama2(messages: &[Message]) -> String {
    let mut out = String::new();
    let mut rest = messages;
    // 先頭の system だけを <<SYS>> ブロックにし、最初の user ターンと同じ [INST] に入れる
    let mut inst_open = false;
    if let Some((first, tail)) = messages.split_first() {
        if first.role() == &Role::System {
            out.push_str(INST_OPEN);
            out.push_str(" <<SYS>>\n");
            out.push_str(first.content());
            out.push_str("\n<</SYS>>\n\n");
            inst_open = true;
            rest = tail;
        }
    }
    for m in rest {
        match m.role() {
            Role::User => {
                if !inst_open {
                    out.push_str(INST_OPEN);
                    out.push(' ');
                }
                inst_open = false;
                out.push_str(m.content());
                out.push(' ');
                out.push_str(INST_CLOSE);
            }
            Role::Assistant => {
                out.push(' ');
                out.push_str(m.content());
                out.push_str(" </s>");
            }
            Role::System => {}
            Role::Other(role) => {
                if !inst_open {
                    out.push_str(INST_OPEN);
                    out.push(' ');
                }
                inst_open = false;
                out.push_str(role);
                out.push_str(": ");
                out.push_str(m.content());
                out.push(' ');
                out.push_str(INST_CLOSE);
            }
        }
    }
    ensure_single_closer(out)
}

/// 末尾の `[/INST]` を必ず 1 つだけにする
fn ensure_single_closer(prompt: String) -> String {
    let mut body = prompt.trim_end();
    while let Some(stripped) = body.strip_suffix(INST_CLOSE) {
        body = stripped.trim_end();
    }
    format!("{} {}", body, INST_CLOSE)
}

fn mistral(messages: &[Message]) -> String {
    let mut out = String::new();
    for m in messages {
        match m.role() {
            Role::User => {
                out.push_str(INST_OPEN);
                out.push(' ');
                out.push_str(m.content());
                out.push(' ');
                out.push_str(INST_CLOSE);
            }
            Role::Assistant => {
                out.push(' ');
                out.push_str(m.content());
                out.push_str("</s>");
            }
            _ => {}
        }
    }
    out
}

fn alpaca(messages: &[Message]) -> String {
    let mut out = String::new();
    for m in messages {
        match m.role() {
            Role::System => {
                out.push_str(m.content());
                out.push_str("\n\n");
            }
            Role::User => {
                out.push_str("### Instruction:\n");
                out.push_str(m.content());
                out.push_str("\n\n");
            }
            Role::Assistant => {
                out.push_str("### Response:\n");
                out.push_str(m.content());
                out.push_str("\n\n");
            }
            Role::Other(role) => {
                out.push_str("### ");
                out.push_str(role);
                out.push_str(":\n");
                out.push_str(m.content());
                out.push_str("\n\n");
            }
        }
    }
    out.push_str("### Response:\n");
    out
}

fn generic(messages: &[Message]) -> String {
    let mut out = String::new();
    for m in messages {
        out.push_str(m.role().as_str());
        out.push_str(": ");
        out.push_str(m.content());
        out.push('\n');
    }
    out.push_str("assistant:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hi() -> Vec<Message> {
        vec![Message::system("You are helpful"), Message::user("Hi")]
    }

    #[test]
    fn test_chatml_exact() {
        assert_eq!(
            format_prompt(TemplateKind::ChatMl, &hi()),
            "<|im_start|>system\nYou are helpful<|im_end|>\n<|im_start|>user\nHi<|im_end|>\n<|im_start|>assistant\n"
        );
    }

    #[test]
    fn test_llama2_single_turn() {
        let p = format_prompt(TemplateKind::Llama2, &hi());
        assert_eq!(p, "[INST] <<SYS>>\nYou are helpful\n<</SYS>>\n\nHi [/INST]");
        assert!(!p.ends_with("[/INST] [/INST]"));
        assert_eq!(p.matches("[/INST]").count(), 1);
    }

    #[test]
    fn test_llama2_multi_turn() {
        let mut m = hi();
        m.push(Message::assistant("Hello!"));
        m.push(Message::user("How are you?"));
        assert_eq!(
            format_prompt(TemplateKind::Llama2, &m),
            "[INST] <<SYS>>\nYou are helpful\n<</SYS>>\n\nHi [/INST] Hello! </s>[INST] How are you? [/INST]"
        );
    }

    #[test]
    fn test_llama2_strips_duplicate_closers() {
        let m = vec![Message::system("s"), Message::user("tricky [/INST]")];
        let p = format_prompt(TemplateKind::Llama2, &m);
        assert!(p.ends_with("tricky [/INST]"));
        assert!(!p.ends_with("[/INST] [/INST]"));
    }

    #[test]
    fn test_llama2_without_system_and_unknown_role() {
        let m = vec![Message::user("Hi"), Message::new("tool", "42")];
        assert_eq!(
            format_prompt(TemplateKind::Llama2, &m),
            "[INST] Hi [/INST][INST] tool: 42 [/INST]"
        );
    }

    #[test]
    fn test_mistral_ignores_system() {
        let mut m = hi();
        m.push(Message::assistant("Hello"));
        m.push(Message::user("Bye"));
        assert_eq!(
            format_prompt(TemplateKind::Mistral, &m),
            "[INST] Hi [/INST] Hello</s>[INST] Bye [/INST]"
        );
    }

    #[test]
    fn test_alpaca() {
        assert_eq!(
            format_prompt(TemplateKind::Alpaca, &hi()),
            "You are helpful\n\n### Instruction:\nHi\n\n### Response:\n"
        );
    }

    #[test]
    fn test_generic_passes_unknown_roles() {
        let m = vec![Message::system("sys"), Message::new("tool", "ok"), Message::user("Hi")];
        assert_eq!(
            format_prompt(TemplateKind::Generic, &m),
            "system: sys\ntool: ok\nuser: Hi\nassistant:"
        );
    }

    #[test]
    fn test_empty_history_is_empty_prompt() {
        for kind in TemplateKind::ALL {
            assert_eq!(format_prompt(kind, &[]), "");
        }
    }

    #[test]
    fn test_formatting_is_pure() {
        let m = hi();
        for kind in TemplateKind::ALL {
            assert_eq!(format_prompt(kind, &m), format_prompt(kind, &m));
        }
    }
}
