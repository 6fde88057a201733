//! 入力 1 行の分類（空行 / 終了キーワード / メッセージ）

/// 大文字小文字を区別しない終了キーワードの集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitKeywords(Vec<String>);

impl ExitKeywords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.0.iter().any(|w| *w == word)
    }
}

/// 分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// 空行または空白のみ
    Blank,
    Exit,
    /// 前後の空白を除いたメッセージ
    Message(String),
}

pub fn classify_input(line: &str, exits: &ExitKeywords) -> UserInput {
    let text = line.trim();
    if text.is_empty() {
        UserInput::Blank
    } else if exits.contains(text) {
        UserInput::Exit
    } else {
        UserInput::Message(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exits() -> ExitKeywords {
        ExitKeywords::new(["exit", "quit", "Salir"])
    }

    #[test]
    fn test_blank() {
        assert_eq!(classify_input("", &exits()), UserInput::Blank);
        assert_eq!(classify_input("  \t \r\n", &exits()), UserInput::Blank);
    }

    #[test]
    fn test_exit_is_case_insensitive() {
        assert_eq!(classify_input("EXIT", &exits()), UserInput::Exit);
        assert_eq!(classify_input("  salir\n", &exits()), UserInput::Exit);
        assert_eq!(classify_input("Quit", &exits()), UserInput::Exit);
    }

    #[test]
    fn test_message_is_trimmed() {
        assert_eq!(
            classify_input("  exit now \n", &exits()),
            UserInput::Message("exit now".to_string())
        );
    }
}
