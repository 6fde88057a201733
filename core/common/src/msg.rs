//! 会話メッセージ型（Role / Message）
//!
//! History はこの型の列を保持し、プロンプト整形はこの型だけを見て文字列を組み立てる。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 発話者の役割
///
/// 未知の role は拒否せず `Other` にそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会話メッセージ（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: impl Into<Role>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role(), &Role::System);
        assert_eq!(Message::user("u").role(), &Role::User);
        assert_eq!(Message::assistant("a").role(), &Role::Assistant);
        assert_eq!(Message::user("Hello").content(), "Hello");
    }

    #[test]
    fn test_unknown_role_is_kept_verbatim() {
        let msg = Message::new("function", "ret");
        assert_eq!(msg.role(), &Role::Other("function".to_string()));
        assert_eq!(msg.role().as_str(), "function");
    }

    #[test]
    fn test_role_serde_roundtrip_as_plain_string() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
        let back: Message = serde_json::from_str(r#"{"role":"tool","content":"x"}"#).unwrap();
        assert_eq!(back.role().as_str(), "tool");
    }

    #[test]
    fn test_message_with_multiline_content() {
        let msg = Message::user("Line 1\nLine 2");
        assert_eq!(msg.content(), "Line 1\nLine 2");
    }
}
