//! lchat 固有のドメイン型（型と不変条件）

pub mod command;
pub mod history;
pub mod input;
pub mod prompt;
pub mod session_state;
pub mod template;

pub use command::{ChatCommand, ChatOptions};
pub use history::History;
pub use input::{classify_input, ExitKeywords, UserInput};
pub use prompt::format_prompt;
pub use session_state::SessionState;
pub use template::{detect_template, TemplateKind};
