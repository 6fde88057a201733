mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use cli::{config_to_command, parse_args, print_completion, ParseOutcome};
use common::error::Error;
use common::llm::BackendKind;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::{ChatCommand, TemplateKind};
use ports::inbound::UseCaseRunner;
use std::process;
use wiring::{wire_chat, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, cmd: ChatCommand) -> Result<i32, Error> {
        let command_name = cmd_name_for_log(&cmd);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started", "cli", "lifecycle")
                .with_field("command", command_name),
        );

        let result = match cmd {
            ChatCommand::Help => {
                print_help();
                Ok(0)
            }
            ChatCommand::ListTemplates => {
                for kind in TemplateKind::ALL {
                    println!("{}", kind);
                }
                Ok(0)
            }
            ChatCommand::Chat(opts) => self.app.chat.run(&opts),
        };

        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished", "cli", "lifecycle")
                .with_field("command", command_name)
                .with_field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self
                .app
                .logger
                .log(&LogRecord::new(LogLevel::Error, e.to_string(), "cli", "error"));
        }
        result
    }
}

fn cmd_name_for_log(cmd: &ChatCommand) -> &'static str {
    match cmd {
        ChatCommand::Help => "help",
        ChatCommand::ListTemplates => "list-templates",
        ChatCommand::Chat(_) => "chat",
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("lchat: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let app = wire_chat(config.verbose);
    let runner = Runner { app };
    runner.run(config_to_command(config))
}

fn print_usage() {
    eprintln!("Usage: lchat [options]");
}

fn print_help() {
    let backends: Vec<&str> = BackendKind::ALL.iter().map(|b| b.as_str()).collect();
    let templates: Vec<&str> = TemplateKind::ALL.iter().map(|t| t.as_str()).collect();
    println!("Usage: lchat [options]");
    println!("Chat with a local GGUF model. Type exit, quit or salir to leave.");
    println!("Options:");
    println!("  -h, --help                    Show this help message");
    println!("  -d, --model-dir <dir>         Directory scanned for the model file (default: gguf)");
    println!("  -b, --backend <backend>       Inference backend: {}", backends.join(", "));
    println!("      --server-url <url>        llama.cpp server URL (default: http://127.0.0.1:8080)");
    println!("  -t, --template <template>     Prompt template: {}", templates.join(", "));
    println!("  -S, --system <instruction>    System prompt for this session");
    println!("      --history-cap <n>         Maximum number of messages kept (default: 10)");
    println!("      --stats                   Print fragment count and elapsed time after each reply");
    println!("      --on-error <policy>       On generation failure: resume (default) or abort");
    println!("  -v, --verbose                 Mirror structured logs to stderr");
    println!("      --generate <shell>        Generate shell completion script");
    println!("      --list-templates          List prompt template names");
    println!();
    println!("Configuration: $LCHAT_HOME/config.json (default ~/.config/lchat/config.json)");
}
