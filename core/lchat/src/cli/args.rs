use crate::domain::{ChatCommand, ChatOptions};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::config::GenerationErrorPolicy;
use common::error::Error;
use common::llm::BackendKind;
use std::path::PathBuf;

const BIN_NAME: &str = "lchat";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// --list-templates: テンプレート名を表示して終了
    pub list_templates: bool,
    /// -v / --verbose: 構造化ログを stderr にも出す
    pub verbose: bool,
    pub model_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub server_url: Option<String>,
    pub template: Option<String>,
    pub system: Option<String>,
    pub history_cap: Option<usize>,
    pub stats: bool,
    pub on_error: Option<GenerationErrorPolicy>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new(BIN_NAME)
        .about("Chat with a local GGUF model")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("model-dir")
                .short('d')
                .long("model-dir")
                .value_name("dir")
                .help("Directory scanned for the model file (default: gguf)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("backend")
                .short('b')
                .long("backend")
                .value_name("backend")
                .help("Inference backend: llama_cpp, server, echo")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("server-url")
                .long("server-url")
                .value_name("url")
                .help("llama.cpp server URL for the server backend")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("template")
                .short('t')
                .long("template")
                .value_name("template")
                .help("Prompt template (skips detection from the model file name)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("system")
                .short('S')
                .long("system")
                .value_name("instruction")
                .help("System prompt for this session")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("history-cap")
                .long("history-cap")
                .value_name("n")
                .help("Maximum number of messages kept in the history")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("stats")
                .long("stats")
                .help("Print fragment count and elapsed time after each reply")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("on-error")
                .long("on-error")
                .value_name("policy")
                .help("What to do when generation fails: resume or abort")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Mirror structured logs to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("list-templates")
                .long("list-templates")
                .help("List prompt template names")
                .action(ArgAction::SetTrue),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Result<Config, Error> {
    let backend = matches
        .get_one::<String>("backend")
        .map(|s| s.parse::<BackendKind>())
        .transpose()?;
    let on_error = matches
        .get_one::<String>("on-error")
        .map(|s| s.parse::<GenerationErrorPolicy>())
        .transpose()?;

    Ok(Config {
        help: matches.get_flag("help"),
        list_templates: matches.get_flag("list-templates"),
        verbose: matches.get_flag("verbose"),
        model_dir: matches.get_one::<PathBuf>("model-dir").cloned(),
        backend,
        server_url: matches.get_one::<String>("server-url").cloned(),
        template: matches.get_one::<String>("template").cloned(),
        system: matches.get_one::<String>("system").cloned(),
        history_cap: matches.get_one::<usize>("history-cap").copied(),
        stats: matches.get_flag("stats"),
        on_error,
    })
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)?))
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    matches_to_config(&matches)
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
}

/// Config を ChatCommand に変換する
pub fn config_to_command(config: Config) -> ChatCommand {
    if config.help {
        return ChatCommand::Help;
    }
    if config.list_templates {
        return ChatCommand::ListTemplates;
    }
    ChatCommand::Chat(ChatOptions {
        model_dir: config.model_dir,
        backend: config.backend,
        server_url: config.server_url,
        template: config.template,
        system: config.system,
        history_cap: config.history_cap,
        on_error: config.on_error,
        stats: config.stats,
    })
}
