use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Retry,
    Export(Option<PathBuf>),
    Reset,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /help            show this help
  /retry           re-run the initial analysis after it failed
  /export [path]   write the conversation transcript as markdown
  /reset           discard the conversation and start over with the same files
  /quit            exit
Any other line is sent as a question about your system.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/retry" => SlashCommand::Retry,
        "/export" => {
            SlashCommand::Export((!argument.is_empty()).then(|| PathBuf::from(argument)))
        }
        "/reset" => SlashCommand::Reset,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
