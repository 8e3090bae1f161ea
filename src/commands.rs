#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    /// `/model` alone shows the current model; with an id it switches.
    Model(Option<String>),
    Clear,
    /// Settings are edited outside the interview; this only points there.
    Config,
    Exit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /help          show this list
  /model [id]    show or switch the assistant model
  /clear         clear the screen
  /config        how to change credentials and settings
  /exit          stop without submitting
Type exit, quit, выход or стоп to leave as well.";

pub const CONFIG_HINT: &str =
    "Settings can't be changed mid-interview. Run `sj config` to update them.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or(trimmed).to_lowercase();
    let argument = parts.next().map(str::to_string);

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/model" => SlashCommand::Model(argument),
        "/clear" => SlashCommand::Clear,
        "/config" => SlashCommand::Config,
        "/exit" | "/quit" => SlashCommand::Exit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
