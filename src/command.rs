//! Admin command surface: `/whitelist reload|status|spawn`.

pub const COMMAND_NAME: &str = "whitelist";
const SUBCOMMANDS: [&str; 3] = ["reload", "status", "spawn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
    Status,
    /// Hands out the next whitelisted name not yet in use.
    Spawn,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {}", usage())]
    Usage,
}

pub fn usage() -> String {
    format!("/{} {}", COMMAND_NAME, SUBCOMMANDS.join("|"))
}

impl Command {
    /// Parses the arguments following the command name.
    pub fn parse(args: &[&str]) -> Result<Self, CommandError> {
        match args {
            ["reload"] => Ok(Command::Reload),
            ["status"] => Ok(Command::Status),
            ["spawn"] => Ok(Command::Spawn),
            _ => Err(CommandError::Usage),
        }
    }

    /// Parses a full input line, with or without the leading `/whitelist`.
    pub fn parse_line(line: &str) -> Result<Self, CommandError> {
        let mut args: Vec<&str> = line.split_whitespace().collect();
        if let Some(first) = args.first() {
            if first.trim_start_matches('/') == COMMAND_NAME {
                args.remove(0);
            }
        }
        Self::parse(&args)
    }
}
