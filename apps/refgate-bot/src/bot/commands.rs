use refgate_db::models::channel::{HandleError, canonical_handle};
use thiserror::Error;

/// Splits `/name@bot rest` into `("name", "rest")`. Returns `None` for non-command text.
pub fn split_command(text: &str) -> Option<(&str, &str)> {
    let body = text.trim_start().strip_prefix('/')?;
    let (head, rest) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim()),
        None => (body, ""),
    };
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some((name, rest))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    AddChannel(String),
    RemoveChannel(String),
    Channels,
    Random(usize),
    AllUsers,
    Stats,
    Broadcast(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminCommandError {
    #[error("missing argument, usage: {usage}")]
    MissingArgument { usage: &'static str },
    #[error("{0:?} is not a positive whole number")]
    InvalidNumber(String),
    #[error("invalid channel handle: {source}")]
    InvalidHandle {
        usage: &'static str,
        source: HandleError,
    },
}

impl AdminCommandError {
    pub fn usage(&self) -> &'static str {
        match self {
            AdminCommandError::MissingArgument { usage }
            | AdminCommandError::InvalidHandle { usage, .. } => *usage,
            AdminCommandError::InvalidNumber(_) => AdminCommand::RANDOM_USAGE,
        }
    }
}

impl AdminCommand {
    pub const ADD_CHANNEL_USAGE: &'static str = "/addchannel @channel";
    pub const REMOVE_CHANNEL_USAGE: &'static str = "/removechannel @channel";
    pub const RANDOM_USAGE: &'static str = "/random 5";
    pub const BROADCAST_USAGE: &'static str = "/broadcast message text";

    /// `None` when `name` is not an administrator command at all.
    pub fn parse(name: &str, args: &str) -> Option<Result<Self, AdminCommandError>> {
        let first_arg = args.split_whitespace().next();
        let command = match name {
            "addchannel" => {
                channel_arg(first_arg, Self::ADD_CHANNEL_USAGE).map(AdminCommand::AddChannel)
            }
            "removechannel" => {
                channel_arg(first_arg, Self::REMOVE_CHANNEL_USAGE).map(AdminCommand::RemoveChannel)
            }
            "channels" => Ok(AdminCommand::Channels),
            "random" => match first_arg {
                None => Err(AdminCommandError::MissingArgument {
                    usage: Self::RANDOM_USAGE,
                }),
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(AdminCommand::Random(n)),
                    _ => Err(AdminCommandError::InvalidNumber(raw.to_string())),
                },
            },
            "allusers" => Ok(AdminCommand::AllUsers),
            "stats" => Ok(AdminCommand::Stats),
            "broadcast" if args.is_empty() => Err(AdminCommandError::MissingArgument {
                usage: Self::BROADCAST_USAGE,
            }),
            "broadcast" => Ok(AdminCommand::Broadcast(args.to_string())),
            _ => return None,
        };
        Some(command)
    }
}

/// Canonical `@handle` for the channel commands.
fn channel_arg(raw: Option<&str>, usage: &'static str) -> Result<String, AdminCommandError> {
    let raw = raw.ok_or(AdminCommandError::MissingArgument { usage })?;
    canonical_handle(raw).map_err(|source| AdminCommandError::InvalidHandle { usage, source })
}
