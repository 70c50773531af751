//! Command types and definitions.

use std::fmt;

/// Available bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Greet the user and explain what the bot does.
    Start,

    /// Show help information.
    Help,

    /// Shorten the given URL. `None` when the argument is missing.
    Shorten(Option<String>),

    /// Show per-provider configuration status.
    Status,

    /// Show request counters and uptime.
    Stats,
}

impl BotCommand {
    /// Parses a slash command from a message text.
    ///
    /// Returns `None` if the message is not a command. A `@botname` suffix
    /// on the command word is accepted and ignored, as Telegram appends it
    /// in group chats.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;

        let (cmd, args) = match rest.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd, Some(args.trim())),
            None => (rest, None),
        };

        // Strip the "@botname" mention Telegram adds in groups.
        let cmd = cmd.split('@').next().unwrap_or(cmd).to_lowercase();

        match cmd.as_str() {
            "start" => Some(Self::Start),
            "help" | "h" => Some(Self::Help),
            "shorten" | "short" => Some(Self::Shorten(
                args.filter(|a| !a.is_empty()).map(str::to_owned),
            )),
            "status" => Some(Self::Status),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }

    /// Returns the command name as it appears in help.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Shorten(_) => "shorten",
            Self::Status => "status",
            Self::Stats => "stats",
        }
    }

    /// Returns all available commands with their descriptions.
    #[must_use]
    pub fn all_commands() -> Vec<(&'static str, &'static str)> {
        vec![
            ("/start", "Greet and explain what the bot does"),
            ("/shorten <url>", "Shorten a URL"),
            ("/status", "Show shortener provider status"),
            ("/stats", "Show request counters and uptime"),
            ("/help", "Show this help message"),
        ]
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shorten(Some(url)) => write!(f, "shorten {url}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command was successful.
    pub success: bool,

    /// Response message to show the user.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
