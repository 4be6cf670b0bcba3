//! Maps raw message text to a chat command.
//!
//! Rules are checked in declaration order and the first match wins. `!kick`
//! is a prefix rule so the command word can be followed by mentions; the
//! other three match the full text exactly.

/// The commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Roll,
    Kick,
    Block,
}

/// Select the command for a message, or `None` when nothing matches.
///
/// An unmatched message is ordinary chat, not an error.
pub fn route(text: &str) -> Option<Command> {
    if text == "!ping" {
        Some(Command::Ping)
    } else if text == "!roll" {
        Some(Command::Roll)
    } else if text.starts_with("!kick") {
        Some(Command::Kick)
    } else if text == "!block" {
        Some(Command::Block)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_commands_route() {
        assert_eq!(route("!ping"), Some(Command::Ping));
        assert_eq!(route("!roll"), Some(Command::Roll));
        assert_eq!(route("!block"), Some(Command::Block));
    }

    #[test]
    fn test_kick_matches_by_prefix() {
        assert_eq!(route("!kick"), Some(Command::Kick));
        assert_eq!(route("!kick @alice @bob"), Some(Command::Kick));
        // Prefix rule, so run-on words match too.
        assert_eq!(route("!kickeveryone"), Some(Command::Kick));
    }

    #[test]
    fn test_exact_commands_reject_trailing_text() {
        assert_eq!(route("!ping extra"), None);
        assert_eq!(route("!rolling"), None);
        assert_eq!(route("!blocked"), None);
    }

    #[test]
    fn test_unknown_text_routes_nowhere() {
        assert_eq!(route(""), None);
        assert_eq!(route("hello"), None);
        assert_eq!(route("ping"), None);
    }
}
