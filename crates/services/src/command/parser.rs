//! Turns `/name arg rest of line` into a [`Command`].
//!
//! The text after the slash is split on single spaces into at most three
//! tokens, so the last token keeps any further spaces verbatim.

use domains::{AppError, PostId, Result, Role};

use crate::roles::Direction;

const COLOR_PREFIX: &str = "(color)";

/// A recognised moderation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add <username> <text>`
    AddText { username: String, text: String },
    /// `/del <id> [<id>...]`; ids that are not plain digits are dropped
    Delete { ids: Vec<PostId> },
    /// `/destroy <keyword>`
    Destroy { keyword: String },
    /// `/destroy (color)<name>`
    DestroyByColor { color: String },
    /// `/clear`
    Clear,
    /// `/<role> <username>` and `/dis<role> <username>`
    ChangeRole {
        username: String,
        target: Role,
        direction: Direction,
    },
    /// `/disself`
    DisSelf,
    Reserved(ReservedCommand),
}

impl Command {
    /// Tier a caller needs before the command may run. `None` for commands
    /// that never touch state.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Command::Delete { .. } => Some(Role::Manager),
            Command::AddText { .. } | Command::Destroy { .. } | Command::Clear => {
                Some(Role::Moderator)
            }
            Command::ChangeRole { .. } | Command::DisSelf => Some(Role::Summit),
            Command::DestroyByColor { .. } | Command::Reserved(_) => None,
        }
    }
}

/// Command names held for moderation features that do not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedCommand {
    Ng,
    Ok,
    Prevent,
    Permit,
    Restrict,
    Stop,
    Prohibit,
    Release,
    Kill,
    Ban,
    Revive,
    Reduce,
    Topic,
    Color,
    Instances,
    Max,
    Range,
}

impl ReservedCommand {
    const ALL: [ReservedCommand; 17] = [
        ReservedCommand::Ng,
        ReservedCommand::Ok,
        ReservedCommand::Prevent,
        ReservedCommand::Permit,
        ReservedCommand::Restrict,
        ReservedCommand::Stop,
        ReservedCommand::Prohibit,
        ReservedCommand::Release,
        ReservedCommand::Kill,
        ReservedCommand::Ban,
        ReservedCommand::Revive,
        ReservedCommand::Reduce,
        ReservedCommand::Topic,
        ReservedCommand::Color,
        ReservedCommand::Instances,
        ReservedCommand::Max,
        ReservedCommand::Range,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReservedCommand::Ng => "NG",
            ReservedCommand::Ok => "OK",
            ReservedCommand::Prevent => "prevent",
            ReservedCommand::Permit => "permit",
            ReservedCommand::Restrict => "restrict",
            ReservedCommand::Stop => "stop",
            ReservedCommand::Prohibit => "prohibit",
            ReservedCommand::Release => "release",
            ReservedCommand::Kill => "kill",
            ReservedCommand::Ban => "ban",
            ReservedCommand::Revive => "revive",
            ReservedCommand::Reduce => "reduce",
            ReservedCommand::Topic => "topic",
            ReservedCommand::Color => "color",
            ReservedCommand::Instances => "instances",
            ReservedCommand::Max => "max",
            ReservedCommand::Range => "range",
        }
    }

    /// The missing subsystem, when there is a single one to name.
    pub fn missing_feature(self) -> Option<&'static str> {
        match self {
            Self::Ng | Self::Ok => Some("NG word management"),
            Self::Prevent
            | Self::Permit
            | Self::Restrict
            | Self::Stop
            | Self::Prohibit
            | Self::Release => Some("posting restriction management"),
            Self::Kill | Self::Ban | Self::Revive => Some("account state management"),
            Self::Reduce | Self::Topic | Self::Color | Self::Instances | Self::Max | Self::Range => {
                None
            }
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Parses one command line.
///
/// Fails with a validation error when the text does not start with `/`,
/// the name is unknown, or a required argument is missing.
pub fn parse(input: &str) -> Result<Command> {
    let Some(body) = input.strip_prefix('/') else {
        return Err(AppError::validation(
            "invalid command format: commands must start with \"/\"",
        ));
    };

    let mut tokens = body.splitn(3, ' ');
    let name = tokens.next().unwrap_or_default();
    let arg = tokens.next();
    let rest = tokens.next();

    let command = match name {
        "add" => match (arg, rest) {
            (Some(username), Some(text)) => Command::AddText {
                username: username.to_string(),
                text: text.to_string(),
            },
            _ => return Err(usage("/add <username> <text>")),
        },
        "del" => {
            if arg.is_none() {
                return Err(usage("/del <post number> [<post number>...]"));
            }
            let ids = arg
                .into_iter()
                .chain(rest)
                .flat_map(str::split_whitespace)
                .filter_map(post_number)
                .collect();
            Command::Delete { ids }
        }
        "destroy" => {
            let Some(first) = arg else {
                return Err(usage("/destroy <keyword> or /destroy (color)<name>"));
            };
            match first.strip_prefix(COLOR_PREFIX) {
                Some(color) => Command::DestroyByColor {
                    color: color.to_string(),
                },
                None => Command::Destroy {
                    keyword: match rest {
                        Some(rest) => format!("{first} {rest}"),
                        None => first.to_string(),
                    },
                },
            }
        }
        "clear" => Command::Clear,
        "disself" => Command::DisSelf,
        _ => {
            if let Some(target) = Role::from_name(name) {
                role_change(name, arg, target, Direction::Promote)?
            } else if let Some(target) = name.strip_prefix("dis").and_then(Role::from_name) {
                role_change(name, arg, target, Direction::Demote)?
            } else if let Some(reserved) = ReservedCommand::from_name(name) {
                Command::Reserved(reserved)
            } else {
                return Err(AppError::validation(format!("unknown command: /{name}")));
            }
        }
    };
    Ok(command)
}

fn role_change(
    name: &str,
    arg: Option<&str>,
    target: Role,
    direction: Direction,
) -> Result<Command> {
    match arg {
        Some(username) => Ok(Command::ChangeRole {
            username: username.to_string(),
            target,
            direction,
        }),
        None => Err(usage(&format!("/{name} <username>"))),
    }
}

/// Only plain ASCII digit runs count as post numbers.
fn post_number(token: &str) -> Option<PostId> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn usage(text: &str) -> AppError {
    AppError::validation(format!("usage: {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_message(input: &str) -> String {
        match parse(input) {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn rejects_text_without_leading_slash() {
        assert!(err_message("clear").contains("must start with"));
        assert!(err_message("").contains("must start with"));
    }

    #[test]
    fn add_keeps_trailing_text_verbatim() {
        assert_eq!(
            parse("/add alice  the great one").unwrap(),
            Command::AddText {
                username: "alice".into(),
                text: " the great one".into(),
            }
        );
        assert!(err_message("/add alice").starts_with("usage:"));
    }

    #[test]
    fn del_collects_digit_tokens_only() {
        assert_eq!(
            parse("/del 1 2 abc").unwrap(),
            Command::Delete { ids: vec![1, 2] }
        );
        assert_eq!(
            parse("/del -3 +4 5x 6").unwrap(),
            Command::Delete { ids: vec![6] }
        );
        assert_eq!(parse("/del abc").unwrap(), Command::Delete { ids: vec![] });
        assert!(err_message("/del").starts_with("usage:"));
    }

    #[test]
    fn destroy_matches_whole_remainder_or_colour() {
        assert_eq!(
            parse("/destroy buy now cheap").unwrap(),
            Command::Destroy {
                keyword: "buy now cheap".into()
            }
        );
        assert_eq!(
            parse("/destroy (color)blue").unwrap(),
            Command::DestroyByColor {
                color: "blue".into()
            }
        );
    }

    #[test]
    fn role_names_promote_and_dis_prefix_demotes() {
        assert_eq!(
            parse("/moderator bob").unwrap(),
            Command::ChangeRole {
                username: "bob".into(),
                target: Role::Moderator,
                direction: Direction::Promote,
            }
        );
        assert_eq!(
            parse("/disspeaker bob").unwrap(),
            Command::ChangeRole {
                username: "bob".into(),
                target: Role::Speaker,
                direction: Direction::Demote,
            }
        );
        assert_eq!(parse("/disself").unwrap(), Command::DisSelf);
        assert!(err_message("/summit").starts_with("usage: /summit"));
        assert!(err_message("/disfoo bob").starts_with("unknown command"));
    }

    #[test]
    fn reserved_names_are_recognised_and_case_sensitive() {
        for reserved in ReservedCommand::ALL {
            let cmd = parse(&format!("/{} x", reserved.name())).unwrap();
            assert_eq!(cmd, Command::Reserved(reserved));
            assert_eq!(cmd.required_role(), None);
        }
        assert!(err_message("/ng").starts_with("unknown command"));
        assert!(err_message("/Clear").starts_with("unknown command"));
        assert!(err_message("/").starts_with("unknown command"));
    }

    #[test]
    fn required_tiers() {
        assert_eq!(
            parse("/del 1").unwrap().required_role(),
            Some(Role::Manager)
        );
        assert_eq!(parse("/clear").unwrap().required_role(), Some(Role::Moderator));
        assert_eq!(parse("/operator a").unwrap().required_role(), Some(Role::Summit));
        assert_eq!(parse("/disself").unwrap().required_role(), Some(Role::Summit));
    }
}
