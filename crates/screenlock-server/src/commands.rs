//! Request script parsing for `screenlockd`.
//!
//! One command per line. `#` starts a comment. Numbers are decimal.
//!
//! ```text
//! bind <client> <control>
//! unbind <client> <control>
//! lock <client> <control> <lock>
//! unlock | persist | temporary | destroy-lock <client> <lock>
//! surface <client> <surface>
//! surface-destroyed <surface>
//! get-visibility <client> <visibility> <surface>
//! set-visibility <client> <visibility> <mode>
//! destroy-visibility <client> <visibility>
//! disconnect <client>
//! state
//! ```

use std::str::FromStr;

use screenlock_proto::{ClientId, ObjectId, Request, SurfaceId, VisibilityMode};

/// Parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line or comment.
    Empty,

    /// Request to dispatch.
    Request(Request),

    /// Log the current lock state.
    State,

    /// Unknown command.
    Unknown {
        /// Raw input line.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse one script line.
pub fn parse(input: &str) -> Command {
    let input = input.split_once('#').map_or(input, |(code, _)| code).trim();
    if input.is_empty() {
        return Command::Empty;
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");
    let client = field::<u64>(&parts, 1).map(ClientId);

    match command {
        "bind" => match (client, field::<u32>(&parts, 2)) {
            (Some(client), Some(id)) => {
                Command::Request(Request::BindControl { client, id: ObjectId(id) })
            },
            _ => usage("bind", "bind <client> <control>"),
        },

        "unbind" => match (client, field::<u32>(&parts, 2)) {
            (Some(client), Some(control)) => Command::Request(Request::DestroyControl {
                client,
                control: ObjectId(control),
            }),
            _ => usage("unbind", "unbind <client> <control>"),
        },

        "lock" => match (client, field::<u32>(&parts, 2), field::<u32>(&parts, 3)) {
            (Some(client), Some(control), Some(id)) => Command::Request(Request::RequestLock {
                client,
                control: ObjectId(control),
                id: ObjectId(id),
            }),
            _ => usage("lock", "lock <client> <control> <lock>"),
        },

        "unlock" | "persist" | "temporary" | "destroy-lock" => {
            match (client, field::<u32>(&parts, 2)) {
                (Some(client), Some(lock)) => {
                    let lock = ObjectId(lock);
                    let request = match command {
                        "unlock" => Request::Unlock { client, lock },
                        "persist" => Request::SetPersistent { client, lock },
                        "temporary" => Request::SetTemporary { client, lock },
                        _ => Request::DestroyLock { client, lock },
                    };
                    Command::Request(request)
                },
                _ => usage(command, &format!("{command} <client> <lock>")),
            }
        },

        "surface" => match (client, field::<u64>(&parts, 2)) {
            (Some(client), Some(surface)) => Command::Request(Request::SurfaceCreated {
                client,
                surface: SurfaceId(surface),
            }),
            _ => usage("surface", "surface <client> <surface>"),
        },

        "surface-destroyed" => match field::<u64>(&parts, 1) {
            Some(surface) => {
                Command::Request(Request::SurfaceDestroyed { surface: SurfaceId(surface) })
            },
            None => usage("surface-destroyed", "surface-destroyed <surface>"),
        },

        "get-visibility" => match (client, field::<u32>(&parts, 2), field::<u64>(&parts, 3)) {
            (Some(client), Some(id), Some(surface)) => Command::Request(Request::GetVisibility {
                client,
                id: ObjectId(id),
                surface: SurfaceId(surface),
            }),
            _ => usage("get-visibility", "get-visibility <client> <visibility> <surface>"),
        },

        "set-visibility" => match (client, field::<u32>(&parts, 2), field::<u32>(&parts, 3)) {
            (Some(client), Some(visibility), Some(mode)) => {
                Command::Request(Request::SetVisibility {
                    client,
                    visibility: ObjectId(visibility),
                    mode: VisibilityMode(mode),
                })
            },
            _ => usage("set-visibility", "set-visibility <client> <visibility> <mode>"),
        },

        "destroy-visibility" => match (client, field::<u32>(&parts, 2)) {
            (Some(client), Some(visibility)) => Command::Request(Request::DestroyVisibility {
                client,
                visibility: ObjectId(visibility),
            }),
            _ => usage("destroy-visibility", "destroy-visibility <client> <visibility>"),
        },

        "disconnect" => match client {
            Some(client) => Command::Request(Request::Disconnect { client }),
            None => usage("disconnect", "disconnect <client>"),
        },

        "state" => Command::State,

        _ => Command::Unknown { input: input.to_string() },
    }
}

fn field<T: FromStr>(parts: &[&str], index: usize) -> Option<T> {
    parts.get(index)?.parse().ok()
}

fn usage(command: &str, usage: &str) -> Command {
    Command::InvalidArgs { command: command.to_string(), error: format!("Usage: {usage}") }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_bind() {
        assert_eq!(
            parse("bind 1 7"),
            Command::Request(Request::BindControl { client: ClientId(1), id: ObjectId(7) })
        );
    }

    #[test]
    fn parse_lock() {
        assert_eq!(
            parse("lock 2 7 8"),
            Command::Request(Request::RequestLock {
                client: ClientId(2),
                control: ObjectId(7),
                id: ObjectId(8)
            })
        );
    }

    #[test]
    fn parse_lock_object_requests() {
        assert_eq!(
            parse("persist 2 8"),
            Command::Request(Request::SetPersistent { client: ClientId(2), lock: ObjectId(8) })
        );
        assert_eq!(
            parse("destroy-lock 2 8"),
            Command::Request(Request::DestroyLock { client: ClientId(2), lock: ObjectId(8) })
        );
    }

    #[test]
    fn parse_set_visibility() {
        assert_eq!(
            parse("set-visibility 3 4 2"),
            Command::Request(Request::SetVisibility {
                client: ClientId(3),
                visibility: ObjectId(4),
                mode: VisibilityMode(2)
            })
        );
    }

    #[test]
    fn parse_comment_and_blank() {
        assert_eq!(parse(""), Command::Empty);
        assert_eq!(parse("   # just a note"), Command::Empty);
        assert_eq!(
            parse("disconnect 4 # owner crashes"),
            Command::Request(Request::Disconnect { client: ClientId(4) })
        );
    }

    #[test]
    fn parse_missing_args() {
        assert!(matches!(parse("lock 1 2"), Command::InvalidArgs { command, .. } if command == "lock"));
        assert!(matches!(parse("unlock x 2"), Command::InvalidArgs { command, .. } if command == "unlock"));
    }

    #[test]
    fn parse_object_id_out_of_range() {
        assert!(matches!(parse("bind 1 4294967296"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn parse_unknown() {
        assert!(matches!(parse("explode 1"), Command::Unknown { .. }));
    }

    #[test]
    fn parse_state() {
        assert_eq!(parse("state"), Command::State);
    }

    proptest! {
        #[test]
        fn prop_trailing_comment_is_ignored(line in "[a-z -]{0,24}", note in "[ -~]{0,24}") {
            prop_assert_eq!(parse(&format!("{line}#{note}")), parse(&line));
        }

        #[test]
        fn prop_bind_accepts_any_ids(client in any::<u64>(), id in any::<u32>()) {
            prop_assert_eq!(
                parse(&format!("  bind\t{client}   {id} ")),
                Command::Request(Request::BindControl { client: ClientId(client), id: ObjectId(id) })
            );
        }
    }
}
