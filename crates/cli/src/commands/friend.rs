//! modctl friend command

use authority::{FriendOutcome, FriendService};
use clap::{Args, Subcommand};
use console::style;
use serde_json::json;
use shared::Uid;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct FriendCommand {
    #[command(subcommand)]
    pub command: FriendSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum FriendSubcommand {
    /// Send a friend request
    Request {
        /// Recipient
        uid: String,
    },
    /// Accept a received request
    Accept {
        /// Requester
        uid: String,
    },
    /// Remove a friend or decline a request
    Remove {
        /// Other user
        uid: String,
    },
    /// List requests waiting on the acting user
    Pending,
}

impl FriendCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut service = FriendService::new(ctx.open_store()?);
        let identity = ctx.identity();

        match &self.command {
            FriendSubcommand::Request { uid } => {
                let to = Uid::parse(uid)?;
                let outcome = service.send_request(identity.as_ref(), &to)?;
                let accepted = outcome == FriendOutcome::Accepted;
                ctx.emit(&json!({ "to": to, "accepted": accepted }), || {
                    if accepted {
                        format!("{} {} had already asked; you are now friends", style("✓").green(), to)
                    } else {
                        format!("{} friend request sent to {}", style("✓").green(), to)
                    }
                })
            }
            FriendSubcommand::Accept { uid } => {
                let requester = Uid::parse(uid)?;
                service.accept_request(identity.as_ref(), &requester)?;
                ctx.emit(&json!({ "friend": requester }), || {
                    format!("{} you are now friends with {}", style("✓").green(), requester)
                })
            }
            FriendSubcommand::Remove { uid } => {
                let other = Uid::parse(uid)?;
                service.remove_friend(identity.as_ref(), &other)?;
                ctx.emit(&json!({ "removed": other }), || {
                    format!("{} removed {}", style("✓").green(), other)
                })
            }
            FriendSubcommand::Pending => {
                let me = identity
                    .ok_or_else(|| anyhow::anyhow!("pass --as to list pending requests"))?;
                let pending = service.pending_received(&me.uid)?;
                ctx.emit(&pending, || {
                    if pending.is_empty() {
                        "no pending friend requests".to_string()
                    } else {
                        pending.iter().map(Uid::to_string).collect::<Vec<_>>().join("\n")
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ProfileStore, UserProfile};
    use store::JsonFileProfileStore;
    use tempfile::TempDir;

    #[test]
    fn test_request_and_accept_through_file_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        {
            let mut store = JsonFileProfileStore::open(&path).unwrap();
            store.insert(UserProfile::new(Uid::new("alice"))).unwrap();
            store.insert(UserProfile::new(Uid::new("bob"))).unwrap();
        }

        let alice = Context::resolve(None, Some(path.clone()), Some("alice"), true).unwrap();
        FriendCommand {
            command: FriendSubcommand::Request { uid: "bob".into() },
        }
        .run(&alice)
        .unwrap();

        let bob = Context::resolve(None, Some(path.clone()), Some("bob"), true).unwrap();
        FriendCommand {
            command: FriendSubcommand::Accept { uid: "alice".into() },
        }
        .run(&bob)
        .unwrap();

        let store = JsonFileProfileStore::open(&path).unwrap();
        assert!(store.get(&Uid::new("alice")).unwrap().unwrap().is_friend(&Uid::new("bob")));
    }
}
