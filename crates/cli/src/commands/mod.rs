//! CLI Commands

pub mod rank;
pub mod check;
pub mod moderate;
pub mod friend;

pub use rank::RankCommand;
pub use check::CheckCommand;
pub use moderate::{BanCommand, RolesCommand, StatusCommand, TimeoutCommand, UnbanCommand};
pub use friend::FriendCommand;

use shared::RoleSet;

/// Split `Admin,VIP member` style arguments into a role set
pub(crate) fn parse_role_args(args: &[String]) -> RoleSet {
    args.iter()
        .flat_map(|a| a.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(shared::RoleLabel::new)
        .collect()
}
