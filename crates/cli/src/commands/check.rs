//! modctl check command

use clap::Args;
use console::style;
use rbac::ModerationPolicy;
use serde::Serialize;
use shared::{DenialKind, Role, RoleSet};

use crate::commands::parse_role_args;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Actor role labels, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub actor: Vec<String>,

    /// Target role labels, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub target: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    actor_rank: u8,
    target_rank: u8,
    moderation_power: bool,
    can_moderate: bool,
    denial: Option<DenialKind>,
}

impl CheckReport {
    fn new(policy: &ModerationPolicy, actor: &RoleSet, target: &RoleSet) -> Self {
        let decision = policy.check_roles(actor, target);
        Self {
            actor_rank: rbac::rank(actor),
            target_rank: rbac::rank(target),
            moderation_power: policy.has_moderation_power(actor),
            can_moderate: decision.is_ok(),
            denial: decision.err().map(|e| e.kind()),
        }
    }
}

impl CheckCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let actor = parse_role_args(&self.actor);
        let target = parse_role_args(&self.target);
        let policy = ModerationPolicy::from_config(&ctx.config);
        let report = CheckReport::new(&policy, &actor, &target);

        ctx.emit(&report, || {
            let verdict = match report.denial {
                None => style("allowed".to_string()).green(),
                Some(DenialKind::Unauthorized) => {
                    let tier: Vec<String> = policy.power_tier().iter().map(Role::to_string).collect();
                    style(format!("denied: no moderation power (needs one of {})", tier.join(", "))).red()
                }
                Some(_) => style("denied: target is not outranked".to_string()).red(),
            };
            format!(
                "{} (rank {}) -> {} (rank {}): {}",
                actor, report.actor_rank, target, report.target_rank, verdict
            )
        })
    }
}
