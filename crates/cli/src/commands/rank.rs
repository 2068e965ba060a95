//! modctl rank command

use clap::Args;
use console::style;
use serde::Serialize;

use crate::commands::parse_role_args;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct RankCommand {
    /// Role labels (space or comma separated)
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankReport {
    effective_role: String,
    rank: u8,
    moderation_power: bool,
    ignored_labels: Vec<String>,
}

impl RankCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let roles = parse_role_args(&self.roles);
        let policy = rbac::ModerationPolicy::from_config(&ctx.config);
        let report = RankReport {
            effective_role: rbac::effective_role(&roles).to_string(),
            rank: rbac::rank(&roles),
            moderation_power: policy.has_moderation_power(&roles),
            ignored_labels: roles.unknown_labels().map(|l| l.to_string()).collect(),
        };

        ctx.emit(&report, || {
            let mut text = format!(
                "{} rank {} ({})",
                style(&report.effective_role).bold(),
                report.rank,
                if report.moderation_power {
                    style("moderation power").green()
                } else {
                    style("no moderation power").dim()
                }
            );
            if !report.ignored_labels.is_empty() {
                text.push_str(&format!("\nignored: {}", report.ignored_labels.join(", ")));
            }
            text
        })
    }
}
