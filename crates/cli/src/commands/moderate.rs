//! modctl ban / unban / timeout / roles / status commands

use anyhow::{anyhow, bail};
use audit::{AuditEntry, SharedAuditLog};
use authority::ModerationAuthority;
use clap::Args;
use console::style;
use serde::Serialize;
use shared::{ModerationEffect, ModerationError, ModerationStatus, Uid, VerifiedIdentity};
use std::sync::Arc;
use store::JsonFileProfileStore;

use crate::commands::parse_role_args;
use crate::context::Context;

type FileAuthority = ModerationAuthority<JsonFileProfileStore>;

/// Authority over the context's store, with an audit log sized from the config
fn authority(ctx: &Context) -> anyhow::Result<(FileAuthority, SharedAuditLog)> {
    let audit = SharedAuditLog::new(ctx.config.audit_capacity);
    let mut authority = ModerationAuthority::from_config(ctx.open_store()?, &ctx.config);
    authority.subscribe(Arc::new(audit.clone()));
    Ok((authority, audit))
}

/// Result of one moderation command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionReport {
    target: Uid,
    effect: ModerationEffect,
    audit: Option<AuditEntry>,
}

/// Run one action and pair its effect with the audit entry it produced
fn perform(
    ctx: &Context,
    target: Uid,
    action: impl FnOnce(
        &mut FileAuthority,
        Option<&VerifiedIdentity>,
        &Uid,
    ) -> Result<ModerationEffect, ModerationError>,
) -> anyhow::Result<ActionReport> {
    let (mut authority, audit) = authority(ctx)?;
    let result = action(&mut authority, ctx.identity().as_ref(), &target);

    let entry = audit.with(|log| log.get_recent(1).first().map(|e| (*e).clone()));
    if let Some(entry) = &entry {
        tracing::info!(
            id = %entry.id,
            event_type = ?entry.event_type,
            success = entry.success,
            reason = ?entry.reason,
            "audit entry recorded"
        );
    }

    Ok(ActionReport {
        target,
        effect: result?,
        audit: entry,
    })
}

fn report(ctx: &Context, report: &ActionReport) -> anyhow::Result<()> {
    ctx.emit(report, || {
        let what = match &report.effect {
            ModerationEffect::Banned => "banned".to_string(),
            ModerationEffect::TimedOut { until } => format!("timed out until {}", until.to_rfc3339()),
            ModerationEffect::Unbanned => "unbanned".to_string(),
            ModerationEffect::RolesChanged { roles } => format!("now has roles {}", roles),
        };
        format!("{} {} {}", style("✓").green(), style(&report.target).bold(), what)
    })
}

#[derive(Debug, Args)]
pub struct BanCommand {
    /// User to ban
    pub target: String,
}

impl BanCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let target = Uid::parse(&self.target)?;
        let done = perform(ctx, target, |auth, who, target| auth.apply_ban(who, target))?;
        report(ctx, &done)
    }
}

#[derive(Debug, Args)]
pub struct UnbanCommand {
    /// User to unban (also lifts any timeout)
    pub target: String,
}

impl UnbanCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let target = Uid::parse(&self.target)?;
        let done = perform(ctx, target, |auth, who, target| auth.apply_unban(who, target))?;
        report(ctx, &done)
    }
}

#[derive(Debug, Args)]
pub struct TimeoutCommand {
    /// User to time out
    pub target: String,

    /// Duration in minutes
    #[arg(short, long, conflicts_with = "preset")]
    pub minutes: Option<i64>,

    /// Named duration from the config (short, hour, day by default)
    #[arg(short, long)]
    pub preset: Option<String>,
}

impl TimeoutCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let target = Uid::parse(&self.target)?;
        let minutes = self.resolve_minutes(ctx)?;
        let done = perform(ctx, target, |auth, who, target| {
            auth.apply_timeout(who, target, minutes)
        })?;
        report(ctx, &done)
    }

    fn resolve_minutes(&self, ctx: &Context) -> anyhow::Result<i64> {
        match (&self.minutes, &self.preset) {
            (Some(minutes), _) => Ok(*minutes),
            (None, Some(name)) => ctx.config.preset_minutes(name).ok_or_else(|| {
                let known: Vec<&str> = ctx.config.timeout_presets.keys().map(String::as_str).collect();
                anyhow!("unknown timeout preset '{}' (known: {})", name, known.join(", "))
            }),
            (None, None) => bail!("pass --minutes or --preset"),
        }
    }
}

#[derive(Debug, Args)]
pub struct RolesCommand {
    /// User whose roles are replaced
    pub target: String,

    /// New role labels; `member` is always kept
    pub roles: Vec<String>,
}

impl RolesCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let target = Uid::parse(&self.target)?;
        let roles = parse_role_args(&self.roles);
        for label in roles.unknown_labels() {
            tracing::warn!(label = %label, "label is not part of the role hierarchy");
        }
        let done = perform(ctx, target, |auth, who, target| {
            auth.apply_role_change(who, target, roles)
        })?;
        report(ctx, &done)
    }
}

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// User to inspect
    pub uid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    uid: String,
    roles: Vec<String>,
    rank: u8,
    is_banned: bool,
    timeout_until: Option<String>,
    can_post: bool,
}

impl StatusCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let uid = Uid::parse(&self.uid)?;
        let (authority, _) = authority(ctx)?;
        let profile = authority.profile(&uid)?;
        let status = authority.status_of(&profile);

        let report = StatusReport {
            uid: uid.to_string(),
            roles: profile.roles.labels().map(|l| l.to_string()).collect(),
            rank: rbac::rank(&profile.roles),
            is_banned: profile.is_banned,
            timeout_until: profile.timeout_until.map(|t| t.to_rfc3339()),
            can_post: status == ModerationStatus::Active,
        };

        ctx.emit(&report, || {
            let state = match status {
                ModerationStatus::Active => style("active".to_string()).green(),
                ModerationStatus::TimedOut { until } => {
                    style(format!("timed out until {}", until.to_rfc3339())).yellow()
                }
                ModerationStatus::Banned => style("banned".to_string()).red(),
            };
            format!(
                "{} {} rank {}: {}",
                style(&report.uid).bold(),
                profile.roles,
                report.rank,
                state
            )
        })
    }
}
