use anyhow::Result;
use clap::Subcommand;
use pairup_core::progress::{ProgressSummary, SessionSummary};

use super::{Context, NoticeExt};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Sessions, minutes and level (yours by default)
    Show { uid: Option<String> },
    /// Every finished session, newest first
    History { uid: Option<String> },
}

pub async fn run(ctx: &Context, action: ProgressAction) -> Result<()> {
    let progress = &ctx.app.progress;

    match action {
        ProgressAction::Show { uid } => {
            let uid = target(ctx, uid)?;
            let summary = progress.summary(&uid).await.notice("load progress")?;
            ctx.emit(&summary, render_summary)
        }
        ProgressAction::History { uid } => {
            let uid = target(ctx, uid)?;
            let history = progress.history(&uid).await.notice("load history")?;
            ctx.emit(&history, |list| render_history(list))
        }
    }
}

fn target(ctx: &Context, uid: Option<String>) -> Result<String> {
    match uid {
        Some(uid) => Ok(uid),
        None => Ok(ctx.actor()?.to_string()),
    }
}

fn render_summary(summary: &ProgressSummary) -> String {
    format!(
        "  sessions: {}\n  minutes:  {}\n  level:    {}\n--- recent ---\n{}",
        summary.sessions,
        summary.minutes,
        summary.level,
        render_history(&summary.recent)
    )
}

fn render_history(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "(no finished sessions)".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            format!(
                "{}  {}  {:>4} min  {:<8} {}",
                s.created_at.format("%Y-%m-%d"),
                s.seat.map(|slot| slot.to_string()).unwrap_or_else(|| "-".to_string()),
                s.minutes,
                s.grade.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string()),
                s.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
