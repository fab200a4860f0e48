use anyhow::Result;
use clap::Subcommand;
use pairup_core::user::{Notification, NotificationKind};
use std::str::FromStr;

use super::{Context, NoticeExt, format_millis};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// Your inbox, oldest first
    List,
    /// Deliver a notification to someone
    Push {
        uid: String,
        #[arg(long, default_value = "Notification")]
        title: String,
        /// general, session or warning
        #[arg(long, default_value = "general", value_parser = parse_kind)]
        kind: NotificationKind,
        #[arg(required = true)]
        message: Vec<String>,
    },
}

fn parse_kind(value: &str) -> Result<NotificationKind, String> {
    NotificationKind::from_str(value.trim())
        .map_err(|_| format!("unknown notification kind '{}'", value))
}

pub async fn run(ctx: &Context, action: NotificationAction) -> Result<()> {
    let community = &ctx.app.community;

    match action {
        NotificationAction::List => {
            let inbox = community
                .notifications(ctx.actor()?)
                .await
                .notice("load notifications")?;
            ctx.emit(&inbox, |list| {
                if list.is_empty() {
                    return "No notifications.".to_string();
                }
                list.iter().map(render_notification).collect::<Vec<_>>().join("\n")
            })
        }
        NotificationAction::Push {
            uid,
            title,
            kind,
            message,
        } => {
            let notification = Notification::new(title, message.join(" "), kind);
            community
                .notify(&uid, &notification)
                .await
                .notice("send notification")?;
            ctx.emit(&notification, |n| format!("Sent to {}.\n{}", uid, render_notification(n)))
        }
    }
}

fn render_notification(notification: &Notification) -> String {
    format!(
        "[{}] ({}) {}: {}",
        format_millis(notification.timestamp),
        notification.kind,
        notification.title,
        notification.message
    )
}
