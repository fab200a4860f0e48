use anyhow::Result;
use clap::{ArgAction, Subcommand, builder::BoolishValueParser};
use pairup_core::user::{Role, UserProfile};

use super::{Context, NoticeExt, yes_no};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account and act as it from now on
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Driver, Navigator or Profesor
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },
    /// Show a profile (yours by default)
    Show { uid: Option<String> },
    /// Replace your language list
    Languages {
        #[arg(required = true)]
        languages: Vec<String>,
    },
    /// Mark yourself open (or not) to pairing invitations
    Available {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        available: bool,
    },
    /// Set your self-declared level
    Level { level: String },
    /// Mark yourself online or offline
    Online {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        online: bool,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).map_err(|e| e.to_string())
}

pub async fn run(ctx: &Context, action: UserAction) -> Result<()> {
    let accounts = &ctx.app.accounts;

    let profile = match action {
        UserAction::Register { name, email, role } => {
            let profile = accounts
                .register(&name, &email, role)
                .await
                .notice("register")?;
            ctx.remember_user(&profile.uid)?;
            profile
        }
        UserAction::Show { uid } => {
            let uid = match uid {
                Some(uid) => uid,
                None => ctx.actor()?.to_string(),
            };
            accounts.profile(&uid).await.notice("read profile")?
        }
        UserAction::Languages { languages } => accounts
            .update_languages(ctx.actor()?, &languages)
            .await
            .notice("save languages")?,
        UserAction::Available { available } => accounts
            .set_availability(ctx.actor()?, available)
            .await
            .notice("save availability")?,
        UserAction::Level { level } => accounts
            .set_level(ctx.actor()?, &level)
            .await
            .notice("save level")?,
        UserAction::Online { online } => accounts
            .set_online(ctx.actor()?, online)
            .await
            .notice("update status")?,
    };

    ctx.emit(&profile, render_profile)
}

fn render_profile(profile: &UserProfile) -> String {
    let languages = if profile.languages.is_empty() {
        "-".to_string()
    } else {
        profile.languages.join(", ")
    };
    let level = if profile.level.is_empty() {
        "-"
    } else {
        profile.level.as_str()
    };

    format!(
        "{} <{}>\n  uid:       {}\n  role:      {}\n  languages: {}\n  level:     {}\n  rating:    {:.1}\n  available: {}\n  online:    {}",
        profile.name,
        profile.email,
        profile.uid,
        profile.role,
        languages,
        level,
        profile.rating,
        yes_no(profile.available),
        yes_no(profile.active),
    )
}
