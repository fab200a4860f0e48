use anyhow::Result;
use clap::Subcommand;
use pairup_core::testimonial::{MAX_STARS, MIN_STARS, Testimonial};
use pairup_core::user::UserProfile;

use super::{Context, NoticeExt, yes_no};

#[derive(Subcommand)]
pub enum CommunityAction {
    /// Read what members say about PairUp
    Testimonials,
    /// Leave a testimonial
    Testify {
        /// Rating from 1 to 5
        #[arg(long, default_value_t = MAX_STARS)]
        stars: u8,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Everyone on PairUp, online first
    Members,
    /// Find partners by name or language
    Search {
        query: Option<String>,
        /// Only members open to invitations
        #[arg(long)]
        available: bool,
    },
}

pub async fn run(ctx: &Context, action: CommunityAction) -> Result<()> {
    let community = &ctx.app.community;

    match action {
        CommunityAction::Testimonials => {
            let testimonials = community
                .list_testimonials()
                .await
                .notice("load testimonials")?;
            ctx.emit(&testimonials, |list| {
                if list.is_empty() {
                    return "No testimonials yet.".to_string();
                }
                list.iter().map(render_testimonial).collect::<Vec<_>>().join("\n\n")
            })
        }
        CommunityAction::Testify { stars, text } => {
            let testimonial = community
                .post_testimonial(ctx.actor()?, &text.join(" "), stars)
                .await
                .notice("post testimonial")?;
            ctx.emit(&testimonial, render_testimonial)
        }
        CommunityAction::Members => {
            let members = community.members().await.notice("load members")?;
            ctx.emit(&members, |list| render_members(list, "No members yet."))
        }
        CommunityAction::Search { query, available } => {
            let partners = community
                .search_partners(ctx.actor()?, query.as_deref().unwrap_or(""), available)
                .await
                .notice("search partners")?;
            ctx.emit(&partners, |list| render_members(list, "Nobody matched."))
        }
    }
}

fn render_testimonial(testimonial: &Testimonial) -> String {
    let stars = usize::from(testimonial.stars.clamp(MIN_STARS, MAX_STARS));
    format!(
        "{}{}  {}\n  {}",
        "*".repeat(stars),
        " ".repeat(usize::from(MAX_STARS) - stars),
        testimonial.author,
        testimonial.text
    )
}

fn render_members(members: &[UserProfile], empty: &str) -> String {
    if members.is_empty() {
        return empty.to_string();
    }
    members
        .iter()
        .map(|m| {
            let languages = if m.languages.is_empty() {
                "-".to_string()
            } else {
                m.languages.join(", ")
            };
            format!(
                "{:<20} {:<10} rating={:<4.1} online={:<3} available={:<3} {}",
                m.name,
                m.role.to_string(),
                m.rating,
                yes_no(m.active),
                yes_no(m.available),
                languages
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
