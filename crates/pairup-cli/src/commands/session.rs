use anyhow::{Context as _, Result};
use clap::Subcommand;
use pairup_application::SessionView;
use pairup_core::session::{
    ChatMessage, ClaimOutcome, Grade, Session, SessionEvent, Slot, TeacherNote,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

use super::{Context, NoticeExt, format_millis};

/// How often `watch` re-reads the store for changes made elsewhere.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session, seated in your role's slot
    Create,
    /// Active sessions with your slot free
    List,
    /// Take your role's slot in a session
    Join { session_id: String },
    /// Show a session the way your role sees it
    Open { session_id: String },
    /// Replace the shared code (Driver only)
    Code {
        session_id: String,
        /// Read the code from a file instead of the argument
        #[arg(long, conflicts_with = "code")]
        file: Option<PathBuf>,
        code: Option<String>,
    },
    /// Post to the session chat
    Chat {
        session_id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the session chat
    HistoryChat { session_id: String },
    /// End a session (Profesor only)
    Finalize { session_id: String },
    /// Follow a session's changes until interrupted
    Watch { session_id: String },
    /// Grade a session (Profesor only)
    Grade {
        session_id: String,
        #[arg(value_parser = parse_grade)]
        grade: Grade,
    },
    /// Save evaluation notes (Profesor only)
    Notes {
        session_id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Save final feedback (Profesor only)
    Feedback {
        session_id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Post to or read the private teacher chat (Profesor only)
    TeacherNote {
        session_id: String,
        text: Vec<String>,
    },
}

fn parse_grade(value: &str) -> Result<Grade, String> {
    Grade::from_str(value.trim()).map_err(|_| format!("unknown grade '{}'", value))
}

pub async fn run(ctx: &Context, action: SessionAction) -> Result<()> {
    let sessions = &ctx.app.sessions;

    match action {
        SessionAction::Create => {
            let session = sessions
                .create_session(ctx.actor()?)
                .await
                .notice("create session")?;
            ctx.emit(&session, render_session)
        }
        SessionAction::List => {
            let joinable = sessions
                .list_joinable(ctx.actor()?)
                .await
                .notice("load sessions")?;
            ctx.emit(&joinable, |list| {
                if list.is_empty() {
                    return "No sessions with a free seat for you.".to_string();
                }
                list.iter()
                    .map(|s| {
                        format!(
                            "{}  {}  {}",
                            s.id,
                            s.created_at.format("%Y-%m-%d %H:%M"),
                            seats_line(s)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        SessionAction::Join { session_id } => {
            let joined = sessions
                .join_session(&session_id, ctx.actor()?)
                .await
                .notice("join session")?;
            ctx.emit(&joined, |j| match j.outcome {
                ClaimOutcome::Seated => format!("Joined.\n{}", render_session(&j.session)),
                ClaimOutcome::AlreadySeated => {
                    format!("Already seated.\n{}", render_session(&j.session))
                }
            })
        }
        SessionAction::Open { session_id } => {
            let view = sessions
                .open_session(&session_id, ctx.actor()?)
                .await
                .notice("open session")?;
            ctx.emit(&view, render_view)
        }
        SessionAction::Code {
            session_id,
            file,
            code,
        } => {
            let code = match (file, code) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, Some(code)) => code,
                (None, None) => anyhow::bail!("pass the code or --file <PATH>"),
            };
            let session = sessions
                .update_code(&session_id, ctx.actor()?, &code)
                .await
                .notice("save code")?;
            ctx.emit(&session, |_| "Code saved.".to_string())
        }
        SessionAction::Chat { session_id, text } => {
            let message = sessions
                .send_chat(&session_id, ctx.actor()?, &text.join(" "))
                .await
                .notice("send message")?;
            ctx.emit(&message, render_chat_line)
        }
        SessionAction::HistoryChat { session_id } => {
            let history = sessions
                .chat_history(&session_id)
                .await
                .notice("load chat")?;
            ctx.emit(&history, |messages| render_chat(messages))
        }
        SessionAction::Finalize { session_id } => {
            let session = sessions
                .finalize_session(&session_id, ctx.actor()?)
                .await
                .notice("finalize session")?;
            ctx.emit(&session, |_| "Session finalized.".to_string())
        }
        SessionAction::Watch { session_id } => watch(ctx, &session_id).await,
        SessionAction::Grade { session_id, grade } => {
            let session = sessions
                .grade(&session_id, ctx.actor()?, grade)
                .await
                .notice("save grade")?;
            ctx.emit(&session, |s| render_evaluation(s))
        }
        SessionAction::Notes { session_id, text } => {
            let session = sessions
                .save_notes(&session_id, ctx.actor()?, &text.join(" "))
                .await
                .notice("save notes")?;
            ctx.emit(&session, |s| render_evaluation(s))
        }
        SessionAction::Feedback { session_id, text } => {
            let session = sessions
                .save_feedback(&session_id, ctx.actor()?, &text.join(" "))
                .await
                .notice("save feedback")?;
            ctx.emit(&session, |s| render_evaluation(s))
        }
        SessionAction::TeacherNote { session_id, text } => {
            let actor = ctx.actor()?;
            if !text.is_empty() {
                sessions
                    .send_teacher_note(&session_id, actor, &text.join(" "))
                    .await
                    .notice("send note")?;
            }
            let notes = sessions
                .teacher_notes(&session_id, actor)
                .await
                .notice("load teacher chat")?;
            ctx.emit(&notes, |notes| render_teacher_notes(notes))
        }
    }
}

/// Prints the session's events until Ctrl-C or the session ends.
async fn watch(ctx: &Context, session_id: &str) -> Result<()> {
    let actor = ctx.actor()?;
    // The poller's baseline must predate the render.
    let cancel = CancellationToken::new();
    let stop_poller = cancel.clone().drop_guard();
    let poller = ctx
        .repos
        .poll_foreign_writes(POLL_INTERVAL, cancel.clone())
        .await;

    let (watcher, mut events) = ctx
        .app
        .watch(session_id, actor)
        .await
        .notice("open session")?;
    let view = ctx
        .app
        .sessions
        .open_session(session_id, actor)
        .await
        .notice("open session")?;
    ctx.emit(&view, render_view)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                let finished = matches!(&event, SessionEvent::Updated(s) if !s.active);
                ctx.emit(&EventLine::from(&event), |line| line.text.clone())?;
                if finished {
                    break;
                }
            }
        }
    }

    watcher.cancel();
    drop(stop_poller);
    if let Some(poller) = poller {
        if let Err(e) = poller.await {
            tracing::warn!("Session poller ended abnormally: {}", e);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct EventLine {
    session_id: String,
    kind: &'static str,
    text: String,
}

impl From<&SessionEvent> for EventLine {
    fn from(event: &SessionEvent) -> Self {
        let (kind, text) = match event {
            SessionEvent::Updated(session) if !session.active => {
                ("finished", "Session finalized.".to_string())
            }
            SessionEvent::Updated(session) => (
                "updated",
                format!("[session] {}\n{}", seats_line(session), session.code),
            ),
            SessionEvent::ChatAppended { message, .. } => ("chat", render_chat_line(message)),
            SessionEvent::TeacherNoteAppended { note, .. } => {
                ("teacher_note", render_teacher_line(note))
            }
        };
        Self {
            session_id: event.session_id().to_string(),
            kind,
            text,
        }
    }
}

fn seats_line(session: &Session) -> String {
    Slot::iter()
        .map(|slot| format!("{}={}", slot, session.slots.occupant(slot).unwrap_or("-")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_session(session: &Session) -> String {
    format!(
        "session {}\n  status: {}\n  seats:  {}",
        session.id,
        if session.active { "active" } else { "finished" },
        seats_line(session)
    )
}

fn render_view(view: &SessionView) -> String {
    match view {
        SessionView::Participant(v) => format!(
            "{}\n  you:    {}{}\n--- code ---\n{}\n--- chat ---\n{}",
            render_session(&v.session),
            v.seat,
            if v.can_edit_code { " (can edit)" } else { "" },
            v.session.code,
            render_chat(&v.chat)
        ),
        SessionView::Teacher(panel) => {
            let participants = panel
                .participants
                .iter()
                .map(|p| format!("  {:<10} {}", p.slot.to_string(), p.name))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "{}\n--- participants ---\n{}\n--- code ---\n{}\n--- chat ---\n{}\n--- teacher chat ---\n{}\n--- evaluation ---\n{}",
                render_session(&panel.session),
                participants,
                panel.session.code,
                render_chat(&panel.chat),
                render_teacher_notes(&panel.teacher_notes),
                render_evaluation(&panel.session)
            )
        }
    }
}

fn render_chat_line(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        format_millis(message.timestamp),
        message.uid,
        message.text
    )
}

fn render_chat(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "(no messages)".to_string();
    }
    messages
        .iter()
        .map(render_chat_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_teacher_line(note: &TeacherNote) -> String {
    format!(
        "[{}] {}: {}",
        format_millis(note.timestamp),
        note.teacher_id,
        note.text
    )
}

fn render_teacher_notes(notes: &[TeacherNote]) -> String {
    if notes.is_empty() {
        return "(no notes)".to_string();
    }
    notes
        .iter()
        .map(render_teacher_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_evaluation(session: &Session) -> String {
    let eval = &session.evaluation;
    format!(
        "  grade:    {}\n  notes:    {}\n  feedback: {}",
        eval.grade.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string()),
        eval.notes.as_deref().unwrap_or("-"),
        eval.feedback.as_deref().unwrap_or("-"),
    )
}
