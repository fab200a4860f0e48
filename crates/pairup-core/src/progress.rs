//! Progress metrics derived from finished sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::session::{Grade, Session, Slot};

/// Finished sessions needed to reach each level.
pub const INTERMEDIATE_THRESHOLD: usize = 10;
pub const ADVANCED_THRESHOLD: usize = 25;

/// How many recent sessions a summary lists.
pub const RECENT_LIMIT: usize = 10;

/// Placeholder shown for an empty seat.
const VACANT_LABEL: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ProgressLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ProgressLevel {
    pub fn for_session_count(count: usize) -> Self {
        if count >= ADVANCED_THRESHOLD {
            Self::Advanced
        } else if count >= INTERMEDIATE_THRESHOLD {
            Self::Intermediate
        } else {
            Self::Beginner
        }
    }
}

/// One finished session as shown in a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    /// "Driver: <name> - Navigator: <name>"
    pub title: String,
    pub seat: Option<Slot>,
    pub created_at: DateTime<Utc>,
    pub minutes: i64,
    pub grade: Option<Grade>,
}

/// Aggregate progress for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub sessions: usize,
    pub minutes: i64,
    pub level: ProgressLevel,
    pub recent: Vec<SessionSummary>,
}

impl ProgressSummary {
    /// Builds the summary for `uid` from any set of sessions.
    ///
    /// Only finished sessions the user was seated in count. `names` maps
    /// user ids to display names; unknown ids are shown as-is.
    pub fn compute(uid: &str, sessions: &[Session], names: &HashMap<String, String>) -> Self {
        let history = history_for(uid, sessions, names);
        let minutes = history.iter().map(|s| s.minutes).sum();

        Self {
            sessions: history.len(),
            minutes,
            level: ProgressLevel::for_session_count(history.len()),
            recent: history.into_iter().take(RECENT_LIMIT).collect(),
        }
    }
}

/// Finished sessions `uid` took part in, newest first.
pub fn history_for(
    uid: &str,
    sessions: &[Session],
    names: &HashMap<String, String>,
) -> Vec<SessionSummary> {
    let mut finished: Vec<&Session> = sessions
        .iter()
        .filter(|s| !s.active && s.is_participant(uid))
        .collect();
    finished.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    finished
        .into_iter()
        .map(|session| SessionSummary {
            session_id: session.id.clone(),
            title: title_for(session, names),
            seat: session.slots.seat_of(uid),
            created_at: session.created_at,
            minutes: session.duration_minutes(),
            grade: session.evaluation.grade,
        })
        .collect()
}

fn title_for(session: &Session, names: &HashMap<String, String>) -> String {
    let label = |slot: Slot| -> String {
        match session.slots.occupant(slot) {
            Some(uid) => names.get(uid).cloned().unwrap_or_else(|| uid.to_string()),
            None => VACANT_LABEL.to_string(),
        }
    };
    format!(
        "Driver: {} - Navigator: {}",
        label(Slot::Driver),
        label(Slot::Navigator)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;
    use chrono::Duration;

    fn finished(creator: &str, role: Role, minutes: i64, age_hours: i64) -> Session {
        let mut s = Session::new(creator, role).unwrap();
        s.created_at = Utc::now() - Duration::hours(age_hours);
        s.active = false;
        s.ended_at = Some(s.created_at + Duration::minutes(minutes));
        s
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(ProgressLevel::for_session_count(0), ProgressLevel::Beginner);
        assert_eq!(ProgressLevel::for_session_count(9), ProgressLevel::Beginner);
        assert_eq!(ProgressLevel::for_session_count(10), ProgressLevel::Intermediate);
        assert_eq!(ProgressLevel::for_session_count(24), ProgressLevel::Intermediate);
        assert_eq!(ProgressLevel::for_session_count(25), ProgressLevel::Advanced);
    }

    #[test]
    fn test_only_finished_sessions_of_user_count() {
        let mut mine = finished("d", Role::Driver, 30, 2);
        mine.slots.navigator = Some("n".to_string());
        let other = finished("x", Role::Driver, 50, 1);
        let live = Session::new("d", Role::Driver).unwrap();

        let names = HashMap::from([("d".to_string(), "Dana".to_string())]);
        let summary = ProgressSummary::compute("d", &[mine, other, live], &names);

        assert_eq!(summary.sessions, 1);
        assert_eq!(summary.minutes, 30);
        assert_eq!(summary.level, ProgressLevel::Beginner);
        assert_eq!(summary.recent[0].title, "Driver: Dana - Navigator: n");
        assert_eq!(summary.recent[0].seat, Some(Slot::Driver));
    }

    #[test]
    fn test_recent_is_newest_first_and_capped() {
        let sessions: Vec<Session> = (0..12)
            .map(|age| finished("p", Role::Profesor, 10, age + 1))
            .collect();
        let summary = ProgressSummary::compute("p", &sessions, &HashMap::new());

        assert_eq!(summary.sessions, 12);
        assert_eq!(summary.minutes, 120);
        assert_eq!(summary.level, ProgressLevel::Intermediate);
        assert_eq!(summary.recent.len(), RECENT_LIMIT);
        assert_eq!(summary.recent[0].session_id, sessions[0].id);
        assert_eq!(summary.recent[0].title, "Driver: ? - Navigator: ?");
    }
}
