//! Teacher evaluation attached to a session.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Overall grade a teacher gives the students of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Grade {
    #[serde(alias = "Excelente")]
    #[strum(to_string = "Excellent", serialize = "Excelente")]
    Excellent,
    #[serde(alias = "Bueno")]
    #[strum(to_string = "Good", serialize = "Bueno")]
    Good,
    #[serde(alias = "Regular")]
    #[strum(to_string = "Fair", serialize = "Regular")]
    Fair,
    #[serde(alias = "Deficiente")]
    #[strum(to_string = "Poor", serialize = "Deficiente")]
    Poor,
}

/// Notes, grade and final feedback; each part is saved independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.grade.is_none() && self.feedback.is_none()
    }
}
