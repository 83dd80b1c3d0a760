/// Types for slots, profiles and workflow outcomes
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

/// Identifier of a profile (student, teacher or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(format!("{:032x}", rand::thread_rng().gen::<u128>()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(SlotId);
string_id!(StudentId);

/// Lifecycle status of a slot. A slot with no status (`None`) is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Scheduled,
    Completed,
    Missed,
    CanceledStudent,
    CanceledTeacher,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Scheduled => "scheduled",
            SlotStatus::Completed => "completed",
            SlotStatus::Missed => "missed",
            SlotStatus::CanceledStudent => "canceled_student",
            SlotStatus::CanceledTeacher => "canceled_teacher",
        }
    }

    /// Returns true for the statuses that release a booking.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SlotStatus::CanceledStudent | SlotStatus::CanceledTeacher)
    }

    /// Returns true for the journal outcomes. Nothing moves a slot out of these
    /// back to `Scheduled`.
    pub fn is_outcome(&self) -> bool {
        matches!(self, SlotStatus::Completed | SlotStatus::Missed)
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SlotStatus::Scheduled),
            "completed" => Ok(SlotStatus::Completed),
            "missed" => Ok(SlotStatus::Missed),
            "canceled_student" => Ok(SlotStatus::CanceledStudent),
            "canceled_teacher" => Ok(SlotStatus::CanceledTeacher),
            other => Err(format!("unknown slot status `{other}`")),
        }
    }
}

/// A bookable unit of teaching time.
///
/// `is_booked` is true exactly when `student_id` is present; both stores
/// maintain this on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub student_id: Option<StudentId>,
    pub status: Option<SlotStatus>,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    /// Creates an unbooked slot with no status.
    pub fn open(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: SlotId::generate(),
            start_time,
            end_time,
            is_booked: false,
            student_id: None,
            status: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_held_by(&self, student: &StudentId) -> bool {
        self.is_booked && self.student_id.as_ref() == Some(student)
    }
}

/// Start and end of a slot that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Admins and teachers may manage slots.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// A user profile. The lesson balance lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: StudentId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub balance: u32,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(email: impl Into<String>, display_name: Option<String>, role: Role) -> Self {
        Self {
            id: StudentId::generate(),
            email: email.into(),
            display_name,
            role,
            balance: 0,
            created_at: Utc::now(),
        }
    }
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOutcome {
    pub slot: Slot,
    pub lessons_remaining: u32,
}

/// Result of a student-initiated cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOutcome {
    pub lesson_returned: bool,
}

/// Result of an admin status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    pub status: SlotStatus,
    /// Student who got a lesson back, if any.
    pub refunded: Option<StudentId>,
}

/// Result of deleting a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub refunded: Option<StudentId>,
}
