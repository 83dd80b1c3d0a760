/// Row types for the slots and profiles tables
use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::booking::{Profile, Role, Slot, SlotStatus, StoreError};

/// Column list matching `DbSlot::from_row`.
pub const SLOT_COLUMNS: &str = "id, start_time, end_time, is_booked, student_id, status, created_at";

/// Column list matching `DbProfile::from_row`.
pub const PROFILE_COLUMNS: &str = "id, email, display_name, role, balance, created_at";

#[derive(Debug, Clone)]
pub struct DbSlot {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub student_id: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbSlot {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time: row.get(1)?,
            end_time: row.get(2)?,
            is_booked: row.get(3)?,
            student_id: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl TryFrom<DbSlot> for Slot {
    type Error = StoreError;

    fn try_from(row: DbSlot) -> Result<Self, Self::Error> {
        let status = row
            .status
            .as_deref()
            .map(str::parse::<SlotStatus>)
            .transpose()
            .map_err(|message| StoreError::Corrupt { message })?;

        Ok(Slot {
            id: row.id.into(),
            start_time: row.start_time,
            end_time: row.end_time,
            is_booked: row.is_booked,
            student_id: row.student_id.map(Into::into),
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DbProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl DbProfile {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            display_name: row.get(2)?,
            role: row.get(3)?,
            balance: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<DbProfile> for Profile {
    type Error = StoreError;

    fn try_from(row: DbProfile) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|message| StoreError::Corrupt { message })?;
        let balance = u32::try_from(row.balance).map_err(|_| StoreError::Corrupt {
            message: format!("balance {} out of range", row.balance),
        })?;

        Ok(Profile {
            id: row.id.into(),
            email: row.email,
            display_name: row.display_name,
            role,
            balance,
            created_at: row.created_at,
        })
    }
}
