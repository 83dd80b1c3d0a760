/// SQLite-backed store for profiles, slots and sessions

mod types;

pub use types::{DbProfile, DbSlot};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::auth::{IdentityStore, TokenHash};
use crate::booking::{
    BalanceLedger, BookingError, NewSlot, Profile, Slot, SlotId, SlotRegistry, SlotStatus,
    StoreError, StudentId,
};
use types::{PROFILE_COLUMNS, SLOT_COLUMNS};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_bookings.sql");

/// SQLite unique-constraint violation, extended result code.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

pub struct BookingDb {
    db: Mutex<Connection>,
}

impl BookingDb {
    /// Opens (or creates) the database at `path` and initializes the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Opened booking database at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn slot_row(conn: &Connection, slot: &SlotId) -> Result<Option<Slot>, BookingError> {
        let row = conn
            .query_row(
                &format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = ?1"),
                [slot.as_str()],
                DbSlot::from_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row.map(Slot::try_from).transpose()?)
    }

    fn profile_row(conn: &Connection, student: &StudentId) -> Result<Option<Profile>, BookingError> {
        let row = conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                [student.as_str()],
                DbProfile::from_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row.map(Profile::try_from).transpose()?)
    }

    fn slot_exists(conn: &Connection, slot: &SlotId) -> Result<bool, BookingError> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM slots WHERE id = ?1",
                [slot.as_str()],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;
        Ok(count > 0)
    }

    fn query_slots(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Slot>, BookingError> {
        let mut stmt = conn.prepare(sql).map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params, DbSlot::from_row)
            .map_err(StoreError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)?;

        rows.into_iter()
            .map(|row| Slot::try_from(row).map_err(BookingError::from))
            .collect()
    }
}

impl BalanceLedger for BookingDb {
    fn profile(&self, student: &StudentId) -> Result<Option<Profile>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        Self::profile_row(&db, student)
    }

    fn decrement(&self, student: &StudentId) -> Result<u32, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let remaining: Option<i64> = db
            .query_row(
                "UPDATE profiles SET balance = balance - 1
                 WHERE id = ?1 AND balance > 0
                 RETURNING balance",
                [student.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;

        match remaining {
            Some(balance) => Ok(u32::try_from(balance).unwrap_or_default()),
            None if Self::profile_row(&db, student)?.is_some() => {
                Err(BookingError::InsufficientBalance)
            }
            None => Err(BookingError::ProfileNotFound),
        }
    }

    fn increment_by(&self, student: &StudentId, lessons: u32) -> Result<u32, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let balance: Option<i64> = db
            .query_row(
                "UPDATE profiles SET balance = balance + ?2 WHERE id = ?1 RETURNING balance",
                params![student.as_str(), lessons],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;

        balance
            .map(|b| u32::try_from(b).unwrap_or(u32::MAX))
            .ok_or(BookingError::ProfileNotFound)
    }
}

impl SlotRegistry for BookingDb {
    fn get(&self, slot: &SlotId) -> Result<Option<Slot>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        Self::slot_row(&db, slot)
    }

    fn book(&self, slot: &SlotId, student: &StudentId) -> Result<Slot, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        // Compare-and-set: only an unbooked slot can be taken
        let changed = db
            .execute(
                "UPDATE slots SET is_booked = 1, student_id = ?2, status = ?3
                 WHERE id = ?1 AND is_booked = 0",
                params![slot.as_str(), student.as_str(), SlotStatus::Scheduled.as_str()],
            )
            .map_err(StoreError::from)?;

        if changed == 0 {
            return Err(if Self::slot_exists(&db, slot)? {
                BookingError::SlotAlreadyBooked
            } else {
                BookingError::SlotNotFound
            });
        }

        Self::slot_row(&db, slot)?.ok_or(BookingError::SlotNotFound)
    }

    fn unbook(&self, slot: &SlotId, student: &StudentId) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let changed = db
            .execute(
                "UPDATE slots SET is_booked = 0, student_id = NULL, status = NULL
                 WHERE id = ?1 AND student_id = ?2",
                params![slot.as_str(), student.as_str()],
            )
            .map_err(StoreError::from)?;

        match changed {
            0 if Self::slot_exists(&db, slot)? => Err(BookingError::NotOwner),
            0 => Err(BookingError::SlotNotFound),
            _ => Ok(()),
        }
    }

    fn rebook(&self, snapshot: &Slot) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let changed = db
            .execute(
                "UPDATE slots SET is_booked = ?2, student_id = ?3, status = ?4
                 WHERE id = ?1 AND is_booked = 0",
                params![
                    snapshot.id.as_str(),
                    snapshot.student_id.is_some(),
                    snapshot.student_id.as_ref().map(StudentId::as_str),
                    snapshot.status.map(|s| s.as_str()),
                ],
            )
            .map_err(StoreError::from)?;

        match changed {
            0 if Self::slot_exists(&db, &snapshot.id)? => Err(BookingError::SlotAlreadyBooked),
            0 => Err(BookingError::SlotNotFound),
            _ => Ok(()),
        }
    }

    fn release(
        &self,
        slot: &SlotId,
        student: &StudentId,
        status: SlotStatus,
    ) -> Result<(), BookingError> {
        if !status.is_cancellation() {
            return Err(BookingError::InvalidStatus(status.to_string()));
        }
        let db = self.db.lock().map_err(StoreError::from)?;
        let changed = db
            .execute(
                "UPDATE slots SET is_booked = 0, student_id = NULL, status = ?2
                 WHERE id = ?1 AND is_booked = 1 AND student_id = ?3",
                params![slot.as_str(), status.as_str(), student.as_str()],
            )
            .map_err(StoreError::from)?;

        match changed {
            0 if Self::slot_exists(&db, slot)? => Err(BookingError::NotOwner),
            0 => Err(BookingError::SlotNotFound),
            _ => Ok(()),
        }
    }

    fn set_status(&self, slot: &SlotId, status: SlotStatus) -> Result<Slot, BookingError> {
        if matches!(status, SlotStatus::Scheduled | SlotStatus::CanceledStudent) {
            return Err(BookingError::InvalidStatus(status.to_string()));
        }
        let db = self.db.lock().map_err(StoreError::from)?;
        let previous = Self::slot_row(&db, slot)?.ok_or(BookingError::SlotNotFound)?;

        let sql = if status == SlotStatus::CanceledTeacher {
            "UPDATE slots SET status = ?2, is_booked = 0, student_id = NULL WHERE id = ?1"
        } else {
            "UPDATE slots SET status = ?2 WHERE id = ?1"
        };
        db.execute(sql, params![slot.as_str(), status.as_str()])
            .map_err(StoreError::from)?;

        Ok(previous)
    }

    fn delete(&self, slot: &SlotId) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let changed = db
            .execute("DELETE FROM slots WHERE id = ?1", [slot.as_str()])
            .map_err(StoreError::from)?;

        if changed == 0 {
            return Err(BookingError::SlotNotFound);
        }
        Ok(())
    }

    fn slots_for_student(&self, student: &StudentId) -> Result<Vec<Slot>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        Self::query_slots(
            &db,
            &format!(
                "SELECT {SLOT_COLUMNS} FROM slots WHERE student_id = ?1 ORDER BY start_time ASC"
            ),
            [student.as_str()],
        )
    }

    fn slots_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_open: bool,
    ) -> Result<Vec<Slot>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let open_filter = if only_open { "AND is_booked = 0" } else { "" };
        Self::query_slots(
            &db,
            &format!(
                "SELECT {SLOT_COLUMNS} FROM slots
                 WHERE start_time >= ?1 AND start_time <= ?2 {open_filter}
                 ORDER BY start_time ASC"
            ),
            params![from, to],
        )
    }

    fn insert_slots(&self, slots: &[NewSlot]) -> Result<usize, BookingError> {
        let mut db = self.db.lock().map_err(StoreError::from)?;
        let tx = db.transaction().map_err(StoreError::from)?;
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO slots (id, start_time, end_time, is_booked, created_at)
                     VALUES (?1, ?2, ?3, 0, ?4)",
                )
                .map_err(StoreError::from)?;

            for new in slots {
                inserted += stmt
                    .execute(params![
                        SlotId::generate().as_str(),
                        new.start_time,
                        new.end_time,
                        Utc::now(),
                    ])
                    .map_err(StoreError::from)?;
            }
        }
        tx.commit().map_err(StoreError::from)?;
        Ok(inserted)
    }
}

impl IdentityStore for BookingDb {
    fn create_profile(&self, profile: &Profile) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let result = db.execute(
            "INSERT INTO profiles (id, email, display_name, role, balance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.id.as_str(),
                profile.email,
                profile.display_name,
                profile.role.as_str(),
                profile.balance,
                profile.created_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(BookingError::EmailTaken(profile.email.clone()))
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let row = db
            .query_row(
                &format!(
                    "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1 COLLATE NOCASE"
                ),
                [email],
                DbProfile::from_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row.map(Profile::try_from).transpose()?)
    }

    fn store_session(&self, hash: &TokenHash, profile: &StudentId) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        if Self::profile_row(&db, profile)?.is_none() {
            return Err(BookingError::ProfileNotFound);
        }
        db.execute(
            "INSERT INTO sessions (token_hash, profile_id, created_at) VALUES (?1, ?2, ?3)",
            params![hash.as_str(), profile.as_str(), Utc::now()],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }

    fn profile_for_session(&self, hash: &TokenHash) -> Result<Option<Profile>, BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        let row = db
            .query_row(
                "SELECT p.id, p.email, p.display_name, p.role, p.balance, p.created_at
                 FROM sessions s
                 JOIN profiles p ON s.profile_id = p.id
                 WHERE s.token_hash = ?1",
                [hash.as_str()],
                DbProfile::from_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row.map(Profile::try_from).transpose()?)
    }

    fn ping(&self) -> Result<(), BookingError> {
        let db = self.db.lock().map_err(StoreError::from)?;
        db.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(StoreError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionToken;
    use crate::booking::Role;
    use chrono::Duration;
    use std::sync::Arc;

    fn db() -> BookingDb {
        BookingDb::open_in_memory().unwrap()
    }

    fn student(db: &BookingDb, balance: u32) -> StudentId {
        let mut profile = Profile::new(
            format!("{}@example.com", StudentId::generate()),
            None,
            Role::Student,
        );
        profile.balance = balance;
        db.create_profile(&profile).unwrap();
        profile.id
    }

    fn slot(db: &BookingDb, lead: Duration) -> SlotId {
        let start = Utc::now() + lead;
        let new = NewSlot {
            start_time: start,
            end_time: start + Duration::hours(1),
        };
        assert_eq!(db.insert_slots(&[new]).unwrap(), 1);
        db.slots_between(start, start, false).unwrap().remove(0).id
    }

    #[test]
    fn test_book_is_compare_and_set() {
        let db = db();
        let a = student(&db, 1);
        let b = student(&db, 1);
        let s = slot(&db, Duration::days(1));

        let booked = db.book(&s, &a).unwrap();
        assert!(booked.is_held_by(&a));
        assert_eq!(booked.status, Some(SlotStatus::Scheduled));
        assert!(matches!(db.book(&s, &b), Err(BookingError::SlotAlreadyBooked)));
        assert!(matches!(
            db.book(&SlotId::generate(), &b),
            Err(BookingError::SlotNotFound)
        ));
    }

    #[test]
    fn test_decrement_never_goes_negative() {
        let db = db();
        let a = student(&db, 1);
        assert_eq!(db.decrement(&a).unwrap(), 0);
        assert!(matches!(db.decrement(&a), Err(BookingError::InsufficientBalance)));
        assert!(matches!(
            db.decrement(&StudentId::generate()),
            Err(BookingError::ProfileNotFound)
        ));
        assert_eq!(db.increment(&a).unwrap(), 1);
        assert_eq!(db.increment_by(&a, 4).unwrap(), 5);
    }

    #[test]
    fn test_release_and_rebook() {
        let db = db();
        let a = student(&db, 1);
        let s = slot(&db, Duration::days(1));
        let snapshot = db.book(&s, &a).unwrap();

        db.release(&s, &a, SlotStatus::CanceledStudent).unwrap();
        let released = db.get(&s).unwrap().unwrap();
        assert!(!released.is_booked);
        assert_eq!(released.student_id, None);
        assert_eq!(released.status, Some(SlotStatus::CanceledStudent));

        db.rebook(&snapshot).unwrap();
        assert!(db.get(&s).unwrap().unwrap().is_held_by(&a));
        assert!(matches!(db.rebook(&snapshot), Err(BookingError::SlotAlreadyBooked)));
        assert!(matches!(
            db.release(&s, &a, SlotStatus::Completed),
            Err(BookingError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_release_is_conditional_on_holder() {
        let db = db();
        let a = student(&db, 1);
        let b = student(&db, 1);
        let s = slot(&db, Duration::days(1));
        db.book(&s, &a).unwrap();

        db.release(&s, &a, SlotStatus::CanceledStudent).unwrap();
        assert!(matches!(
            db.release(&s, &a, SlotStatus::CanceledStudent),
            Err(BookingError::NotOwner)
        ));

        db.book(&s, &b).unwrap();
        assert!(matches!(
            db.release(&s, &a, SlotStatus::CanceledStudent),
            Err(BookingError::NotOwner)
        ));
        assert!(db.get(&s).unwrap().unwrap().is_held_by(&b));
        assert!(matches!(
            db.release(&SlotId::generate(), &a, SlotStatus::CanceledStudent),
            Err(BookingError::SlotNotFound)
        ));
    }

    #[test]
    fn test_overlapping_cancellations_refund_once() {
        use crate::booking::{BookingWorkflow, CancellationPolicy};
        use crate::notify::Dispatcher;
        use std::sync::Barrier;

        /// Holds every `get` until both cancellations have read the slot.
        struct Lockstep {
            db: BookingDb,
            barrier: Barrier,
        }

        impl BalanceLedger for Lockstep {
            fn profile(&self, student: &StudentId) -> Result<Option<Profile>, BookingError> {
                self.db.profile(student)
            }
            fn decrement(&self, student: &StudentId) -> Result<u32, BookingError> {
                self.db.decrement(student)
            }
            fn increment_by(&self, student: &StudentId, lessons: u32) -> Result<u32, BookingError> {
                self.db.increment_by(student, lessons)
            }
        }

        impl SlotRegistry for Lockstep {
            fn get(&self, slot: &SlotId) -> Result<Option<Slot>, BookingError> {
                let found = self.db.get(slot);
                self.barrier.wait();
                found
            }
            fn book(&self, slot: &SlotId, student: &StudentId) -> Result<Slot, BookingError> {
                self.db.book(slot, student)
            }
            fn unbook(&self, slot: &SlotId, student: &StudentId) -> Result<(), BookingError> {
                self.db.unbook(slot, student)
            }
            fn rebook(&self, snapshot: &Slot) -> Result<(), BookingError> {
                self.db.rebook(snapshot)
            }
            fn release(
                &self,
                slot: &SlotId,
                student: &StudentId,
                status: SlotStatus,
            ) -> Result<(), BookingError> {
                self.db.release(slot, student, status)
            }
            fn set_status(&self, slot: &SlotId, status: SlotStatus) -> Result<Slot, BookingError> {
                self.db.set_status(slot, status)
            }
            fn delete(&self, slot: &SlotId) -> Result<(), BookingError> {
                self.db.delete(slot)
            }
            fn slots_for_student(&self, student: &StudentId) -> Result<Vec<Slot>, BookingError> {
                self.db.slots_for_student(student)
            }
            fn slots_between(
                &self,
                from: DateTime<Utc>,
                to: DateTime<Utc>,
                only_open: bool,
            ) -> Result<Vec<Slot>, BookingError> {
                self.db.slots_between(from, to, only_open)
            }
            fn insert_slots(&self, slots: &[NewSlot]) -> Result<usize, BookingError> {
                self.db.insert_slots(slots)
            }
        }

        let db = db();
        let a = student(&db, 1);
        let s = slot(&db, Duration::days(3));
        db.book(&s, &a).unwrap();
        db.decrement(&a).unwrap();

        let workflow = BookingWorkflow::new(
            Lockstep {
                db,
                barrier: Barrier::new(2),
            },
            Dispatcher::disabled(),
            CancellationPolicy::default(),
        );

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| workflow.cancel_by_student(&a, &s)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(BookingError::NotOwner))));
        assert_eq!(workflow.store().db.read(&a).unwrap(), 1);
    }

    #[test]
    fn test_unbook_checks_holder() {
        let db = db();
        let a = student(&db, 1);
        let b = student(&db, 1);
        let s = slot(&db, Duration::days(1));
        db.book(&s, &a).unwrap();

        assert!(matches!(db.unbook(&s, &b), Err(BookingError::NotOwner)));
        db.unbook(&s, &a).unwrap();
        let slot = db.get(&s).unwrap().unwrap();
        assert!(!slot.is_booked);
        assert_eq!(slot.status, None);
    }

    #[test]
    fn test_set_status_teacher_cancel_clears_booking() {
        let db = db();
        let a = student(&db, 1);
        let s = slot(&db, Duration::days(1));
        db.book(&s, &a).unwrap();

        db.set_status(&s, SlotStatus::Missed).unwrap();
        assert!(db.get(&s).unwrap().unwrap().is_held_by(&a));

        let previous = db.set_status(&s, SlotStatus::CanceledTeacher).unwrap();
        assert_eq!(previous.status, Some(SlotStatus::Missed));
        let slot = db.get(&s).unwrap().unwrap();
        assert_eq!(slot.student_id, None);
        assert!(!slot.is_booked);
    }

    #[test]
    fn test_schema_rejects_inconsistent_booking() {
        let db = db();
        let s = slot(&db, Duration::days(1));
        let conn = db.db.lock().unwrap();
        let result = conn.execute("UPDATE slots SET is_booked = 1 WHERE id = ?1", [s.as_str()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_listing_is_ordered() {
        let db = db();
        let a = student(&db, 3);
        let late = slot(&db, Duration::days(3));
        let early = slot(&db, Duration::days(1));
        db.book(&late, &a).unwrap();
        db.book(&early, &a).unwrap();

        let held = db.slots_for_student(&a).unwrap();
        assert_eq!(held.iter().map(|s| s.id.clone()).collect::<Vec<_>>(), vec![early, late]);

        let open = slot(&db, Duration::days(2));
        let window = db
            .slots_between(Utc::now(), Utc::now() + Duration::days(7), true)
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, open);
    }

    #[test]
    fn test_insert_skips_duplicate_start_times() {
        let db = db();
        let start = Utc::now() + Duration::days(1);
        let new = NewSlot {
            start_time: start,
            end_time: start + Duration::hours(1),
        };
        assert_eq!(db.insert_slots(&[new, new]).unwrap(), 1);
        assert_eq!(db.insert_slots(&[new]).unwrap(), 0);
    }

    #[test]
    fn test_sessions_and_profiles() {
        let db = db();
        let admin = Profile::new("Admin@Example.com", Some("Admin".into()), Role::Admin);
        db.create_profile(&admin).unwrap();
        assert!(matches!(
            db.create_profile(&Profile::new("admin@example.com", None, Role::Student)),
            Err(BookingError::EmailTaken(_))
        ));
        assert_eq!(
            db.profile_by_email("admin@example.com").unwrap().unwrap().id,
            admin.id
        );

        let token = db.issue_session(&admin.id).unwrap();
        let found = db.profile_for_session(&token.hash()).unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
        assert!(db
            .profile_for_session(&SessionToken::generate().hash())
            .unwrap()
            .is_none());
        db.ping().unwrap();
    }

    #[test]
    fn test_concurrent_bookings_on_sqlite() {
        let db = Arc::new(db());
        let students: Vec<_> = (0..6).map(|_| student(&db, 1)).collect();
        let s = slot(&db, Duration::days(1));

        let wins = std::thread::scope(|scope| {
            let handles: Vec<_> = students
                .iter()
                .map(|st| {
                    let db = db.clone();
                    let s = s.clone();
                    scope.spawn(move || db.book(&s, st).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });
        assert_eq!(wins, 1);
    }
}
