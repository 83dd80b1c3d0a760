//! In-process store with the same semantics as the SQLite one.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::error::BookingError;
use super::ledger::BalanceLedger;
use super::registry::SlotRegistry;
use super::types::{NewSlot, Profile, Slot, SlotId, SlotStatus, StudentId};
use crate::auth::{IdentityStore, TokenHash};

/// Thread-safe store backed by `DashMap`s.
///
/// Each operation holds at most one shard lock, so `book` and `decrement`
/// are compare-and-set on a single entry.
#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<StudentId, Profile>,
    slots: DashMap<SlotId, Slot>,
    sessions: DashMap<TokenHash, StudentId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a slot as-is.
    pub fn put_slot(&self, slot: Slot) {
        self.slots.insert(slot.id.clone(), slot);
    }

    /// Inserts or replaces a profile as-is.
    pub fn put_profile(&self, profile: Profile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    fn sorted(mut slots: Vec<Slot>) -> Vec<Slot> {
        slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        slots
    }
}

impl BalanceLedger for MemoryStore {
    fn profile(&self, student: &StudentId) -> Result<Option<Profile>, BookingError> {
        Ok(self.profiles.get(student).map(|p| p.value().clone()))
    }

    fn decrement(&self, student: &StudentId) -> Result<u32, BookingError> {
        let mut profile = self
            .profiles
            .get_mut(student)
            .ok_or(BookingError::ProfileNotFound)?;
        if profile.balance == 0 {
            return Err(BookingError::InsufficientBalance);
        }
        profile.balance -= 1;
        Ok(profile.balance)
    }

    fn increment_by(&self, student: &StudentId, lessons: u32) -> Result<u32, BookingError> {
        let mut profile = self
            .profiles
            .get_mut(student)
            .ok_or(BookingError::ProfileNotFound)?;
        profile.balance = profile.balance.saturating_add(lessons);
        Ok(profile.balance)
    }
}

impl SlotRegistry for MemoryStore {
    fn get(&self, slot: &SlotId) -> Result<Option<Slot>, BookingError> {
        Ok(self.slots.get(slot).map(|s| s.value().clone()))
    }

    fn book(&self, slot: &SlotId, student: &StudentId) -> Result<Slot, BookingError> {
        let mut entry = self.slots.get_mut(slot).ok_or(BookingError::SlotNotFound)?;
        if entry.is_booked {
            return Err(BookingError::SlotAlreadyBooked);
        }
        entry.is_booked = true;
        entry.student_id = Some(student.clone());
        entry.status = Some(SlotStatus::Scheduled);
        Ok(entry.value().clone())
    }

    fn unbook(&self, slot: &SlotId, student: &StudentId) -> Result<(), BookingError> {
        let mut entry = self.slots.get_mut(slot).ok_or(BookingError::SlotNotFound)?;
        if !entry.is_held_by(student) {
            return Err(BookingError::NotOwner);
        }
        entry.is_booked = false;
        entry.student_id = None;
        entry.status = None;
        Ok(())
    }

    fn rebook(&self, snapshot: &Slot) -> Result<(), BookingError> {
        let mut entry = self
            .slots
            .get_mut(&snapshot.id)
            .ok_or(BookingError::SlotNotFound)?;
        if entry.is_booked {
            return Err(BookingError::SlotAlreadyBooked);
        }
        entry.is_booked = snapshot.student_id.is_some();
        entry.student_id = snapshot.student_id.clone();
        entry.status = snapshot.status;
        Ok(())
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
        let mut entry = self.slots.get_mut(slot).ok_or(BookingError::SlotNotFound)?;
        if !entry.is_held_by(student) {
            return Err(BookingError::NotOwner);
        }
        entry.is_booked = false;
        entry.student_id = None;
        entry.status = Some(status);
        Ok(())
    }

    fn set_status(&self, slot: &SlotId, status: SlotStatus) -> Result<Slot, BookingError> {
        if matches!(status, SlotStatus::Scheduled | SlotStatus::CanceledStudent) {
            return Err(BookingError::InvalidStatus(status.to_string()));
        }
        let mut entry = self.slots.get_mut(slot).ok_or(BookingError::SlotNotFound)?;
        let previous = entry.value().clone();
        if status == SlotStatus::CanceledTeacher {
            entry.is_booked = false;
            entry.student_id = None;
        }
        entry.status = Some(status);
        Ok(previous)
    }

    fn delete(&self, slot: &SlotId) -> Result<(), BookingError> {
        self.slots
            .remove(slot)
            .map(|_| ())
            .ok_or(BookingError::SlotNotFound)
    }

    fn slots_for_student(&self, student: &StudentId) -> Result<Vec<Slot>, BookingError> {
        let held = self
            .slots
            .iter()
            .filter(|s| s.student_id.as_ref() == Some(student))
            .map(|s| s.value().clone())
            .collect();
        Ok(Self::sorted(held))
    }

    fn slots_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_open: bool,
    ) -> Result<Vec<Slot>, BookingError> {
        let found = self
            .slots
            .iter()
            .filter(|s| s.start_time >= from && s.start_time <= to)
            .filter(|s| !only_open || !s.is_booked)
            .map(|s| s.value().clone())
            .collect();
        Ok(Self::sorted(found))
    }

    fn insert_slots(&self, slots: &[NewSlot]) -> Result<usize, BookingError> {
        let mut inserted = 0;
        for new in slots {
            let taken = self.slots.iter().any(|s| s.start_time == new.start_time);
            if !taken {
                self.put_slot(Slot::open(new.start_time, new.end_time));
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

impl IdentityStore for MemoryStore {
    fn create_profile(&self, profile: &Profile) -> Result<(), BookingError> {
        if self.profile_by_email(&profile.email)?.is_some() {
            return Err(BookingError::EmailTaken(profile.email.clone()));
        }
        self.put_profile(profile.clone());
        Ok(())
    }

    fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, BookingError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .map(|p| p.value().clone()))
    }

    fn store_session(&self, hash: &TokenHash, profile: &StudentId) -> Result<(), BookingError> {
        if !self.profiles.contains_key(profile) {
            return Err(BookingError::ProfileNotFound);
        }
        self.sessions.insert(hash.clone(), profile.clone());
        Ok(())
    }

    fn profile_for_session(&self, hash: &TokenHash) -> Result<Option<Profile>, BookingError> {
        let Some(id) = self.sessions.get(hash).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        self.profile(&id)
    }

    fn ping(&self) -> Result<(), BookingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::Role;
    use chrono::Duration;

    fn student(store: &MemoryStore, balance: u32) -> StudentId {
        let mut profile = Profile::new("s@example.com", None, Role::Student);
        profile.balance = balance;
        let id = profile.id.clone();
        store.put_profile(profile);
        id
    }

    fn slot(store: &MemoryStore) -> SlotId {
        let start = Utc::now() + Duration::days(3);
        let slot = Slot::open(start, start + Duration::hours(1));
        let id = slot.id.clone();
        store.put_slot(slot);
        id
    }

    #[test]
    fn test_book_is_single_owner() {
        let store = MemoryStore::new();
        let a = student(&store, 1);
        let b = StudentId::generate();
        let s = slot(&store);

        let booked = store.book(&s, &a).unwrap();
        assert!(booked.is_held_by(&a));
        assert_eq!(booked.status, Some(SlotStatus::Scheduled));
        assert!(matches!(store.book(&s, &b), Err(BookingError::SlotAlreadyBooked)));
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let store = MemoryStore::new();
        let a = student(&store, 1);
        assert_eq!(store.decrement(&a).unwrap(), 0);
        assert!(matches!(store.decrement(&a), Err(BookingError::InsufficientBalance)));
        assert_eq!(store.read(&a).unwrap(), 0);
    }

    #[test]
    fn test_teacher_cancel_status_clears_booking() {
        let store = MemoryStore::new();
        let a = student(&store, 1);
        let s = slot(&store);
        store.book(&s, &a).unwrap();

        let previous = store.set_status(&s, SlotStatus::CanceledTeacher).unwrap();
        assert_eq!(previous.student_id, Some(a));
        let now = store.get(&s).unwrap().unwrap();
        assert!(!now.is_booked);
        assert_eq!(now.student_id, None);
        assert_eq!(now.status, Some(SlotStatus::CanceledTeacher));
    }

    #[test]
    fn test_release_only_clears_the_expected_holder() {
        let store = MemoryStore::new();
        let a = student(&store, 1);
        let b = student(&store, 1);
        let s = slot(&store);
        store.book(&s, &a).unwrap();

        store.release(&s, &a, SlotStatus::CanceledStudent).unwrap();
        assert!(matches!(
            store.release(&s, &a, SlotStatus::CanceledStudent),
            Err(BookingError::NotOwner)
        ));

        // A stale release must not wipe the next student's booking
        store.book(&s, &b).unwrap();
        assert!(matches!(
            store.release(&s, &a, SlotStatus::CanceledStudent),
            Err(BookingError::NotOwner)
        ));
        assert!(store.get(&s).unwrap().unwrap().is_held_by(&b));
    }

    #[test]
    fn test_insert_slots_skips_existing_start_times() {
        let store = MemoryStore::new();
        let start = Utc::now();
        let one = NewSlot {
            start_time: start,
            end_time: start + Duration::hours(1),
        };
        assert_eq!(store.insert_slots(&[one]).unwrap(), 1);
        assert_eq!(store.insert_slots(&[one]).unwrap(), 0);
    }
}
