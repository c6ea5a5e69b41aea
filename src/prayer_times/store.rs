use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::PrayerSchedule;

/// Most recently fetched timetable. Cloning yields another handle to the same
/// schedule; every access goes through one lock.
#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    inner: Arc<Mutex<PrayerSchedule>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PrayerSchedule> {
        // A panicking reader cannot leave a half-written schedule behind:
        // writes are a single assignment.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in a whole new schedule.
    pub fn replace(&self, schedule: PrayerSchedule) {
        *self.lock() = schedule;
    }

    /// Run `f` against the current schedule while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&PrayerSchedule) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> PrayerSchedule {
        self.read(Clone::clone)
    }

    pub fn is_empty(&self) -> bool {
        self.read(PrayerSchedule::is_empty)
    }
}
