use chrono::NaiveDateTime;

use crate::models::{NextPrayer, PrayerName, PrayerSchedule};

/// First prayer strictly after `now`. Once Isha has passed this is tomorrow's
/// Fajr, assumed to fall at today's Fajr time. `None` when there is no Fajr
/// entry to wrap to.
pub fn next_prayer(schedule: &PrayerSchedule, now: NaiveDateTime) -> Option<NextPrayer> {
    for name in PrayerName::ALL {
        if let Some(at) = schedule.get(name) {
            if at > now {
                return Some(NextPrayer { name, at });
            }
        }
    }

    let first = PrayerName::first();
    schedule
        .get(first)
        .and_then(|today_at| NextPrayer::tomorrow(first, today_at))
}
