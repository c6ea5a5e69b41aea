use chrono::{Days, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The five daily prayers. Variant order is the canonical daily order and is
/// relied on by `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// Key used in the `data.timings` object of the timetable API.
    pub fn api_key(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.api_key()
    }

    pub fn first() -> PrayerName {
        PrayerName::ALL[0]
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer name: {}", s)),
        }
    }
}

/// Today's timetable. Entries the API omitted (or sent garbage for) are
/// simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrayerSchedule {
    times: BTreeMap<PrayerName, NaiveDateTime>,
}

impl PrayerSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: PrayerName, at: NaiveDateTime) {
        self.times.insert(name, at);
    }

    pub fn get(&self, name: PrayerName) -> Option<NaiveDateTime> {
        self.times.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Entries in canonical prayer order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, NaiveDateTime)> + '_ {
        self.times.iter().map(|(name, at)| (*name, *at))
    }
}

impl FromIterator<(PrayerName, NaiveDateTime)> for PrayerSchedule {
    fn from_iter<I: IntoIterator<Item = (PrayerName, NaiveDateTime)>>(iter: I) -> Self {
        Self {
            times: iter.into_iter().collect(),
        }
    }
}

/// The upcoming prayer, derived on demand from a schedule and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayer {
    pub name: PrayerName,
    pub at: NaiveDateTime,
}

impl NextPrayer {
    /// Same time of day on the following calendar date.
    pub fn tomorrow(name: PrayerName, today_at: NaiveDateTime) -> Option<Self> {
        today_at
            .checked_add_days(Days::new(1))
            .map(|at| NextPrayer { name, at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[test]
    fn parses_names_case_insensitively_with_aliases() {
        assert_eq!("FAJR".parse::<PrayerName>().unwrap(), PrayerName::Fajr);
        assert_eq!("zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!(" Isha ".parse::<PrayerName>().unwrap(), PrayerName::Isha);
        assert!("sunrise".parse::<PrayerName>().is_err());
    }

    #[test]
    fn schedule_iterates_in_canonical_order() {
        let schedule: PrayerSchedule = [
            (PrayerName::Isha, at(19, 50)),
            (PrayerName::Fajr, at(5, 0)),
            (PrayerName::Asr, at(15, 45)),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = schedule.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![PrayerName::Fajr, PrayerName::Asr, PrayerName::Isha]);
    }

    #[test]
    fn tomorrow_keeps_time_of_day() {
        let next = NextPrayer::tomorrow(PrayerName::Fajr, at(5, 0)).unwrap();
        assert_eq!(next.at.date(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(next.at.time(), at(5, 0).time());
    }
}
