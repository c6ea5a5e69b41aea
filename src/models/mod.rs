pub mod location;
pub mod prayer;

pub use location::{GeoLookup, Location, LocationCell};
pub use prayer::{NextPrayer, PrayerName, PrayerSchedule};
