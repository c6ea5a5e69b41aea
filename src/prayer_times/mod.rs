pub mod fetcher;
pub mod location;
pub mod refresh;
pub mod selector;
pub mod store;
pub mod ticker;

pub use fetcher::{HttpTimetable, Refresher};
pub use location::{GeoSource, IpApi, resolve_location};
pub use refresh::RefreshLoop;
pub use selector::next_prayer;
pub use store::ScheduleStore;
pub use ticker::{Countdown, CountdownTicker};
