use chrono::{Local, NaiveDate, NaiveTime};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::ApiConfig;
use crate::models::{Location, LocationCell, PrayerName, PrayerSchedule};
use crate::prayer_times::store::ScheduleStore;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no usable prayer times")]
    NoTimings,
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Build the process-wide HTTP client.
pub fn build_client(api: &ApiConfig) -> Result<Client, FetchError> {
    let mut builder = Client::builder().user_agent(concat!("adhan/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = api.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// How a timetable request identifies the place.
#[derive(Debug, Clone, PartialEq)]
pub enum TimetableQuery {
    Coordinates { latitude: f64, longitude: f64 },
    City { city: String, country: String },
}

impl TimetableQuery {
    /// Coordinates win whenever both are known.
    pub fn for_location(location: &Location) -> Self {
        match location.coordinates {
            Some((latitude, longitude)) => TimetableQuery::Coordinates { latitude, longitude },
            None => TimetableQuery::City {
                city: location.city.clone(),
                country: location.country.clone(),
            },
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            TimetableQuery::Coordinates { .. } => "timings",
            TimetableQuery::City { .. } => "timingsByCity",
        }
    }

    pub fn params(&self, method: u8) -> Vec<(&'static str, String)> {
        let mut params = match self {
            TimetableQuery::Coordinates { latitude, longitude } => vec![
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
            ],
            TimetableQuery::City { city, country } => {
                vec![("city", city.clone()), ("country", country.clone())]
            }
        };
        params.push(("method", method.to_string()));
        params
    }
}

#[derive(Deserialize)]
struct TimingsEnvelope {
    data: TimingsData,
}

#[derive(Deserialize)]
struct TimingsData {
    timings: Map<String, Value>,
}

/// "05:12 (EET)" -> 05:12. Accepts H:M and H:M:S.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let clean = raw.split(' ').next().unwrap_or("").trim();
    if clean.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(clean, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(clean, "%H:%M"))
        .ok()
}

/// Turn a timetable response body into today's schedule. Individual bad
/// entries are dropped; only a body without `data.timings` is an error.
pub fn parse_timings(body: &str, today: NaiveDate) -> Result<PrayerSchedule, FetchError> {
    let envelope: TimingsEnvelope = serde_json::from_str(body)?;
    let timings = envelope.data.timings;

    let mut schedule = PrayerSchedule::new();
    for name in PrayerName::ALL {
        let Some(raw) = timings.get(name.api_key()).and_then(Value::as_str) else {
            debug!("timetable has no usable entry for {}", name);
            continue;
        };
        match parse_time_of_day(raw) {
            Some(time) => schedule.insert(name, today.and_time(time)),
            None => debug!("skipping unparseable {} time {:?}", name, raw),
        }
    }
    Ok(schedule)
}

/// Anything that can produce a day's timetable.
pub trait TimetableSource: Send + Sync {
    fn fetch(&self, query: &TimetableQuery, today: NaiveDate) -> Result<PrayerSchedule, FetchError>;
}

/// Timetable API over HTTP (aladhan.com compatible).
pub struct HttpTimetable {
    client: Client,
    base_url: String,
    method: u8,
}

impl HttpTimetable {
    pub fn new(client: Client, base_url: impl Into<String>, method: u8) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            method,
        }
    }

    pub fn url_for(&self, query: &TimetableQuery) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), query.endpoint())
    }
}

impl TimetableSource for HttpTimetable {
    fn fetch(&self, query: &TimetableQuery, today: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        let url = self.url_for(query);
        debug!("GET {} {:?}", url, query);
        let resp = self
            .client
            .get(&url)
            .query(&query.params(self.method))
            .send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        let body = resp.text()?;
        parse_timings(&body, today)
    }
}

/// Fetches for the current location and publishes into the store.
pub struct Refresher {
    source: Arc<dyn TimetableSource>,
    store: ScheduleStore,
    location: LocationCell,
}

impl Refresher {
    pub fn new(source: Arc<dyn TimetableSource>, store: ScheduleStore, location: LocationCell) -> Self {
        Self {
            source,
            store,
            location,
        }
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn location(&self) -> &LocationCell {
        &self.location
    }

    /// One fetch for `today`. The store is only touched on success.
    pub fn refresh_on(&self, today: NaiveDate) -> Result<usize, FetchError> {
        let query = TimetableQuery::for_location(&self.location.get());
        let schedule = self.source.fetch(&query, today)?;
        if schedule.is_empty() {
            return Err(FetchError::NoTimings);
        }
        let count = schedule.len();
        self.store.replace(schedule);
        info!("loaded {} prayer times for {}", count, today);
        Ok(count)
    }

    /// Fetch for the local date; failures keep the previous schedule.
    pub fn refresh(&self) -> bool {
        match self.refresh_on(Local::now().date_naive()) {
            Ok(_) => true,
            Err(e) => {
                warn!("prayer time refresh failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const SAMPLE_BODY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:00 (AST)",
                "Sunrise": "06:20 (AST)",
                "Dhuhr": "12:15 (AST)",
                "Asr": "15:45 (AST)",
                "Sunset": "18:18 (AST)",
                "Maghrib": "18:20 (AST)",
                "Isha": "19:50 (AST)",
                "Imsak": "04:50 (AST)",
                "Midnight": "00:17 (AST)"
            }
        }
    }"#;

    /// Scripted source: pops one canned result per call and records queries.
    pub(crate) struct FakeSource {
        pub results: Mutex<Vec<Result<PrayerSchedule, FetchError>>>,
        pub queries: Mutex<Vec<TimetableQuery>>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub fn new(mut results: Vec<Result<PrayerSchedule, FetchError>>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
                queries: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TimetableSource for FakeSource {
        fn fetch(&self, query: &TimetableQuery, _today: NaiveDate) -> Result<PrayerSchedule, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.clone());
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::Lookup("no scripted result".into())))
        }
    }

    pub(crate) fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    pub(crate) fn sample_schedule() -> PrayerSchedule {
        parse_timings(SAMPLE_BODY, day()).unwrap()
    }

    #[test]
    fn parses_suffixed_times() {
        let schedule = sample_schedule();
        assert_eq!(schedule.len(), 5);
        assert_eq!(
            schedule.get(PrayerName::Maghrib),
            day().and_hms_opt(18, 20, 0)
        );
    }

    #[test]
    fn one_malformed_entry_keeps_the_other_four() {
        let body = SAMPLE_BODY.replace("15:45 (AST)", "quarter to four");
        let schedule = parse_timings(&body, day()).unwrap();
        assert_eq!(schedule.len(), 4);
        assert!(schedule.get(PrayerName::Asr).is_none());
        assert!(schedule.get(PrayerName::Isha).is_some());
    }

    #[test]
    fn accepts_seconds_and_single_digit_hours() {
        let body = r#"{"data":{"timings":{"Fajr":"4:58:30","Dhuhr":42,"Isha":"  "}}}"#;
        let schedule = parse_timings(body, day()).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.get(PrayerName::Fajr), day().and_hms_opt(4, 58, 30));
    }

    #[test]
    fn missing_timings_is_an_error() {
        let err = parse_timings(r#"{"code":400,"data":"Invalid city"}"#, day()).unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
        assert!(parse_timings("<html>", day()).is_err());
    }

    #[test]
    fn coordinates_take_precedence() {
        let loc = Location::new("Mecca", "Saudi Arabia").with_coordinates(21.42, 39.83);
        let query = TimetableQuery::for_location(&loc);
        assert_eq!(query.endpoint(), "timings");
        assert_eq!(
            query.params(2),
            vec![
                ("latitude", "21.42".to_string()),
                ("longitude", "39.83".to_string()),
                ("method", "2".to_string()),
            ]
        );
    }

    #[test]
    fn city_form_without_coordinates() {
        let query = TimetableQuery::for_location(&Location::new("New York", "United States"));
        assert_eq!(query.endpoint(), "timingsByCity");
        assert_eq!(query.params(4)[0], ("city", "New York".to_string()));
        assert_eq!(query.params(4)[2], ("method", "4".to_string()));
    }

    #[test]
    fn url_ignores_trailing_slash() {
        let client = Client::new();
        let api = HttpTimetable::new(client, "https://api.aladhan.com/v1/", 2);
        let query = TimetableQuery::for_location(&Location::default());
        assert_eq!(api.url_for(&query), "https://api.aladhan.com/v1/timingsByCity");
    }

    #[test]
    fn failed_fetch_leaves_schedule_unchanged() {
        let store = ScheduleStore::new();
        store.replace(sample_schedule());
        let source = Arc::new(FakeSource::new(vec![Err(FetchError::Lookup("network down".into()))]));
        let refresher = Refresher::new(source, store.clone(), LocationCell::default());

        assert!(refresher.refresh_on(day()).is_err());
        assert_eq!(store.snapshot(), sample_schedule());
    }

    #[test]
    fn empty_result_does_not_clear_store() {
        let store = ScheduleStore::new();
        store.replace(sample_schedule());
        let source = Arc::new(FakeSource::new(vec![Ok(PrayerSchedule::new())]));
        let refresher = Refresher::new(source, store.clone(), LocationCell::default());

        assert!(matches!(refresher.refresh_on(day()), Err(FetchError::NoTimings)));
        assert_eq!(store.snapshot().len(), 5);
    }

    #[test]
    fn successful_fetch_uses_current_location() {
        let store = ScheduleStore::new();
        let location = LocationCell::new(Location::default().with_coordinates(1.5, 2.5));
        let source = Arc::new(FakeSource::new(vec![Ok(sample_schedule())]));
        let refresher = Refresher::new(source.clone(), store.clone(), location);

        assert_eq!(refresher.refresh_on(day()).unwrap(), 5);
        assert_eq!(
            source.queries.lock().unwrap()[0],
            TimetableQuery::Coordinates { latitude: 1.5, longitude: 2.5 }
        );
        assert_eq!(store.snapshot(), sample_schedule());
    }
}
