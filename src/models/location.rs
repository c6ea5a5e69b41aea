use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Where prayer times are fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub city: String,
    pub country: String,
    /// (latitude, longitude). Takes precedence over city/country when set.
    pub coordinates: Option<(f64, f64)>,
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some((latitude, longitude));
        self
    }

    /// Overwrite the fields the lookup actually provided. Blank strings and a
    /// half-present coordinate pair leave the old values in place.
    pub fn apply_lookup(&mut self, lookup: &GeoLookup) {
        if let Some(city) = non_blank(lookup.city.as_deref()) {
            self.city = city.to_string();
        }
        if let Some(country) = non_blank(lookup.country.as_deref()) {
            self.country = country.to_string();
        }
        if let (Some(lat), Some(lon)) = (lookup.lat, lookup.lon) {
            self.coordinates = Some((lat, lon));
        }
    }

    pub fn label(&self) -> String {
        match self.coordinates {
            Some((lat, lon)) => format!("{}, {} ({:.4}, {:.4})", self.city, self.country, lat, lon),
            None => format!("{}, {}", self.city, self.country),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

impl Default for Location {
    fn default() -> Self {
        Location::new("Mecca", "Saudi Arabia")
    }
}

/// Body of an IP geolocation response. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoLookup {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl GeoLookup {
    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("fail")
    }
}

/// Location shared between the UI thread and the refresh worker.
#[derive(Debug, Clone, Default)]
pub struct LocationCell {
    inner: Arc<Mutex<Location>>,
    /// Bumped under the lock by every manual edit.
    edits: Arc<AtomicU64>,
}

impl LocationCell {
    pub fn new(location: Location) -> Self {
        Self {
            inner: Arc::new(Mutex::new(location)),
            edits: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self) -> Location {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Location) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Manual edit: future fetches go by city/country.
    pub fn set_city_country(&self, city: &str, country: &str) {
        self.update(|loc| {
            loc.city = city.trim().to_string();
            loc.country = country.trim().to_string();
            loc.coordinates = None;
            self.edits.fetch_add(1, Ordering::AcqRel);
        });
    }

    /// Number of manual edits so far.
    pub fn edits(&self) -> u64 {
        self.edits.load(Ordering::Acquire)
    }

    /// Apply a lookup started when `edits()` was `seen`. A manual edit made
    /// since then wins and the lookup is dropped (`None`).
    pub fn apply_lookup_since(&self, lookup: &GeoLookup, seen: u64) -> Option<Location> {
        self.update(|loc| {
            if self.edits.load(Ordering::Acquire) != seen {
                return None;
            }
            loc.apply_lookup(lookup);
            Some(loc.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overwrites_only_present_fields() {
        let mut loc = Location::default();
        let lookup = GeoLookup {
            city: Some("Cairo".into()),
            country: Some("   ".into()),
            lat: Some(30.04),
            lon: None,
            ..Default::default()
        };
        loc.apply_lookup(&lookup);

        assert_eq!(loc.city, "Cairo");
        assert_eq!(loc.country, "Saudi Arabia");
        assert_eq!(loc.coordinates, None);
    }

    #[test]
    fn lookup_sets_coordinates_when_both_present() {
        let mut loc = Location::default();
        loc.apply_lookup(&GeoLookup {
            lat: Some(30.04),
            lon: Some(31.24),
            ..Default::default()
        });
        assert_eq!(loc.coordinates, Some((30.04, 31.24)));
    }

    #[test]
    fn manual_edit_clears_coordinates() {
        let cell = LocationCell::new(Location::default().with_coordinates(1.0, 2.0));
        cell.set_city_country(" Istanbul ", "Turkey");

        let loc = cell.get();
        assert_eq!(loc.city, "Istanbul");
        assert_eq!(loc.country, "Turkey");
        assert!(loc.coordinates.is_none());
    }

    #[test]
    fn lookup_started_before_manual_edit_is_dropped() {
        let cell = LocationCell::default();
        let seen = cell.edits();
        cell.set_city_country("Amman", "Jordan");

        let doha = GeoLookup {
            city: Some("Doha".into()),
            lat: Some(25.28),
            lon: Some(51.52),
            ..Default::default()
        };
        assert_eq!(cell.apply_lookup_since(&doha, seen), None);
        assert_eq!(cell.get(), Location::new("Amman", "Jordan"));

        let applied = cell.apply_lookup_since(&doha, cell.edits());
        assert_eq!(applied.map(|l| l.city), Some("Doha".to_string()));
    }

    #[test]
    fn deserializes_ip_api_body() {
        let body = r#"{"status":"success","country":"Egypt","city":"Cairo","lat":30.0588,"lon":31.2268,"query":"1.2.3.4"}"#;
        let lookup: GeoLookup = serde_json::from_str(body).unwrap();
        assert!(!lookup.is_failure());
        assert_eq!(lookup.city.as_deref(), Some("Cairo"));
        assert_eq!(lookup.lon, Some(31.2268));
    }
}
