use log::{info, warn};
use reqwest::blocking::Client;

use crate::models::{GeoLookup, LocationCell};
use crate::prayer_times::fetcher::FetchError;

/// Anything that can guess where the machine is.
pub trait GeoSource: Send + Sync {
    fn locate(&self) -> Result<GeoLookup, FetchError>;
}

/// ip-api.com style lookup: GET with no parameters, JSON back.
pub struct IpApi {
    client: Client,
    url: String,
}

impl IpApi {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl GeoSource for IpApi {
    fn locate(&self) -> Result<GeoLookup, FetchError> {
        let resp = self.client.get(&self.url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        let lookup: GeoLookup = serde_json::from_str(&resp.text()?)?;
        if lookup.is_failure() {
            return Err(FetchError::Lookup(
                lookup.message.unwrap_or_else(|| "unknown reason".to_string()),
            ));
        }
        Ok(lookup)
    }
}

/// Best-effort: on failure the location is left as it was. A location the
/// user set while the lookup was in flight is kept too.
pub fn resolve_location(geo: &dyn GeoSource, location: &LocationCell) -> bool {
    let seen = location.edits();
    match geo.locate() {
        Ok(lookup) => match location.apply_lookup_since(&lookup, seen) {
            Some(resolved) => {
                info!("location resolved to {}", resolved.label());
                true
            }
            None => {
                info!("location edited during lookup, keeping {}", location.get().label());
                false
            }
        },
        Err(e) => {
            warn!("location lookup failed, keeping {}: {}", location.get().label(), e);
            false
        }
    }
}
