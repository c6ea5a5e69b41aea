pub mod assets;
pub mod audio;

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use notify_rust::Notification;
use std::path::PathBuf;
use std::process::Child;
use std::thread;

use crate::config::settings::AlertConfig;
use crate::models::NextPrayer;
use crate::utils::format::format_time;

pub use assets::AlertAssets;
use audio::{Playlist, SoundLoop, spawn_with};

/// Fires alerts. Every call to `fire` opens a new session; nothing is
/// de-duplicated.
pub struct Alerter {
    config: AlertConfig,
    assets: AlertAssets,
    fired: usize,
}

impl Alerter {
    pub fn new(config: AlertConfig, assets: AlertAssets) -> Self {
        Self {
            config,
            assets,
            fired: 0,
        }
    }

    /// Start sound, viewer and notification for one alert.
    pub fn fire(&mut self, prayer: Option<NextPrayer>) -> AlertSession {
        let background = self.background_for(self.fired);
        self.fired += 1;
        info!(
            "alert #{} for {}",
            self.fired,
            prayer.map(|p| p.name.to_string()).unwrap_or_else(|| "test".into())
        );

        let sound = match (&self.config.player, Playlist::from_assets(&self.assets)) {
            (Some(player), Some(playlist)) => match SoundLoop::start(player, playlist) {
                Ok(sound) => Some(sound),
                Err(e) => {
                    warn!("could not start sound loop: {}", e);
                    None
                }
            },
            _ => None,
        };

        let viewer = match (&self.config.viewer, &background) {
            (Some(viewer), Some(image)) => match spawn_with(viewer, image) {
                Ok(child) => Some(child),
                Err(e) => {
                    warn!("could not open {:?} with {:?}: {}", image, viewer, e);
                    None
                }
            },
            _ => None,
        };

        if self.config.notify {
            send_notification(prayer);
        }

        AlertSession {
            prayer,
            background,
            fired_at: Local::now().naive_local(),
            sound,
            viewer,
        }
    }

    /// Override image if present, otherwise the scanned images in turn.
    fn background_for(&self, seq: usize) -> Option<PathBuf> {
        if let Some(image) = &self.assets.background_override {
            return Some(image.clone());
        }
        if self.assets.images.is_empty() {
            return None;
        }
        Some(self.assets.images[seq % self.assets.images.len()].clone())
    }
}

/// One open alert. Dropping it silences the sound and closes the viewer.
pub struct AlertSession {
    pub prayer: Option<NextPrayer>,
    pub background: Option<PathBuf>,
    pub fired_at: NaiveDateTime,
    sound: Option<SoundLoop>,
    viewer: Option<Child>,
}

impl AlertSession {
    pub fn background_name(&self) -> Option<String> {
        self.background
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_playing(&self) -> bool {
        self.sound.as_ref().is_some_and(SoundLoop::is_running)
    }
}

impl Drop for AlertSession {
    fn drop(&mut self) {
        if let Some(sound) = self.sound.take() {
            sound.stop();
        }
        if let Some(mut viewer) = self.viewer.take() {
            let _ = viewer.kill();
            let _ = viewer.wait();
        }
    }
}

/// Desktop notifications can block on the session bus, so they go out on a
/// throwaway thread.
fn send_notification(prayer: Option<NextPrayer>) {
    let body = match prayer {
        Some(p) => format!("{} at {}", p.name, format_time(p.at.time())),
        None => "Test alert".to_string(),
    };
    let spawned = thread::Builder::new()
        .name("adhan-notify".into())
        .spawn(move || {
            if let Err(e) = Notification::new()
                .summary("Time to pray")
                .body(&body)
                .appname("adhan")
                .show()
            {
                warn!("desktop notification failed: {}", e);
            }
        });
    if let Err(e) = spawned {
        warn!("could not spawn notification thread: {}", e);
    }
}
