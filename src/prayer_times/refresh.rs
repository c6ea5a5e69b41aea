use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::prayer_times::fetcher::Refresher;
use crate::prayer_times::location::{GeoSource, resolve_location};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    RefreshNow,
    Stop,
}

/// Owned handle to the background refresh worker. Dropping it stops and joins
/// the worker.
pub struct RefreshLoop {
    tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// Start the worker. It optionally resolves the location first, fetches
    /// right away, then fetches again every `interval` until stopped.
    pub fn spawn(
        refresher: Arc<Refresher>,
        interval: Duration,
        geo: Option<Box<dyn GeoSource>>,
    ) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("adhan-refresh".into())
            .spawn(move || run(&refresher, interval, geo.as_deref(), &rx))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Ask for a fetch without waiting for it.
    pub fn request_refresh(&self) {
        if self.tx.send(Signal::RefreshNow).is_err() {
            warn!("refresh worker is gone; refresh request dropped");
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("refresh worker panicked");
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(refresher: &Refresher, interval: Duration, geo: Option<&dyn GeoSource>, rx: &Receiver<Signal>) {
    if let Some(geo) = geo {
        resolve_location(geo, refresher.location());
    }

    loop {
        if stop_pending(rx) {
            break;
        }
        refresher.refresh();

        match rx.recv_timeout(interval) {
            Ok(Signal::RefreshNow) => debug!("manual refresh requested"),
            Err(RecvTimeoutError::Timeout) => debug!("scheduled refresh"),
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("refresh worker stopped");
}

/// Drain queued signals. Extra refresh requests collapse into the fetch that
/// is about to happen anyway.
fn stop_pending(rx: &Receiver<Signal>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(Signal::Stop) | Err(TryRecvError::Disconnected) => return true,
            Ok(Signal::RefreshNow) => continue,
            Err(TryRecvError::Empty) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoLookup, LocationCell};
    use crate::prayer_times::fetcher::TimetableQuery;
    use crate::prayer_times::fetcher::tests::{FakeSource, sample_schedule};
    use crate::prayer_times::location::tests::FakeGeo;
    use crate::prayer_times::store::ScheduleStore;
    use std::time::Instant;

    const LONG: Duration = Duration::from_secs(6 * 60 * 60);

    fn wait_for(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not met in time");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn refresher(source: Arc<FakeSource>) -> (Arc<Refresher>, ScheduleStore) {
        let store = ScheduleStore::new();
        let refresher = Arc::new(Refresher::new(source, store.clone(), LocationCell::default()));
        (refresher, store)
    }

    #[test]
    fn fetches_immediately_on_start() {
        let source = Arc::new(FakeSource::new(vec![Ok(sample_schedule())]));
        let (refresher, store) = refresher(source.clone());

        let worker = RefreshLoop::spawn(refresher, LONG, None).unwrap();
        wait_for(|| !store.is_empty());
        worker.stop();

        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn stop_during_wait_does_not_fetch_again() {
        let source = Arc::new(FakeSource::new(vec![Ok(sample_schedule())]));
        let (refresher, _store) = refresher(source.clone());

        let worker = RefreshLoop::spawn(refresher, LONG, None).unwrap();
        wait_for(|| source.calls() == 1);

        let started = Instant::now();
        worker.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn manual_request_fetches_again() {
        let source = Arc::new(FakeSource::new(vec![Ok(sample_schedule()), Ok(sample_schedule())]));
        let (refresher, _store) = refresher(source.clone());

        let worker = RefreshLoop::spawn(refresher, LONG, None).unwrap();
        wait_for(|| source.calls() == 1);
        worker.request_refresh();
        wait_for(|| source.calls() == 2);
        drop(worker);
    }

    #[test]
    fn short_interval_keeps_polling_and_survives_failures() {
        let source = Arc::new(FakeSource::new(vec![]));
        let (refresher, store) = refresher(source.clone());

        let worker = RefreshLoop::spawn(refresher, Duration::from_millis(20), None).unwrap();
        wait_for(|| source.calls() >= 3);
        worker.stop();

        assert!(store.is_empty());
    }

    #[test]
    fn resolves_location_before_first_fetch() {
        let source = Arc::new(FakeSource::new(vec![Ok(sample_schedule())]));
        let (refresher, _store) = refresher(source.clone());
        let geo = FakeGeo(Ok(GeoLookup {
            city: Some("Doha".into()),
            lat: Some(25.29),
            lon: Some(51.53),
            ..Default::default()
        }));

        let worker = RefreshLoop::spawn(refresher, LONG, Some(Box::new(geo))).unwrap();
        wait_for(|| source.calls() == 1);
        worker.stop();

        assert_eq!(
            source.queries.lock().unwrap()[0],
            TimetableQuery::Coordinates { latitude: 25.29, longitude: 51.53 }
        );
    }
}
