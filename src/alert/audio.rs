use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::alert::assets::AlertAssets;

const POLL: Duration = Duration::from_millis(100);

/// What an alert plays until dismissed.
#[derive(Debug, Clone, PartialEq)]
pub enum Playlist {
    /// The override track, looped. If the player rejects it, the scanned
    /// sounds play instead.
    Repeat { track: PathBuf, fallback: Vec<PathBuf> },
    /// Every scanned sound in turn, round and round.
    Cycle(Vec<PathBuf>),
}

impl Playlist {
    pub fn from_assets(assets: &AlertAssets) -> Option<Self> {
        if let Some(track) = &assets.music_override {
            return Some(Playlist::Repeat {
                track: track.clone(),
                fallback: assets.sounds.clone(),
            });
        }
        if assets.sounds.is_empty() {
            None
        } else {
            Some(Playlist::Cycle(assets.sounds.clone()))
        }
    }

    fn len(&self) -> usize {
        match self {
            Playlist::Repeat { .. } => 1,
            Playlist::Cycle(tracks) => tracks.len(),
        }
    }

    fn track(&self, idx: usize) -> &Path {
        match self {
            Playlist::Repeat { track, .. } => track,
            Playlist::Cycle(tracks) => &tracks[idx % tracks.len()],
        }
    }

    fn fallback(&self) -> Option<Playlist> {
        match self {
            Playlist::Repeat { fallback, .. } if !fallback.is_empty() => {
                Some(Playlist::Cycle(fallback.clone()))
            }
            _ => None,
        }
    }
}

/// Split a configured command line such as "paplay --volume 65536".
pub fn split_command(spec: &str) -> Option<(String, Vec<String>)> {
    let mut parts = spec.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Spawn `spec` with `target` appended, output discarded.
pub fn spawn_with(spec: &str, target: &Path) -> std::io::Result<Child> {
    let (program, args) = split_command(spec).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
    })?;
    Command::new(program)
        .args(args)
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

/// Plays a playlist through an external player on a worker thread, one
/// track at a time, until stopped or every track has failed in a row.
pub struct SoundLoop {
    tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SoundLoop {
    pub fn start(player: &str, playlist: Playlist) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let player = player.to_string();
        let handle = thread::Builder::new()
            .name("adhan-sound".into())
            .spawn(move || play(&player, playlist, &rx))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SoundLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum Played {
    Finished(bool),
    Stopped,
}

fn play(player: &str, mut playlist: Playlist, rx: &Receiver<()>) {
    let mut idx = 0;
    let mut failures = 0;

    loop {
        match rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        let track = playlist.track(idx);
        idx += 1;

        let ok = match spawn_with(player, track) {
            Ok(mut child) => match wait_or_stop(&mut child, rx) {
                Played::Stopped => break,
                Played::Finished(ok) => ok,
            },
            Err(e) => {
                warn!("could not start {:?} for {:?}: {}", player, track, e);
                false
            }
        };

        if ok {
            failures = 0;
        } else {
            failures += 1;
            debug!("skipping {:?}", track);
            if failures >= playlist.len() {
                match playlist.fallback() {
                    Some(next) => {
                        warn!("{:?} is not playable, falling back to scanned sounds", track);
                        playlist = next;
                        idx = 0;
                        failures = 0;
                    }
                    None => {
                        warn!("no playable sounds, alert stays silent");
                        break;
                    }
                }
            }
        }
    }
    info!("sound loop ended");
}

fn wait_or_stop(child: &mut Child, rx: &Receiver<()>) -> Played {
    loop {
        match rx.recv_timeout(POLL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = child.kill();
                let _ = child.wait();
                return Played::Stopped;
            }
            Err(RecvTimeoutError::Timeout) => match child.try_wait() {
                Ok(Some(status)) => return Played::Finished(status.success()),
                Ok(None) => {}
                Err(e) => {
                    warn!("lost track of player process: {}", e);
                    let _ = child.kill();
                    return Played::Finished(false);
                }
            },
        }
    }
}
