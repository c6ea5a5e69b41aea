use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal input plus a steady tick, merged into one channel. The reader
/// thread exits once the receiver is dropped.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    tick_pending: Arc<AtomicBool>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_pending = Arc::new(AtomicBool::new(false));
        let pending = Arc::clone(&tick_pending);

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                match event::poll(timeout) {
                    Ok(true) => {
                        let forwarded = match event::read() {
                            Ok(CEvent::Key(key)) => Some(Event::Key(key)),
                            Ok(CEvent::Resize(..)) => Some(Event::Resize),
                            Ok(_) => None,
                            Err(_) => break,
                        };
                        if let Some(ev) = forwarded {
                            if tx.send(ev).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(false) => {}
                    // No usable terminal: keep ticking without spinning.
                    Err(_) => thread::sleep(timeout),
                }

                if last_tick.elapsed() >= tick_rate {
                    // At most one tick in flight. Taking it in `next` re-arms.
                    if !pending.swap(true, Ordering::AcqRel) && tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx, tick_pending }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        let ev = self.rx.recv()?;
        if matches!(ev, Event::Tick) {
            self.tick_pending.store(false, Ordering::Release);
        }
        Ok(ev)
    }
}
