//! Terminal input and heartbeats, merged into one channel.
//!
//! A background task reads crossterm events and interleaves them with a
//! slow `Tick` (toast expiry, "refreshed 12s ago") and a fast `Render`.

use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// New terminal size as (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Heartbeat periods.
#[derive(Debug, Clone, Copy)]
pub struct EventRates {
    pub tick: Duration,
    pub render: Duration,
}

impl Default for EventRates {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            render: Duration::from_millis(33),
        }
    }
}

/// Keep key presses and resizes. Releases, repeats, mouse and focus
/// events are dropped so a held key never double-submits a form.
fn translate(event: &CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(*key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(*cols, *rows)),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Read from the real terminal.
    pub fn new(rates: EventRates) -> Self {
        Self::from_source(EventStream::new(), rates)
    }

    fn from_source<S>(mut source: S, rates: EventRates) -> Self
    where
        S: Stream<Item = io::Result<CrosstermEvent>> + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let stopped = cancel.clone();

        tokio::spawn(async move {
            let mut tick = tokio::time::interval(rates.tick);
            let mut render = tokio::time::interval(rates.render);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            render.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = stopped.cancelled() => break,
                    _ = tick.tick() => Event::Tick,
                    _ = render.tick() => Event::Render,
                    Some(Ok(raw)) = source.next() => match translate(&raw) {
                        Some(event) => event,
                        None => continue,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
