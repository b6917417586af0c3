use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop.
#[derive(Clone, Debug)]
pub enum TrainerEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of app events (keyboard, resize, timer ticks).
pub trait EventSource: Send + 'static {
    /// Block until the next event. Returns `None` once every producer is
    /// gone.
    fn next_event(&self) -> Option<TrainerEvent>;
}

/// Channel-backed source; production wires a crossterm reader thread and a
/// `TickTimer` into the sending side, tests feed it directly.
pub struct ChannelEventSource {
    rx: Receiver<TrainerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn next_event(&self) -> Option<TrainerEvent> {
        match self.rx.recv() {
            Ok(ev) => Some(ev),
            Err(RecvError) => None,
        }
    }
}

/// Forward crossterm terminal events into the app channel.
pub fn spawn_input_thread(tx: Sender<TrainerEvent>) {
    thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(CtEvent::Key(key)) => Some(TrainerEvent::Key(key)),
            Ok(CtEvent::Resize(_, _)) => Some(TrainerEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(ev) = ev {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
}

/// Cancellable repeating timer feeding `Tick` events into the app channel.
///
/// One timer is owned per session lifetime; the owner must cancel it on
/// every exit path (completion, reset) so no timer outlives its session.
/// Dropping the handle cancels as a backstop.
#[derive(Debug)]
pub struct TickTimer {
    cancelled: Arc<AtomicBool>,
}

impl TickTimer {
    pub fn spawn(interval: Duration, tx: Sender<TrainerEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Relaxed) || tx.send(TrainerEvent::Tick).is_err() {
                break;
            }
        });

        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Steps the app one event at a time over any `EventSource`.
pub struct Runner<E: EventSource> {
    source: E,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E) -> Self {
        Self { source }
    }

    pub fn step(&self) -> Option<TrainerEvent> {
        self.source.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_channel_source_passes_events_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrainerEvent::Resize).unwrap();

        let runner = Runner::new(ChannelEventSource::new(rx));
        match runner.step() {
            Some(TrainerEvent::Resize) => {}
            other => panic!("expected Resize, got {other:?}"),
        }
    }

    #[test]
    fn test_runner_ends_when_source_closes() {
        let (tx, rx) = mpsc::channel::<TrainerEvent>();
        drop(tx);

        let runner = Runner::new(ChannelEventSource::new(rx));
        assert!(runner.step().is_none());
    }

    #[test]
    fn test_tick_timer_emits_ticks() {
        let (tx, rx) = mpsc::channel();
        let timer = TickTimer::spawn(Duration::from_millis(5), tx);

        let ev = rx.recv_timeout(Duration::from_millis(500));
        assert!(matches!(ev, Ok(TrainerEvent::Tick)));

        timer.cancel();
    }

    #[test]
    fn test_cancelled_timer_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let timer = TickTimer::spawn(Duration::from_millis(5), tx);
        assert!(!timer.is_cancelled());

        timer.cancel();
        assert!(timer.is_cancelled());

        // Let the timer thread observe the flag and exit, then drain the
        // at-most-one in-flight tick
        std::thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}

        std::thread::sleep(Duration::from_millis(50));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let (tx, rx) = mpsc::channel();
        let timer = TickTimer::spawn(Duration::from_millis(5), tx);
        drop(timer);

        std::thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}

        std::thread::sleep(Duration::from_millis(50));
        // Sender dropped with the thread: channel reports disconnect, not data
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::TryRecvError::Disconnected) | Err(mpsc::TryRecvError::Empty)
        ));
    }
}
