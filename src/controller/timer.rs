use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// A tick from the timer started at `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub epoch: u64,
}

/// Owned periodic tick source for one playback item.
///
/// Dropping the timer aborts its task, so a discarded timer never delivers
/// another tick. A manual timer has no task; its owner drives ticks itself.
#[derive(Debug)]
pub struct PlaybackTimer {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackTimer {
    pub fn manual(epoch: u64) -> Self {
        Self {
            epoch,
            handle: None,
        }
    }

    /// Spawn a task sending a [`TimerTick`] to `sink` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(epoch: u64, period: Duration, sink: mpsc::UnboundedSender<TimerTick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if sink.send(TimerTick { epoch }).is_err() {
                    break;
                }
            }
        });

        Self {
            epoch,
            handle: Some(handle),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn accepts(&self, tick: TimerTick) -> bool {
        tick.epoch == self.epoch
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
