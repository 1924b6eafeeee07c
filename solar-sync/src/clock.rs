//! Wall clock for the dashboard header, ticking once per cadence.

use crate::scheduler::MIN_INTERVAL;
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub struct Clock {
    rx: watch::Receiver<DateTime<Local>>,
    task: JoinHandle<()>,
}

impl Clock {
    /// Spawn the ticker; must run inside a tokio runtime
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = watch::channel(Local::now());
        let task = tokio::spawn(async move {
            let mut ticker = interval(period.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(Local::now()).is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn now(&self) -> DateTime<Local> {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DateTime<Local>> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// `14:05:09` and `Tuesday, 15 October 2024`
pub fn display(now: &DateTime<Local>) -> (String, String) {
    (now.format("%H:%M:%S").to_string(), now.format("%A, %d %B %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::time::timeout;

    #[tokio::test]
    async fn clock_ticks_until_stopped() {
        let clock = Clock::start(Duration::from_millis(10));
        let mut rx = clock.subscribe();
        let first = *rx.borrow_and_update();
        timeout(Duration::from_secs(1), rx.changed()).await.unwrap().unwrap();
        assert!(*rx.borrow() >= first);

        clock.stop();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.has_changed().is_err() || !rx.has_changed().unwrap());
    }

    #[test]
    fn display_formats_time_and_date() {
        let at = Local.with_ymd_and_hms(2024, 10, 15, 14, 5, 9).unwrap();
        let (time, date) = display(&at);
        assert_eq!(time, "14:05:09");
        assert_eq!(date, "Tuesday, 15 October 2024");
    }
}
