// actimon — Monitor Task (host builds)
//
// Stands in for the remote dashboard: consumes whatever the link delivered,
// logs each reading, and periodically logs where the time went.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::clock::Clock;
use crate::monitor::ActivityMonitor;

pub fn monitor_task<C: Clock>(rx: Receiver<String>, clock: C, summary_every: Duration) -> ActivityMonitor {
    log::info!("Monitor task started");

    let mut monitor = ActivityMonitor::new();
    let mut next_summary = clock.now() + summary_every;

    // Ends when every sender (the link) has been dropped.
    for line in rx.iter() {
        if let Some(reading) = monitor.ingest(&line) {
            log::info!(
                "Received {} ({:.1}%) a=({:.3}, {:.3}, {:.3}) g @ {} ms",
                reading.act,
                reading.confidence.unwrap_or(0.0) * 100.0,
                reading.ax,
                reading.ay,
                reading.az,
                reading.t
            );
        }

        if clock.now() >= next_summary {
            next_summary = clock.now() + summary_every;
            log::info!("Activity distribution over last {} readings: {:?}", monitor.len(), monitor.distribution());
        }
    }

    log::info!("Monitor task stopping");
    monitor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::Activity;
    use std::sync::mpsc;

    #[test]
    fn test_drains_until_link_closes() {
        let (tx, rx) = mpsc::channel();
        for (act, t) in [("Walking", 0), ("Walking", 500), ("Standing", 1000)] {
            tx.send(format!(
                r#"{{"act":"{act}","confidence":0.700,"ax":0.000,"ay":1.000,"az":0.000,"gx":0.0,"gy":0.0,"gz":0.0,"t":{t}}}"#
            ))
            .unwrap();
        }
        tx.send("garbage".to_owned()).unwrap();
        drop(tx);

        let monitor = monitor_task(rx, ManualClock::new(), Duration::from_secs(30));

        assert_eq!(monitor.len(), 3);
        assert_eq!(monitor.rejected(), 1);
        assert_eq!(monitor.latest().unwrap().act, Activity::Standing);
        assert_eq!(monitor.distribution(), vec![(Activity::Walking, 2), (Activity::Standing, 1)]);
    }
}
