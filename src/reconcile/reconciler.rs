use std::pin::pin;
use std::time::Duration;

use futures::future::{Either, select};
use tracing::debug;

use super::StopToken;
use crate::mirror::{MirrorRoots, MissingSourcePolicy, PassError, PassSummary, run_pass};
use crate::report::{Reporter, SyncEvent};

/// Repeats mirroring passes on a fixed interval until stopped.
///
/// Passes never overlap: the next one starts only after the previous pass
/// and the following sleep are both over. A failed pass is reported and
/// retried on schedule; only the stop token ends the loop.
pub struct Reconciler<R> {
    roots: MirrorRoots,
    interval: Duration,
    policy: MissingSourcePolicy,
    reporter: R,
}

impl<R: Reporter> Reconciler<R> {
    pub fn new(
        roots: MirrorRoots,
        interval: Duration,
        policy: MissingSourcePolicy,
        reporter: R,
    ) -> Self {
        Self {
            roots,
            interval,
            policy,
            reporter,
        }
    }

    pub fn run_once(&self) -> Result<PassSummary, PassError> {
        run_pass(&self.roots, self.policy, &self.reporter)
    }

    /// Runs until `stop` fires and returns the number of passes executed.
    ///
    /// The token is checked before every pass and raced against every
    /// sleep, so a stop request never waits out a full interval.
    pub async fn run(&self, stop: &StopToken) -> usize {
        let mut passes = 0;

        while !stop.is_stopped() {
            match self.run_once() {
                Ok(summary) => debug!("Pass {} finished: {:?}", passes + 1, summary),
                Err(err) if err.is_missing_source() => {
                    debug!("Pass {} skipped, source missing", passes + 1)
                }
                Err(err) => debug!("Pass {} aborted: {}", passes + 1, err),
            }
            passes += 1;

            self.reporter.report(SyncEvent::Sleeping {
                interval: self.interval,
            });
            let sleep = pin!(compio::time::sleep(self.interval));
            let stopped = pin!(stop.stopped());
            if let Either::Right(_) = select(sleep, stopped).await {
                break;
            }
        }

        self.reporter.report(SyncEvent::Stopped);
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::stop_channel;
    use crate::report::RecordingReporter;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn roots(dir: &TempDir) -> MirrorRoots {
        MirrorRoots::new(dir.path().join("source"), dir.path().join("replica"))
    }

    #[compio::test]
    async fn stop_before_start_runs_no_pass() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_secs(1),
            MissingSourcePolicy::Skip,
            &reporter,
        );
        let (handle, token) = stop_channel();
        handle.stop();

        let passes = reconciler.run(&token).await;

        assert_eq!(passes, 0);
        assert_eq!(reporter.events(), vec![SyncEvent::Stopped]);
    }

    #[compio::test]
    async fn stop_interrupts_a_long_sleep() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("source")).unwrap();
        fs::write(dir.path().join("source/a.txt"), "alpha").unwrap();
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_secs(3600),
            MissingSourcePolicy::Skip,
            &reporter,
        );
        let (handle, token) = stop_channel();
        let started = Instant::now();

        let (passes, ()) = futures::join!(reconciler.run(&token), async move {
            compio::time::sleep(Duration::from_millis(50)).await;
            handle.stop();
        });

        assert_eq!(passes, 1);
        assert!(started.elapsed() < Duration::from_secs(60));
        assert!(dir.path().join("replica/a.txt").is_file());
        let events = reporter.events();
        assert!(events.contains(&SyncEvent::Sleeping {
            interval: Duration::from_secs(3600)
        }));
        assert_eq!(events.last(), Some(&SyncEvent::Stopped));
    }

    #[compio::test]
    async fn missing_source_does_not_end_the_loop() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_millis(10),
            MissingSourcePolicy::Skip,
            &reporter,
        );
        let (handle, token) = stop_channel();

        let (passes, ()) = futures::join!(reconciler.run(&token), async move {
            compio::time::sleep(Duration::from_millis(200)).await;
            handle.stop();
        });

        assert!(passes >= 2, "expected retries, got {passes} passes");
        let missing =
            reporter.count(|event| matches!(event, SyncEvent::MissingSource { .. }));
        assert_eq!(missing, passes);
        assert_eq!(reporter.events().last(), Some(&SyncEvent::Stopped));
    }

    #[cfg(unix)]
    #[compio::test]
    async fn listing_failure_is_retried_on_schedule() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp dir");
        let replica = dir.path().join("replica");
        fs::create_dir(dir.path().join("source")).unwrap();
        fs::write(dir.path().join("source/a.txt"), "alpha").unwrap();
        fs::create_dir(&replica).unwrap();
        fs::set_permissions(&replica, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&replica).is_ok() {
            // Privileged users can list the directory regardless.
            fs::set_permissions(&replica, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_millis(10),
            MissingSourcePolicy::Skip,
            &reporter,
        );
        let (handle, token) = stop_channel();

        let (passes, ()) = futures::join!(reconciler.run(&token), async move {
            compio::time::sleep(Duration::from_millis(200)).await;
            handle.stop();
        });
        fs::set_permissions(&replica, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(passes >= 2, "expected retries, got {passes} passes");
        assert_eq!(
            reporter.count(|event| matches!(event, SyncEvent::PassAborted { .. })),
            passes
        );
        assert_eq!(
            reporter.count(|event| matches!(event, SyncEvent::Sleeping { .. })),
            passes
        );
        assert!(reporter.mutations().is_empty());
        assert_eq!(reporter.events().last(), Some(&SyncEvent::Stopped));
    }

    #[compio::test]
    async fn later_pass_picks_up_source_changes() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_millis(10),
            MissingSourcePolicy::Skip,
            &reporter,
        );
        let (handle, token) = stop_channel();

        let (_, ()) = futures::join!(reconciler.run(&token), async move {
            compio::time::sleep(Duration::from_millis(40)).await;
            fs::write(source.join("late.txt"), "late").unwrap();
            compio::time::sleep(Duration::from_millis(150)).await;
            handle.stop();
        });

        assert!(dir.path().join("replica/late.txt").is_file());
        assert_eq!(
            reporter.count(|event| matches!(event, SyncEvent::CopiedFile { .. })),
            1
        );
    }

    #[test]
    fn run_once_reports_a_single_pass() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("source")).unwrap();
        let reporter = RecordingReporter::new();
        let reconciler = Reconciler::new(
            roots(&dir),
            Duration::from_secs(1),
            MissingSourcePolicy::Skip,
            &reporter,
        );

        let summary = reconciler.run_once().expect("pass succeeds");

        assert_eq!(summary, PassSummary::default());
        assert_eq!(
            reporter.count(|event| matches!(event, SyncEvent::PassStarted)),
            1
        );
    }
}
