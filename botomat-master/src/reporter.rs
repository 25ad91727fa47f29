use std::{sync::Arc, time::Duration};

use botomat_core::{StatusSnapshot, WorkerStore};
use tokio::time::sleep;
use tracing::info;

use crate::shutdown::{shutdown_manager::Shutdown, shutdown_reason::ShutdownReason};

pub fn log_snapshot(title: &str, snapshot: &StatusSnapshot) {
    info!(target: "botomat::report", "{}: {}", title, snapshot.info);
    for robot in &snapshot.robots {
        info!(target: "botomat::report", "  {} {}", robot.name, robot.status);
    }
}

/// Logs a snapshot of the store every `report_interval` until shutdown.
pub async fn start_reporter_fiber(
    store: WorkerStore,
    tasks_per_worker: usize,
    report_interval: Duration,
    shutdown: Arc<Shutdown<ShutdownReason>>,
) {
    let fiber = tokio::spawn(async move {
        loop {
            sleep(report_interval).await;
            let snapshot = store.snapshot(tasks_per_worker).await;
            log_snapshot("Report", &snapshot);
        }
    });

    shutdown
        .register_shutdown_task(
            || {
                Box::pin(async move {
                    fiber.abort();
                    info!("Aborted reporter fiber");
                    let exit = fiber.await;
                    info!("reporter exited: {:?}", exit);
                })
            },
            "reporter",
        )
        .await;
}

#[cfg(test)]
mod tests {
    use std::{io::Write, sync::Mutex as StdMutex};

    use botomat_core::{Assignment, Task, WorkerId};
    use tracing_subscriber::EnvFilter;

    use super::*;
    use crate::shutdown::shutdown_manager::ShutdownManager;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<StdMutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        fn report_count(&self) -> usize {
            self.contents().matches("Report: Report Robot Status @").count()
        }
    }

    #[tokio::test]
    async fn test_reporter_logs_the_store_on_every_tick() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_env_filter(EnvFilter::new("botomat::report=info"))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = WorkerStore::new();
        let mut busy = Assignment::new(
            WorkerId(1),
            None,
            vec![Task::new("sweep", 100), Task::new("wash", 50)],
        );
        busy.complete_next();
        store.register(busy).await;

        let manager = ShutdownManager::<ShutdownReason>::new();
        start_reporter_fiber(
            store,
            2,
            Duration::from_millis(5),
            manager.shutdown.clone(),
        )
        .await;

        sleep(Duration::from_millis(40)).await;

        assert!(log.report_count() >= 2, "log was: {}", log.contents());
        assert!(log
            .contents()
            .contains("Task-1 Working on Task: wash: Completed 1 Tasks"));

        manager.shutdown.trigger(ShutdownReason::Done).await;
        let reports_at_shutdown = log.report_count();

        sleep(Duration::from_millis(30)).await;
        assert_eq!(log.report_count(), reports_at_shutdown);
    }

    #[tokio::test]
    async fn test_reporter_stops_on_shutdown() {
        let manager = ShutdownManager::<ShutdownReason>::new();
        start_reporter_fiber(
            WorkerStore::new(),
            2,
            Duration::from_millis(5),
            manager.shutdown.clone(),
        )
        .await;

        sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(
            Duration::from_secs(1),
            manager.shutdown.trigger(ShutdownReason::Done),
        )
        .await
        .expect("reporter should stop promptly");

        assert_eq!(manager.await_shutdown().await.unwrap(), ShutdownReason::Done);
    }
}
