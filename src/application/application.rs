use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, error, info};

use crate::application::RuntimeConfig;
use crate::ext::BestEffortPathExt;
use crate::mirror::PassError;
use crate::reconcile::{Reconciler, StopHandle, stop_channel};
use crate::report::TracingReporter;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        info!(
            "Mirroring {} into {} every {}",
            app_config.source().best_effort_path_display(),
            app_config.replica().best_effort_path_display(),
            app_config.interval
        );

        let reconciler = Reconciler::new(
            app_config.roots.clone(),
            app_config.interval.into(),
            app_config.missing_source,
            TracingReporter,
        );

        if app_config.once {
            let summary = reconciler.run_once().context(SinglePassSnafu)?;
            ensure!(
                summary.failed == 0,
                IncompletePassSnafu {
                    failed: summary.failed
                }
            );
            return Ok(());
        }

        let (handle, token) = stop_channel();
        Self::stop_on_interrupt(handle);

        let passes = reconciler.run(&token).await;
        debug!("Reconciliation loop ended after {passes} passes");

        Ok(())
    }

    fn stop_on_interrupt(handle: StopHandle) {
        compio::runtime::spawn(async move {
            match compio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received interrupt, stopping after the current step");
                    handle.stop();
                }
                Err(err) => error!("Failed to listen for interrupts: {err}"),
            }
        })
        .detach();
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    #[snafu(display("Failed to open log file {}", path.best_effort_path_display()))]
    LogFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Single pass could not run"))]
    SinglePassError { source: PassError },
    #[snafu(display("Single pass finished with {} failed entries", failed))]
    IncompletePass { failed: usize },
}
