use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::configuration::{Command, Config};
use crate::error_handling::types::*;
use crate::live_detection::{DeviceCamera, LiveSessionController, LiveView};
use crate::notification::{ConsoleNotifier, Notifier};
use crate::service_client::HttpDetectionService;
use crate::upload_analysis::{MediaFile, ReportFormat, UploadController};

/// Interval between two status summaries printed during a live session.
const LIVE_SUMMARY_PERIOD: Duration = Duration::from_secs(5);

/// Wires the configuration to the detection service and runs one command.
pub struct Controller {
    pub config: Config,
    service: HttpDetectionService,
    notifier: Arc<dyn Notifier>,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        Self::with_notifier(config, Arc::new(ConsoleNotifier::new()))
    }

    pub fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ControllerError> {
        let service = HttpDetectionService::new(&config.server_url, config.request_timeout())
            .map_err(|e| ControllerError::InitializationFailed(e.to_string()))?;
        debug!("Detection service at {}", service.base_url());

        Ok(Self {
            config,
            service,
            notifier,
        })
    }

    pub async fn run(&self, command: &Command) -> Result<(), ControllerError> {
        match command {
            Command::Live => self.run_live().await,
            Command::Analyze { file, exports, .. } => self.run_analyze(file, exports).await,
        }
    }

    /// Runs a live session until Ctrl-C is confirmed, then stops it.
    pub async fn run_live(&self) -> Result<(), ControllerError> {
        let camera = Arc::new(DeviceCamera::new(self.config.camera_device.clone()));
        let live = LiveSessionController::new(
            self.service.clone(),
            Arc::clone(&self.notifier),
            camera,
            self.config.live_settings(),
        );

        live.start().await?;
        info!("Press Ctrl-C to stop live detection");

        let mut summary = tokio::time::interval(LIVE_SUMMARY_PERIOD);
        summary.tick().await;
        loop {
            tokio::select! {
                _ = summary.tick() => log_summary(&live.view()),
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|e| {
                        ControllerError::InitializationFailed(format!("signal handler: {}", e))
                    })?;
                    match live.leave_prompt() {
                        Some(prompt) if !confirm(prompt).await => {
                            info!("Continuing live detection");
                        }
                        _ => break,
                    }
                }
            }
        }

        live.stop().await?;
        Ok(())
    }

    /// Submits `file`, prints the rendered verdict and writes the requested reports.
    pub async fn run_analyze(
        &self,
        file: &Path,
        exports: &[ReportFormat],
    ) -> Result<(), ControllerError> {
        let upload = UploadController::new(
            self.service.clone(),
            Arc::clone(&self.notifier),
            self.config.upload_settings(),
        );

        let media = MediaFile::from_path(file).await.map_err(UploadError::from)?;
        upload.select_file(media).map_err(UploadError::from)?;
        upload.analyze().await?;

        if let Some(view) = upload.results_view() {
            println!("{}", view);
        }

        for format in exports {
            let path = upload.export_report(*format, &self.config.export_dir)?;
            info!("Report written to {}", path.display());
        }
        Ok(())
    }
}

fn log_summary(view: &LiveView) {
    info!(
        "{} | {} | detections: {} | alert: {} | session {}",
        view.status,
        view.confidence_label(),
        view.total_detections,
        view.alert_level,
        view.session_duration
    );
}

/// Asks a yes/no question on stdin. End of input counts as yes.
async fn confirm(prompt: &str) -> bool {
    println!("{} [y/N]", prompt);
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|n| (n, line))
    })
    .await;

    match answer {
        Ok(Ok((0, _))) => true,
        Ok(Ok((_, line))) => is_affirmative(&line),
        Ok(Err(e)) => {
            warn!("Unable to read confirmation: {}", e);
            true
        }
        Err(e) => {
            error!("Confirmation task failed: {}", e);
            true
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
