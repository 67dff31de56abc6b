use chrono::Utc;
use common::{AccessPoint, HardwareAddress, Job, NewJob, Result, WipiError};
use log::{error, info, warn};
use std::sync::Arc;

use crate::models::DeauthRequest;
use crate::radio::{DeauthParams, InterfaceValidator, RadioProvider};
use crate::store::JobStore;

/// Runs radio operations against validated interfaces and records deauth jobs.
#[derive(Clone)]
pub struct JobOrchestrator {
    radio: Arc<dyn RadioProvider>,
    validator: InterfaceValidator,
    jobs: Arc<dyn JobStore>,
}

impl JobOrchestrator {
    pub fn new(radio: Arc<dyn RadioProvider>, jobs: Arc<dyn JobStore>) -> Self {
        Self {
            validator: InterfaceValidator::new(radio.clone()),
            radio,
            jobs,
        }
    }

    /// Launches a deauthentication run and returns the stored job record.
    ///
    /// The radio process is started before the row is written, so a
    /// `JobPersistenceFailed` can come back while frames are already going out.
    pub async fn start_deauth(&self, request: DeauthRequest) -> Result<Job> {
        let live = self.validator.require(&request.interface).await?;
        if !live.monitor_mode {
            return Err(WipiError::BadRequest("interface not in monitor mode".to_string()));
        }

        let bssid: HardwareAddress = request.bssid.parse()?;
        if request.packets == 0 || request.delay == 0 {
            return Err(WipiError::BadRequest(
                "packets and delay must be greater than zero".to_string(),
            ));
        }

        let params = DeauthParams {
            interface: live.name,
            bssid,
            packets: request.packets,
            delay: request.delay,
        };

        let pid = self.radio.launch_deauth(&params).await?;
        info!(
            "Deauth launched on {} against {} ({} packets, {} ms delay, pid {:?})",
            params.interface, params.bssid, params.packets, params.delay, pid
        );

        let new_job = NewJob {
            interface: params.interface,
            bssid: params.bssid.to_string(),
            start: Utc::now().timestamp(),
            packets: params.packets,
            delay: params.delay,
        };

        let id = self.jobs.insert(new_job).await.map_err(|e| {
            error!("Failed to record deauth job: {}", e);
            WipiError::JobPersistenceFailed(e.to_string())
        })?;

        match self.jobs.lookup(id).await {
            Ok(Some(job)) => Ok(job),
            Ok(None) => {
                error!("Job {} vanished after insert", id);
                Err(WipiError::JobPersistenceFailed(format!("job {} not found", id)))
            }
            Err(e) => {
                error!("Failed to read back job {}: {}", id, e);
                Err(WipiError::JobPersistenceFailed(e.to_string()))
            }
        }
    }

    pub async fn set_monitor_mode(&self, interface: &str, active: bool) -> Result<()> {
        let live = self.validator.require(interface).await?;

        if self.radio.set_monitor_mode(&live.name, active).await? {
            info!("Monitor mode {} on {}", if active { "started" } else { "stopped" }, live.name);
            Ok(())
        } else {
            warn!("Monitor mode change on {} failed", live.name);
            Err(WipiError::BadRequest(format!(
                "failed to {} monitor mode on {}",
                if active { "start" } else { "stop" },
                live.name
            )))
        }
    }

    pub async fn scan(&self, interface: &str) -> Result<Vec<AccessPoint>> {
        self.radio.scan(interface).await.map_err(|e| match e {
            WipiError::ScannerInitFailed(_) => e,
            other => {
                warn!("Scan on {} failed: {}", interface, other);
                WipiError::ScannerInitFailed(interface.to_string())
            }
        })
    }
}
