use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::core::error::Result;
use crate::features::health::dtos::{
    CheckDto, HealthChecksDto, HealthReportDto, InfoDto, LivenessDto, ReadinessDto,
};
use crate::features::locations::models::Collection;
use crate::features::locations::{GeoError, LocationStore};

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct HealthService {
    store: Arc<dyn LocationStore>,
    store_name: &'static str,
    environment: String,
    started_at: Instant,
}

impl HealthService {
    pub fn new(
        store: Arc<dyn LocationStore>,
        store_name: &'static str,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            store,
            store_name,
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn liveness(&self) -> LivenessDto {
        LivenessDto {
            status: "ok".to_string(),
            uptime_seconds: self.uptime_seconds(),
            timestamp: Utc::now(),
        }
    }

    async fn count_active(&self) -> std::result::Result<(i64, i64), GeoError> {
        let doctors = self.store.count(Collection::Doctor, true).await?;
        let facilities = self.store.count(Collection::Facility, true).await?;
        Ok((doctors, facilities))
    }

    /// Ready when the store answers a count on both collections
    pub async fn readiness(&self) -> Result<ReadinessDto> {
        let (active_doctors, active_facilities) = self.count_active().await?;

        Ok(ReadinessDto {
            status: "ready".to_string(),
            store: self.store_name.to_string(),
            active_doctors,
            active_facilities,
        })
    }

    /// Run every dependency check; failures are reported, never raised
    pub async fn report(&self) -> HealthReportDto {
        let started = Instant::now();
        let outcome = self.count_active().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let store = match outcome {
            Ok(_) => CheckDto {
                ok: true,
                latency_ms,
                error: None,
            },
            Err(e) => {
                tracing::error!("Health check on {} store failed: {}", self.store_name, e);
                CheckDto {
                    ok: false,
                    latency_ms,
                    error: Some("store unreachable".to_string()),
                }
            }
        };

        let checks = HealthChecksDto { store };
        let status = if checks.store.ok { "healthy" } else { "unhealthy" };

        HealthReportDto {
            name: SERVICE_NAME.to_string(),
            status: status.to_string(),
            uptime_seconds: self.uptime_seconds(),
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn info(&self) -> InfoDto {
        InfoDto {
            name: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            environment: self.environment.clone(),
            store: self.store_name.to_string(),
            pid: std::process::id(),
            cpu_count: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}
