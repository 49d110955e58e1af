use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LivenessDto {
    pub status: String,
    pub uptime_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// Readiness report with the number of active records per collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessDto {
    pub status: String,
    /// Backing store, `postgres` or `memory`
    pub store: String,
    pub active_doctors: i64,
    pub active_facilities: i64,
}

/// Outcome of a single dependency check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDto {
    pub ok: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthChecksDto {
    pub store: CheckDto,
}

/// Aggregate system health, `healthy` only when every check passes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportDto {
    pub name: String,
    pub status: String,
    pub uptime_seconds: f64,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecksDto,
}

impl HealthReportDto {
    pub fn is_healthy(&self) -> bool {
        self.checks.store.ok
    }
}

/// Process details for debugging deployments
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub store: String,
    pub pid: u32,
    pub cpu_count: usize,
    pub uptime_seconds: f64,
}
