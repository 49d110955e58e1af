//! Health probes.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/health` | Aggregate status with per-dependency checks (503 when unhealthy) |
//! | GET | `/api/health/live` | Process is up |
//! | GET | `/api/health/ready` | Store reachable (503 otherwise) |
//! | GET | `/api/health/info` | Name, version, environment, pid, uptime |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::HealthService;
