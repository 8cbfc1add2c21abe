use serde::Serialize;

/// Liveness document returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Health check for load balancers and monitoring.
///
/// Only reports that the process is serving requests; it does not touch the database.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "hastane is alive".into(),
        }
    }
}
