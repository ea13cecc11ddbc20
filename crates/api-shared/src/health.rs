use crate::wire::HealthRes;

/// Liveness check shared by the REST server and the CLI.
///
/// The service has no local state worth probing; upstream reachability is reported by
/// `GET /models` instead, so this only confirms the process is serving.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Returns a healthy status without needing an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "CID suggestion service is alive".into(),
        }
    }
}
