// crates/rhem-daemon/src/shared.rs
//
// DaemonSharedState: the platform and its clock, constructed once in main.rs
// and handed to the RPC service.

use std::sync::Arc;

use tokio::sync::RwLock;

use rhem_core::{Clock, ManualClock, SystemClock};
use rhem_economics::Platform;
use rhem_rpc::RhemService;

use crate::config::ClockMode;

/// Shared mutable state for the daemon. The platform sits behind one
/// `RwLock`: every mutating RPC call holds the write guard for its duration.
#[derive(Clone)]
pub struct DaemonSharedState {
    pub platform: Arc<RwLock<Platform>>,
    pub clock: Arc<dyn Clock>,
    /// Present in manual-clock mode.
    pub manual_clock: Option<Arc<ManualClock>>,
}

impl DaemonSharedState {
    pub fn new(platform: Platform, mode: ClockMode) -> Self {
        let platform = Arc::new(RwLock::new(platform));
        match mode {
            ClockMode::System => Self {
                platform,
                clock: Arc::new(SystemClock),
                manual_clock: None,
            },
            ClockMode::Manual => {
                let manual = Arc::new(ManualClock::new(SystemClock.now()));
                Self {
                    platform,
                    clock: manual.clone(),
                    manual_clock: Some(manual),
                }
            }
        }
    }

    /// Build the RPC service over this state.
    pub fn rpc_service(&self) -> RhemService {
        match &self.manual_clock {
            Some(manual) => RhemService::with_manual_clock(self.platform.clone(), manual.clone()),
            None => RhemService::new(self.platform.clone(), self.clock.clone()),
        }
    }
}
