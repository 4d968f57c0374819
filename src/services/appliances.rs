use crate::models::{ApplianceId, AppliancePowerState};
use crate::repositories::store::KEY_TOTAL;
use crate::repositories::{BackendClient, StateStore};
use tracing::{info, warn};

/// Owns the in-memory appliance state between load and an explicit save.
/// Toggles and optimizer reconciliation stay in memory until `commit`.
pub struct ApplianceStateService {
    store: StateStore,
    state: AppliancePowerState,
}

impl ApplianceStateService {
    /// Read every appliance's stored 0/1 flag. Absent or malformed values
    /// read as off; loading never fails.
    pub fn load(store: StateStore) -> Self {
        let mut state = AppliancePowerState::new();
        for id in ApplianceId::ALL {
            state.set(id, store.get_bool_flag(id.name()) == 1);
        }
        Self { store, state }
    }

    pub fn state(&self) -> &AppliancePowerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppliancePowerState {
        &mut self.state
    }

    pub fn toggle(&mut self, id: ApplianceId) {
        self.state.toggle(id);
    }

    pub fn total_consumption(&self) -> f64 {
        self.state.total_consumption()
    }

    /// Flush every flag plus the recomputed total. This is the only path
    /// that reaches durable storage; returns the committed total.
    pub fn commit(&self) -> f64 {
        for (id, flag) in ApplianceId::ALL.iter().zip(self.state.flags()) {
            self.store.set_bool_flag(id.name(), flag);
        }
        let total = self.state.total_consumption();
        self.store.set_number(KEY_TOTAL, total);
        info!(total, "appliance state committed");
        total
    }

    /// Commit locally, then mirror the result to the backend when a user
    /// email is configured. A failed sync leaves the local commit in place.
    pub async fn commit_and_sync(
        &self,
        backend: &BackendClient,
        email: Option<&str>,
    ) -> f64 {
        let total = self.commit();
        if let Some(email) = email {
            match backend.update_states(email, self.state.flags(), total).await {
                Ok(()) => info!(email, "appliance state synced to backend"),
                Err(e) => warn!(email, error = %e, "state sync to backend failed"),
            }
        }
        total
    }
}
