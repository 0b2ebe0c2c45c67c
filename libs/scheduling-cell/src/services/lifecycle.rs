// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentStatus, SchedulingError};

/// State machine governing status values. Strict mode validates updates
/// against the transition table below; permissive mode accepts any value
/// from any prior state, matching the legacy behavior.
///
/// Reschedule is not routed through this table: it always forces an
/// appointment back to pending.
pub struct AppointmentLifecycle {
    strict: bool,
}

impl AppointmentLifecycle {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Validate a status update. Setting the current status again is a no-op
    /// and always allowed.
    pub fn validate_transition(
        &self,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition {} -> {}", from, to);

        if !self.strict || from == to {
            return Ok(());
        }

        if !Self::valid_transitions(from).contains(&to) {
            warn!("Rejected status transition {} -> {}", from, to);
            return Err(SchedulingError::InvalidTransition { from, to });
        }

        Ok(())
    }

    /// Allowed next statuses for a given current status.
    pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
        match from {
            AppointmentStatus::Pending => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
            }
            // Terminal states.
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }
}
