// libs/scheduling-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::models::SchedulingError;
use crate::store::{AppointmentFilter, AppointmentStore};

/// Query view over the calendar: derives the occupied time labels for a
/// doctor on a given day from the set of active appointments.
pub struct SlotRegistry {
    store: Arc<dyn AppointmentStore>,
}

impl SlotRegistry {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Time labels held by pending or confirmed appointments on that day,
    /// in ascending label order.
    pub async fn booked_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, SchedulingError> {
        debug!("Listing booked slots for doctor {} on {}", doctor_id, date);

        let filter = AppointmentFilter {
            doctor_id: Some(doctor_id),
            date: Some(date),
            ..Default::default()
        }
        .active_only();

        let appointments = self
            .store
            .find(filter)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?;

        // `find` already orders by (date, time); at most one active
        // appointment exists per label, so no dedup is needed.
        Ok(appointments.into_iter().map(|apt| apt.time).collect())
    }
}
