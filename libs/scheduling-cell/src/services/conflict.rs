// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::SchedulingError;
use crate::store::{AppointmentFilter, AppointmentStore};

/// Decides whether a candidate slot or (patient, doctor) pairing would
/// violate a uniqueness invariant. Only pending and confirmed appointments
/// count; completed and cancelled ones have released their claim.
pub struct ConflictValidator {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictValidator {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Is the (doctor, day, label) slot held by an active appointment other
    /// than `exclude_id`? Labels are compared by exact string equality.
    pub async fn slot_is_taken(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, SchedulingError> {
        debug!("Checking slot {} {} for doctor {}", date, time, doctor_id);

        let filter = AppointmentFilter {
            doctor_id: Some(doctor_id),
            date: Some(date),
            exclude_id,
            ..Default::default()
        }
        .active_only();

        let candidates = self
            .store
            .find(filter)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?;

        let taken = candidates.iter().any(|apt| apt.time == time);
        if taken {
            warn!("Slot {} {} already held for doctor {}", date, time, doctor_id);
        }
        Ok(taken)
    }

    /// Does the patient already hold an active appointment with this doctor?
    /// The date is deliberately ignored: one standing booking per pair.
    pub async fn has_standing_booking(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<bool, SchedulingError> {
        debug!(
            "Checking standing booking for patient {} with doctor {}",
            patient_id, doctor_id
        );

        let filter = AppointmentFilter {
            patient_id: Some(patient_id),
            doctor_id: Some(doctor_id),
            ..Default::default()
        }
        .active_only();

        let existing = self
            .store
            .find(filter)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?;

        Ok(!existing.is_empty())
    }
}
