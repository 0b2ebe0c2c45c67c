// libs/scheduling-cell/src/services/scheduling.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use directory_cell::directory::{DoctorDirectory, PatientDirectory};
use shared_utils::clock::Clock;

use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, CreateAppointmentRequest,
    RescheduleAppointmentRequest, SchedulingError,
};
use crate::services::conflict::ConflictValidator;
use crate::services::lifecycle::AppointmentLifecycle;
use crate::services::slots::SlotRegistry;
use crate::store::{AppointmentFilter, AppointmentStore, NewAppointment, StoreError};

/// Orchestrates create, reschedule, status-update and slot-query operations.
/// The only component other systems call.
pub struct SchedulingService {
    store: Arc<dyn AppointmentStore>,
    patients: Arc<dyn PatientDirectory>,
    doctors: Arc<dyn DoctorDirectory>,
    clock: Arc<dyn Clock>,
    conflict_validator: ConflictValidator,
    lifecycle: AppointmentLifecycle,
    slot_registry: SlotRegistry,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        patients: Arc<dyn PatientDirectory>,
        doctors: Arc<dyn DoctorDirectory>,
        clock: Arc<dyn Clock>,
        strict_transitions: bool,
    ) -> Self {
        let conflict_validator = ConflictValidator::new(Arc::clone(&store));
        let slot_registry = SlotRegistry::new(Arc::clone(&store));

        Self {
            store,
            patients,
            doctors,
            clock,
            conflict_validator,
            lifecycle: AppointmentLifecycle::new(strict_transitions),
            slot_registry,
        }
    }

    /// Book a new appointment. The new record starts out pending.
    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        let date = self.parse_future_day(&request.date)?;

        self.verify_patient_exists(request.patient_id).await?;
        self.verify_doctor_exists(request.doctor_id).await?;

        if self
            .conflict_validator
            .has_standing_booking(request.patient_id, request.doctor_id)
            .await?
        {
            return Err(SchedulingError::DuplicateBooking);
        }

        if self
            .conflict_validator
            .slot_is_taken(request.doctor_id, date, &request.time, None)
            .await?
        {
            return Err(SchedulingError::SlotTaken);
        }

        // The store repeats both checks under its own lock, so a racer that
        // slipped past the validator still loses here instead of
        // double-booking.
        let appointment = self
            .store
            .insert(NewAppointment {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                date,
                time: request.time,
                reason: request.reason,
                notes: request.notes,
            })
            .await
            .map_err(map_store_error)?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Move an existing appointment to a new slot. The appointment itself is
    /// excluded from the slot check, so moving onto its own current slot
    /// never conflicts. Status is reset to pending unconditionally.
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;

        let new_date = self.parse_future_day(&request.new_date)?;

        if self
            .conflict_validator
            .slot_is_taken(current.doctor_id, new_date, &request.new_time, Some(appointment_id))
            .await?
        {
            return Err(SchedulingError::SlotTaken);
        }

        let updated = self
            .store
            .reschedule(
                appointment_id,
                new_date,
                request.new_time,
                request.reason,
                request.notes,
            )
            .await
            .map_err(map_store_error)?;

        info!(
            "Appointment {} rescheduled to {} {}",
            appointment_id, updated.date, updated.time
        );
        Ok(updated)
    }

    /// Set an appointment's status. Strict mode enforces the lifecycle
    /// transition table; unknown status values never reach this point
    /// because they fail parsing at the boundary.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Updating appointment {} to {}", appointment_id, new_status);

        let current = self.get_appointment(appointment_id).await?;

        self.lifecycle
            .validate_transition(current.status, new_status)?;

        let updated = self
            .store
            .set_status(appointment_id, new_status)
            .await
            .map_err(map_store_error)?;

        info!("Appointment {} is now {}", appointment_id, updated.status);
        Ok(updated)
    }

    /// Occupied time labels for a doctor on a given day.
    pub async fn booked_slots(
        &self,
        doctor_id: Uuid,
        date: &str,
    ) -> Result<Vec<String>, SchedulingError> {
        let day = parse_calendar_day(date)?;
        self.slot_registry.booked_slots(doctor_id, day).await
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.store
            .find_by_id(appointment_id)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?
            .ok_or(SchedulingError::NotFound)
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let filter = AppointmentFilter {
            patient_id: query.patient_id,
            doctor_id: query.doctor_id,
            statuses: query.status.map(|s| vec![s]),
            ..Default::default()
        };

        self.store
            .find(filter)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    fn parse_future_day(&self, input: &str) -> Result<NaiveDate, SchedulingError> {
        let day = parse_calendar_day(input)?;

        // Time-of-day is already gone; only whole days are compared.
        if day < self.clock.today() {
            warn!("Rejected past date {}", day);
            return Err(SchedulingError::Validation(
                "Appointment date cannot be in the past".to_string(),
            ));
        }

        Ok(day)
    }

    async fn verify_patient_exists(&self, patient_id: Uuid) -> Result<(), SchedulingError> {
        self.patients
            .find_by_id(patient_id)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?
            .map(|_| ())
            .ok_or(SchedulingError::PatientNotFound)
    }

    async fn verify_doctor_exists(&self, doctor_id: Uuid) -> Result<(), SchedulingError> {
        self.doctors
            .find_by_id(doctor_id)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?
            .map(|_| ())
            .ok_or(SchedulingError::DoctorNotFound)
    }
}

/// Parse "YYYY-MM-DD" or an RFC 3339 timestamp down to the calendar day.
pub fn parse_calendar_day(input: &str) -> Result<NaiveDate, SchedulingError> {
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.date_naive());
    }

    Err(SchedulingError::Validation(format!(
        "Unparseable appointment date: {:?}",
        input
    )))
}

fn map_store_error(error: StoreError) -> SchedulingError {
    match error {
        StoreError::NotFound => SchedulingError::NotFound,
        StoreError::SlotTaken => SchedulingError::SlotTaken,
        StoreError::DuplicateBooking => SchedulingError::DuplicateBooking,
        StoreError::Backend(msg) => SchedulingError::Storage(msg),
    }
}
