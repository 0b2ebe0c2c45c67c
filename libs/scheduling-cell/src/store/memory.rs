// libs/scheduling-cell/src/store/memory.rs
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};
use crate::store::{AppointmentFilter, AppointmentStore, NewAppointment, StoreError};

/// Mutex-backed appointment store. The whole table is guarded by one lock so
/// the conflict check and the write inside `insert`/`reschedule` form a
/// single critical section; two racing creates for the same slot cannot both
/// observe it free.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_held(
        table: &HashMap<Uuid, Appointment>,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        exclude_id: Option<Uuid>,
    ) -> bool {
        table.values().any(|apt| {
            apt.is_active()
                && apt.doctor_id == doctor_id
                && apt.date == date
                && apt.time == time
                && Some(apt.id) != exclude_id
        })
    }

    fn standing_booking_exists(
        table: &HashMap<Uuid, Appointment>,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> bool {
        table
            .values()
            .any(|apt| apt.is_active() && apt.patient_id == patient_id && apt.doctor_id == doctor_id)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Appointment>>, StoreError> {
        self.appointments
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, record: NewAppointment) -> Result<Appointment, StoreError> {
        let mut table = self.lock()?;

        if Self::standing_booking_exists(&table, record.patient_id, record.doctor_id) {
            return Err(StoreError::DuplicateBooking);
        }
        if Self::slot_held(&table, record.doctor_id, record.date, &record.time, None) {
            return Err(StoreError::SlotTaken);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            date: record.date,
            time: record.time,
            reason: record.reason,
            notes: record.notes,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };

        table.insert(appointment.id, appointment.clone());
        debug!("Stored appointment {}", appointment.id);
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let table = self.lock()?;
        Ok(table.get(&id).cloned())
    }

    async fn find(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let table = self.lock()?;

        let mut matches: Vec<Appointment> = table
            .values()
            .filter(|apt| {
                filter.patient_id.map_or(true, |p| apt.patient_id == p)
                    && filter.doctor_id.map_or(true, |d| apt.doctor_id == d)
                    && filter.date.map_or(true, |day| apt.date == day)
                    && filter
                        .statuses
                        .as_ref()
                        .map_or(true, |statuses| statuses.contains(&apt.status))
                    && filter.exclude_id.map_or(true, |id| apt.id != id)
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(matches)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        new_date: NaiveDate,
        new_time: String,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<Appointment, StoreError> {
        let mut table = self.lock()?;

        let current = table.get(&id).cloned().ok_or(StoreError::NotFound)?;

        // The appointment being moved never conflicts with itself.
        if Self::slot_held(&table, current.doctor_id, new_date, &new_time, Some(id)) {
            return Err(StoreError::SlotTaken);
        }

        let entry = table.get_mut(&id).ok_or(StoreError::NotFound)?;
        entry.date = new_date;
        entry.time = new_time;
        if let Some(reason) = reason {
            entry.reason = reason;
        }
        if let Some(notes) = notes {
            entry.notes = Some(notes);
        }
        // A moved appointment needs confirmation again.
        entry.status = AppointmentStatus::Pending;

        debug!("Rescheduled appointment {} to {} {}", id, entry.date, entry.time);
        Ok(entry.clone())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, StoreError> {
        let mut table = self.lock()?;
        let entry = table.get_mut(&id).ok_or(StoreError::NotFound)?;
        entry.status = status;
        Ok(entry.clone())
    }
}
