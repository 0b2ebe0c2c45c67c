// libs/scheduling-cell/src/store/mod.rs
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

pub use memory::InMemoryAppointmentStore;

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub notes: Option<String>,
}

/// Equality filter over stored appointments. `None` fields match anything;
/// `exclude_id` drops one record, which reschedule uses to exempt itself
/// from the slot check.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub statuses: Option<Vec<AppointmentStatus>>,
    pub exclude_id: Option<Uuid>,
}

impl AppointmentFilter {
    /// Restrict to appointments that still hold their slot.
    pub fn active_only(mut self) -> Self {
        self.statuses = Some(vec![AppointmentStatus::Pending, AppointmentStatus::Confirmed]);
        self
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot already held by an active appointment")]
    SlotTaken,

    #[error("Active appointment already exists for this patient and doctor")]
    DuplicateBooking,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence for appointments. Implementations enforce both uniqueness
/// invariants inside `insert` and `reschedule` as a single atomic
/// check-and-reserve, so concurrent callers cannot both claim one slot.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, record: NewAppointment) -> Result<Appointment, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Matching appointments ordered by (date, time label).
    async fn find(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    /// Move an appointment to a new slot, re-checking the slot invariant
    /// against every other active appointment, and reset its status to
    /// pending.
    async fn reschedule(
        &self,
        id: Uuid,
        new_date: NaiveDate,
        new_time: String,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<Appointment, StoreError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, StoreError>;
}
