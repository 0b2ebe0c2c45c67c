// libs/directory-cell/src/directory.rs
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Doctor, DirectoryError, Patient};

/// Lookup interface the scheduling core uses to verify a patient exists.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, DirectoryError>;
}

/// Lookup interface the scheduling core uses to verify a doctor exists.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, DirectoryError>;
}

/// In-memory directory backing both lookup traits plus the registration
/// endpoints. Reads vastly outnumber writes, hence the RwLock.
#[derive(Default)]
pub struct InMemoryDirectory {
    patients: RwLock<HashMap<Uuid, Patient>>,
    doctors: RwLock<HashMap<Uuid, Doctor>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_patient(
        &self,
        full_name: String,
        email: Option<String>,
    ) -> Result<Patient, DirectoryError> {
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name,
            email,
            created_at: Utc::now(),
        };

        let mut patients = self
            .patients
            .write()
            .map_err(|e| DirectoryError::Storage(e.to_string()))?;
        patients.insert(patient.id, patient.clone());

        debug!("Registered patient {}", patient.id);
        Ok(patient)
    }

    pub fn register_doctor(
        &self,
        full_name: String,
        specialty: Option<String>,
    ) -> Result<Doctor, DirectoryError> {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            full_name,
            specialty,
            created_at: Utc::now(),
        };

        let mut doctors = self
            .doctors
            .write()
            .map_err(|e| DirectoryError::Storage(e.to_string()))?;
        doctors.insert(doctor.id, doctor.clone());

        debug!("Registered doctor {}", doctor.id);
        Ok(doctor)
    }
}

#[async_trait]
impl PatientDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, DirectoryError> {
        let patients = self
            .patients
            .read()
            .map_err(|e| DirectoryError::Storage(e.to_string()))?;
        Ok(patients.get(&id).cloned())
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, DirectoryError> {
        let doctors = self
            .doctors
            .read()
            .map_err(|e| DirectoryError::Storage(e.to_string()))?;
        Ok(doctors.get(&id).cloned())
    }
}
