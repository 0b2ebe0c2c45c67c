// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentSearchQuery, CreateAppointmentRequest, RescheduleAppointmentRequest,
    SchedulingError, UpdateStatusRequest,
};
use crate::services::scheduling::SchedulingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct BookedSlotsQuery {
    pub date: String,
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<SchedulingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = service.create(request).await.map_err(map_scheduling_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(service): State<Arc<SchedulingService>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = service
        .search_appointments(query)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .reschedule(appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let new_status = request
        .status
        .parse()
        .map_err(map_scheduling_error)?;

    let appointment = service
        .update_status(appointment_id, new_status)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment status updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_booked_slots(
    State(service): State<Arc<SchedulingService>>,
    Path(doctor_id): Path<Uuid>,
    Query(params): Query<BookedSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = service
        .booked_slots(doctor_id, &params.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": params.date,
        "booked_slots": slots
    })))
}

fn map_scheduling_error(error: SchedulingError) -> AppError {
    match error {
        SchedulingError::NotFound
        | SchedulingError::PatientNotFound
        | SchedulingError::DoctorNotFound => AppError::NotFound(error.to_string()),
        SchedulingError::SlotTaken | SchedulingError::DuplicateBooking => {
            AppError::Conflict(error.to_string())
        }
        SchedulingError::Validation(_) | SchedulingError::InvalidTransition { .. } => {
            AppError::BadRequest(error.to_string())
        }
        SchedulingError::Storage(msg) => AppError::Internal(msg),
    }
}
