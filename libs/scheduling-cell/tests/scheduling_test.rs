use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;

use directory_cell::directory::InMemoryDirectory;
use directory_cell::models::{Doctor, Patient};
use scheduling_cell::models::{
    AppointmentStatus, CreateAppointmentRequest, RescheduleAppointmentRequest, SchedulingError,
};
use scheduling_cell::services::scheduling::SchedulingService;
use scheduling_cell::store::InMemoryAppointmentStore;
use shared_utils::clock::FixedClock;

const TODAY: &str = "2025-06-01";

struct TestContext {
    service: Arc<SchedulingService>,
    directory: Arc<InMemoryDirectory>,
    patient: Patient,
    other_patient: Patient,
    doctor: Doctor,
    other_doctor: Doctor,
}

fn setup() -> TestContext {
    setup_with_strict(true)
}

fn setup_with_strict(strict: bool) -> TestContext {
    let directory = Arc::new(InMemoryDirectory::new());
    let patient = directory
        .register_patient("Ada Lovelace".to_string(), None)
        .unwrap();
    let other_patient = directory
        .register_patient("Grace Hopper".to_string(), None)
        .unwrap();
    let doctor = directory
        .register_doctor("Dr. Watson".to_string(), Some("General".to_string()))
        .unwrap();
    let other_doctor = directory
        .register_doctor("Dr. Crusher".to_string(), None)
        .unwrap();

    let today = NaiveDate::parse_from_str(TODAY, "%Y-%m-%d").unwrap();
    let service = Arc::new(SchedulingService::new(
        Arc::new(InMemoryAppointmentStore::new()),
        directory.clone(),
        directory.clone(),
        Arc::new(FixedClock::new(today)),
        strict,
    ));

    TestContext {
        service,
        directory,
        patient,
        other_patient,
        doctor,
        other_doctor,
    }
}

fn booking(patient_id: Uuid, doctor_id: Uuid, date: &str, time: &str) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id,
        doctor_id,
        date: date.to_string(),
        time: time.to_string(),
        reason: "checkup".to_string(),
        notes: None,
    }
}

fn move_to(date: &str, time: &str) -> RescheduleAppointmentRequest {
    RescheduleAppointmentRequest {
        new_date: date.to_string(),
        new_time: time.to_string(),
        reason: None,
        notes: None,
    }
}

// ==============================================================================
// CREATE
// ==============================================================================

#[tokio::test]
async fn create_returns_pending_appointment() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.time, "09:00");
    assert_eq!(
        appointment.date,
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    );
}

#[tokio::test]
async fn create_rejects_unknown_patient_and_doctor() {
    let ctx = setup();

    let result = ctx
        .service
        .create(booking(Uuid::new_v4(), ctx.doctor.id, "2025-06-10", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::PatientNotFound));

    let result = ctx
        .service
        .create(booking(ctx.patient.id, Uuid::new_v4(), "2025-06-10", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::DoctorNotFound));
}

#[tokio::test]
async fn create_rejects_taken_slot() {
    let ctx = setup();

    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    let result = ctx
        .service
        .create(booking(
            ctx.other_patient.id,
            ctx.doctor.id,
            "2025-06-10",
            "09:00",
        ))
        .await;
    assert_matches!(result, Err(SchedulingError::SlotTaken));
}

#[tokio::test]
async fn create_rejects_second_standing_booking_with_same_doctor() {
    let ctx = setup();

    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    // Different day and label; the standing-booking invariant ignores dates.
    let result = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-07-01", "10:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::DuplicateBooking));

    // Same patient with a different doctor is fine.
    ctx.service
        .create(booking(ctx.patient.id, ctx.other_doctor.id, "2025-06-10", "10:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_rejects_past_and_unparseable_dates() {
    let ctx = setup();

    let result = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2020-01-01", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));

    // A past day stays past regardless of the time-of-day attached to it.
    let result = ctx
        .service
        .create(booking(
            ctx.patient.id,
            ctx.doctor.id,
            "2025-05-31T23:59:00Z",
            "09:00",
        ))
        .await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));

    let result = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "soon", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));
}

#[tokio::test]
async fn create_accepts_today_and_normalizes_timestamps() {
    let ctx = setup();

    // Booking on the current day is allowed.
    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, TODAY, "09:00"))
        .await
        .unwrap();

    // A timestamped input lands on its calendar day.
    let appointment = ctx
        .service
        .create(booking(
            ctx.other_patient.id,
            ctx.doctor.id,
            "2025-06-10T14:30:00Z",
            "14:30",
        ))
        .await
        .unwrap();
    assert_eq!(
        appointment.date,
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    );
}

// ==============================================================================
// RESCHEDULE
// ==============================================================================

#[tokio::test]
async fn reschedule_moves_slot_and_resets_status() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    ctx.service
        .update_status(appointment.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();

    let moved = ctx
        .service
        .reschedule(appointment.id, move_to("2025-06-11", "11:00"))
        .await
        .unwrap();

    assert_eq!(moved.status, AppointmentStatus::Pending);
    assert_eq!(moved.date, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
    assert_eq!(moved.time, "11:00");
}

#[tokio::test]
async fn reschedule_onto_own_slot_never_conflicts() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    let moved = ctx
        .service
        .reschedule(appointment.id, move_to("2025-06-10", "09:00"))
        .await
        .unwrap();
    assert_eq!(moved.time, "09:00");
}

#[tokio::test]
async fn reschedule_rejects_slot_held_by_another_appointment() {
    let ctx = setup();

    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();
    let second = ctx
        .service
        .create(booking(
            ctx.other_patient.id,
            ctx.doctor.id,
            "2025-06-10",
            "10:00",
        ))
        .await
        .unwrap();

    let result = ctx
        .service
        .reschedule(second.id, move_to("2025-06-10", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::SlotTaken));
}

#[tokio::test]
async fn reschedule_rejects_past_date_and_missing_appointment() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    let result = ctx
        .service
        .reschedule(appointment.id, move_to("2024-01-01", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));

    let result = ctx
        .service
        .reschedule(Uuid::new_v4(), move_to("2025-06-12", "09:00"))
        .await;
    assert_matches!(result, Err(SchedulingError::NotFound));
}

#[tokio::test]
async fn reschedule_updates_reason_and_notes_when_given() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    let moved = ctx
        .service
        .reschedule(
            appointment.id,
            RescheduleAppointmentRequest {
                new_date: "2025-06-12".to_string(),
                new_time: "10:00".to_string(),
                reason: Some("followup".to_string()),
                notes: Some("bring previous results".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.reason, "followup");
    assert_eq!(moved.notes.as_deref(), Some("bring previous results"));
}

// ==============================================================================
// STATUS UPDATES AND SLOT RELEASE
// ==============================================================================

#[tokio::test]
async fn status_walks_through_the_lifecycle() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    let confirmed = ctx
        .service
        .update_status(appointment.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let completed = ctx
        .service
        .update_status(appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn strict_mode_rejects_reviving_terminal_appointments() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();
    ctx.service
        .update_status(appointment.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();

    let result = ctx
        .service
        .update_status(appointment.id, AppointmentStatus::Pending)
        .await;
    assert_matches!(result, Err(SchedulingError::InvalidTransition { .. }));
}

#[tokio::test]
async fn permissive_mode_allows_any_transition() {
    let ctx = setup_with_strict(false);

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();
    ctx.service
        .update_status(appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let revived = ctx
        .service
        .update_status(appointment.id, AppointmentStatus::Pending)
        .await
        .unwrap();
    assert_eq!(revived.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn update_status_rejects_missing_appointment() {
    let ctx = setup();

    let result = ctx
        .service
        .update_status(Uuid::new_v4(), AppointmentStatus::Confirmed)
        .await;
    assert_matches!(result, Err(SchedulingError::NotFound));
}

#[tokio::test]
async fn cancellation_releases_the_slot_and_the_standing_booking() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();

    ctx.service
        .update_status(appointment.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();

    let slots = ctx
        .service
        .booked_slots(ctx.doctor.id, "2025-06-10")
        .await
        .unwrap();
    assert!(slots.is_empty());

    // Slot is bookable again, and the same pair can book again too.
    ctx.service
        .create(booking(
            ctx.other_patient.id,
            ctx.doctor.id,
            "2025-06-10",
            "09:00",
        ))
        .await
        .unwrap();
    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "10:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn completion_also_releases_the_slot() {
    let ctx = setup();

    let appointment = ctx
        .service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "09:00"))
        .await
        .unwrap();
    ctx.service
        .update_status(appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let slots = ctx
        .service
        .booked_slots(ctx.doctor.id, "2025-06-10")
        .await
        .unwrap();
    assert!(slots.is_empty());
}

// ==============================================================================
// SLOT QUERIES
// ==============================================================================

#[tokio::test]
async fn booked_slots_are_ordered_and_scoped_to_doctor_and_day() {
    let ctx = setup();

    ctx.service
        .create(booking(ctx.patient.id, ctx.doctor.id, "2025-06-10", "11:00"))
        .await
        .unwrap();
    ctx.service
        .create(booking(
            ctx.other_patient.id,
            ctx.doctor.id,
            "2025-06-10",
            "09:00",
        ))
        .await
        .unwrap();
    // Different doctor and different day must not appear.
    ctx.service
        .create(booking(ctx.patient.id, ctx.other_doctor.id, "2025-06-10", "08:00"))
        .await
        .unwrap();

    let slots = ctx
        .service
        .booked_slots(ctx.doctor.id, "2025-06-10")
        .await
        .unwrap();
    assert_eq!(slots, vec!["09:00".to_string(), "11:00".to_string()]);

    let other_day = ctx
        .service
        .booked_slots(ctx.doctor.id, "2025-06-11")
        .await
        .unwrap();
    assert!(other_day.is_empty());
}

#[tokio::test]
async fn booked_slots_rejects_bad_dates() {
    let ctx = setup();

    let result = ctx.service.booked_slots(ctx.doctor.id, "junk").await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));
}

// ==============================================================================
// CONCURRENCY
// ==============================================================================

#[tokio::test]
async fn concurrent_creates_for_one_slot_have_a_single_winner() {
    let ctx = setup();

    let mut patients = Vec::new();
    for i in 0..8 {
        patients.push(
            ctx.directory
                .register_patient(format!("Racer {}", i), None)
                .unwrap(),
        );
    }

    let mut handles = Vec::new();
    for patient in patients {
        let service = Arc::clone(&ctx.service);
        let doctor_id = ctx.doctor.id;
        handles.push(tokio::spawn(async move {
            service
                .create(booking(patient.id, doctor_id, "2025-06-10", "09:00"))
                .await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(SchedulingError::SlotTaken) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);

    let slots = ctx
        .service
        .booked_slots(ctx.doctor.id, "2025-06-10")
        .await
        .unwrap();
    assert_eq!(slots, vec!["09:00".to_string()]);
}
