use assert_matches::assert_matches;
use chrono::Utc;
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use shared_models::clinical::{AppointmentStatus, VisitType};
use shared_utils::test_utils::test_appointment;

#[test]
fn test_scheduled_can_check_in_but_not_out() {
    let lifecycle = AppointmentLifecycleService::new();

    assert!(lifecycle
        .validate_status_transition(&AppointmentStatus::Scheduled, &AppointmentStatus::CheckedIn)
        .is_ok());

    let err = lifecycle
        .validate_status_transition(&AppointmentStatus::Scheduled, &AppointmentStatus::CheckedOut)
        .unwrap_err();
    assert_matches!(err, AppointmentError::InvalidStatusTransition { .. });
}

#[test]
fn test_terminal_statuses_allow_no_transitions() {
    let lifecycle = AppointmentLifecycleService::new();

    for terminal in [
        AppointmentStatus::CheckedOut,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ] {
        assert!(
            lifecycle.get_valid_transitions(&terminal).is_empty(),
            "{} should be terminal",
            terminal
        );
    }
}

#[test]
fn test_apply_check_in_stamps_time_and_status() {
    let lifecycle = AppointmentLifecycleService::new();
    let mut appointment =
        test_appointment(Uuid::new_v4(), Uuid::new_v4(), VisitType::Consultation);
    let now = Utc::now();

    lifecycle
        .apply_check_in(&mut appointment, now)
        .expect("scheduled appointment checks in");

    assert_eq!(appointment.status, AppointmentStatus::CheckedIn);
    assert_eq!(appointment.checked_in_at, Some(now));
    assert!(appointment.checked_out_at.is_none());
}

#[test]
fn test_double_check_in_is_rejected() {
    let lifecycle = AppointmentLifecycleService::new();
    let mut appointment =
        test_appointment(Uuid::new_v4(), Uuid::new_v4(), VisitType::Consultation);

    lifecycle.apply_check_in(&mut appointment, Utc::now()).unwrap();
    let err = lifecycle
        .apply_check_in(&mut appointment, Utc::now())
        .unwrap_err();
    assert_matches!(
        err,
        AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::CheckedIn,
            to: AppointmentStatus::CheckedIn,
        }
    );
}

#[test]
fn test_apply_check_out_requires_checked_in() {
    let lifecycle = AppointmentLifecycleService::new();
    let mut appointment =
        test_appointment(Uuid::new_v4(), Uuid::new_v4(), VisitType::Consultation);

    let err = lifecycle
        .apply_check_out(&mut appointment, Utc::now())
        .unwrap_err();
    assert_matches!(err, AppointmentError::InvalidStatusTransition { .. });

    lifecycle.apply_check_in(&mut appointment, Utc::now()).unwrap();
    let now = Utc::now();
    lifecycle.apply_check_out(&mut appointment, now).unwrap();

    assert_eq!(appointment.status, AppointmentStatus::CheckedOut);
    assert_eq!(appointment.checked_out_at, Some(now));
}

#[test]
fn test_spawn_post_op_carries_patient_and_provider() {
    let lifecycle = AppointmentLifecycleService::new();
    let patient_id = Uuid::new_v4();
    let provider_id = Uuid::new_v4();
    let surgery = test_appointment(patient_id, provider_id, VisitType::Surgery);

    let now = Utc::now();
    let post_op = lifecycle.spawn_post_op(&surgery, now);

    assert_ne!(post_op.id, surgery.id);
    assert_eq!(post_op.patient_id, patient_id);
    assert_eq!(post_op.provider_id, provider_id);
    assert_eq!(post_op.visit_type, VisitType::PostOperative);
    assert_eq!(post_op.status, AppointmentStatus::Scheduled);
    assert_eq!(post_op.follow_up_to, Some(surgery.id));
    assert!(post_op.checked_in_at.is_none());
    assert!(post_op.checked_out_at.is_none());
}
