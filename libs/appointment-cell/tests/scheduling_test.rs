use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentError, AppointmentSearchQuery, ScheduleAppointmentRequest,
};
use appointment_cell::services::scheduling::AppointmentSchedulingService;
use shared_models::clinical::{AppointmentStatus, StaffRole, VisitType};
use shared_store::Datastore;
use shared_utils::test_utils::{test_patient, test_provider, test_user};

async fn seeded_store() -> (Datastore, Uuid, Uuid) {
    let store = Datastore::in_memory();
    let patient = test_patient("Alice", "Smith");
    let provider = test_provider("Jane", "Doe", StaffRole::Physician);
    store.patients.insert(&patient).await.unwrap();
    store.providers.insert(&provider).await.unwrap();
    (store, patient.id, provider.id)
}

fn request(patient_id: Uuid, provider_id: Uuid) -> ScheduleAppointmentRequest {
    ScheduleAppointmentRequest {
        patient_id,
        provider_id,
        visit_type: VisitType::Consultation,
        scheduled_at: Utc::now() + Duration::hours(2),
        room: None,
    }
}

#[tokio::test]
async fn test_schedule_creates_scheduled_appointment() {
    let (store, patient_id, provider_id) = seeded_store().await;
    let service = AppointmentSchedulingService::new(store.clone());
    let user = test_user(StaffRole::FrontDesk);

    let appointment = service
        .schedule(&user, request(patient_id, provider_id))
        .await
        .expect("scheduling should succeed");

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.patient_id, patient_id);
    assert!(appointment.checked_in_at.is_none());

    let stored = store.appointments.find(appointment.id).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_schedule_rejects_past_times() {
    let (store, patient_id, provider_id) = seeded_store().await;
    let service = AppointmentSchedulingService::new(store);
    let user = test_user(StaffRole::FrontDesk);

    let mut past = request(patient_id, provider_id);
    past.scheduled_at = Utc::now() - Duration::hours(1);

    let err = service.schedule(&user, past).await.unwrap_err();
    assert_matches!(err, AppointmentError::InvalidTime(_));
}

#[tokio::test]
async fn test_schedule_requires_known_patient_and_provider() {
    let (store, patient_id, provider_id) = seeded_store().await;
    let service = AppointmentSchedulingService::new(store);
    let user = test_user(StaffRole::FrontDesk);

    let err = service
        .schedule(&user, request(Uuid::new_v4(), provider_id))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::PatientNotFound);

    let err = service
        .schedule(&user, request(patient_id, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::ProviderNotFound);
}

#[tokio::test]
async fn test_search_filters_by_provider_and_patient_name() {
    let (store, patient_id, provider_id) = seeded_store().await;
    let service = AppointmentSchedulingService::new(store.clone());
    let user = test_user(StaffRole::FrontDesk);

    let other_provider = test_provider("John", "Roe", StaffRole::Physician);
    store.providers.insert(&other_provider).await.unwrap();

    service
        .schedule(&user, request(patient_id, provider_id))
        .await
        .unwrap();
    service
        .schedule(&user, request(patient_id, other_provider.id))
        .await
        .unwrap();

    let by_provider = service
        .search(AppointmentSearchQuery {
            provider_id: Some(provider_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_provider.len(), 1);
    assert_eq!(by_provider[0].provider_id, provider_id);

    let by_name = service
        .search(AppointmentSearchQuery {
            search: Some("alice".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let no_match = service
        .search(AppointmentSearchQuery {
            search: Some("zebra".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(no_match.is_empty());
}

#[tokio::test]
async fn test_soft_delete_hides_appointment() {
    let (store, patient_id, provider_id) = seeded_store().await;
    let service = AppointmentSchedulingService::new(store.clone());
    let user = test_user(StaffRole::Admin);

    let appointment = service
        .schedule(&user, request(patient_id, provider_id))
        .await
        .unwrap();

    service.delete(&user, appointment.id).await.unwrap();

    let err = service.get(appointment.id).await.unwrap_err();
    assert_matches!(err, AppointmentError::NotFound);

    // The record itself survives as a soft-deleted row.
    let raw = store.appointments.find(appointment.id).await.unwrap().unwrap();
    assert!(raw.deleted);
}
