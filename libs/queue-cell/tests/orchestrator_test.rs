use assert_matches::assert_matches;
use uuid::Uuid;

use appointment_cell::models::AppointmentError;
use queue_cell::models::{Destination, QueueError};
use queue_cell::services::orchestrator::{QueueOrchestrator, PRE_EXAM_QUEUE};
use shared_models::auth::User;
use shared_models::clinical::{
    Appointment, AppointmentStatus, Provider, QueueKind, StaffRole, VisitType,
};
use shared_store::Datastore;
use shared_utils::test_utils::{test_appointment, test_patient, test_provider, test_user};

struct Fixture {
    store: Datastore,
    orchestrator: QueueOrchestrator,
    provider: Provider,
    patient_id: Uuid,
}

impl Fixture {
    async fn new() -> Self {
        let store = Datastore::in_memory();
        let provider = test_provider("Jane", "Doe", StaffRole::Physician);
        let patient = test_patient("Alice", "Smith");
        store.providers.insert(&provider).await.unwrap();
        store.patients.insert(&patient).await.unwrap();

        Self {
            orchestrator: QueueOrchestrator::new(store.clone()),
            store,
            provider,
            patient_id: patient.id,
        }
    }

    async fn scheduled_appointment(&self, visit_type: VisitType) -> Appointment {
        let appointment = test_appointment(self.patient_id, self.provider.id, visit_type);
        self.store.appointments.insert(&appointment).await.unwrap();
        appointment
    }
}

fn principal_for(provider: &Provider) -> User {
    User {
        id: provider.id,
        email: Some(provider.email.clone()),
        role: Some(provider.role),
        created_at: None,
    }
}

// ==============================================================================
// CHECK-IN
// ==============================================================================

#[tokio::test]
async fn test_check_in_stamps_appointment_and_enqueues() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    let updated = fx
        .orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .expect("check-in should succeed");

    assert_eq!(updated.status, AppointmentStatus::CheckedIn);
    assert!(updated.checked_in_at.is_some());

    let queue = fx
        .store
        .queues
        .find_by_name(PRE_EXAM_QUEUE)
        .await
        .unwrap()
        .expect("Pre-Exam queue lazily created");
    assert_eq!(queue.kind, QueueKind::PreExam);
    assert_eq!(queue.appointment_ids, vec![appointment.id]);
}

#[tokio::test]
async fn test_check_in_physician_destination_routes_to_personal_queue() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);

    // Personal queue auto-provisioned at account creation.
    fx.orchestrator
        .provision_physician_queue(&fx.provider)
        .await
        .unwrap();

    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;
    fx.orchestrator
        .check_in_patient(&user, appointment.id, Destination::Physician)
        .await
        .unwrap();

    let queue = fx
        .store
        .queues
        .find_by_name("Dr. Jane Doe")
        .await
        .unwrap()
        .expect("physician queue exists");
    assert_eq!(queue.kind, QueueKind::User);
    assert_eq!(queue.appointment_ids, vec![appointment.id]);
}

#[tokio::test]
async fn test_check_in_unknown_appointment_is_not_found() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);

    let err = fx
        .orchestrator
        .check_in_patient(&user, Uuid::new_v4(), Destination::PreExam)
        .await
        .unwrap_err();
    assert_matches!(err, QueueError::AppointmentNotFound);
}

#[tokio::test]
async fn test_double_check_in_is_rejected_and_not_enqueued_twice() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    fx.orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .unwrap();

    let err = fx
        .orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        QueueError::Lifecycle(AppointmentError::InvalidStatusTransition { .. })
    );

    let queue = fx.store.queues.find_by_name(PRE_EXAM_QUEUE).await.unwrap().unwrap();
    assert_eq!(queue.appointment_ids, vec![appointment.id]);
}

#[tokio::test]
async fn test_surgery_check_in_spawns_exactly_one_post_op() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);
    let surgery = fx.scheduled_appointment(VisitType::Surgery).await;

    fx.orchestrator
        .check_in_patient(&user, surgery.id, Destination::PreOperation)
        .await
        .unwrap();

    let all = fx
        .store
        .appointments
        .search(&Default::default())
        .await
        .unwrap();
    let post_ops: Vec<&Appointment> = all
        .iter()
        .filter(|a| a.follow_up_to == Some(surgery.id))
        .collect();

    assert_eq!(post_ops.len(), 1, "exactly one post-op follow-up");
    let post_op = post_ops[0];
    assert_eq!(post_op.visit_type, VisitType::PostOperative);
    assert_eq!(post_op.status, AppointmentStatus::Scheduled);
    assert_eq!(post_op.patient_id, surgery.patient_id);
    assert_eq!(post_op.provider_id, surgery.provider_id);
    assert!(post_op.checked_in_at.is_none());

    // The follow-up gets no queue placement of its own.
    let holder = fx.store.queues.find_containing(post_op.id).await.unwrap();
    assert!(holder.is_none());

    // The surgery visit itself is queued at Pre-Operation.
    let queue = fx
        .store
        .queues
        .find_by_name("Pre-Operation")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(queue.appointment_ids, vec![surgery.id]);
}

// ==============================================================================
// CHECK-OUT
// ==============================================================================

#[tokio::test]
async fn test_check_out_removes_from_queue_and_stamps() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::Nurse);
    let first = fx.scheduled_appointment(VisitType::Consultation).await;
    let second = fx.scheduled_appointment(VisitType::Consultation).await;

    fx.orchestrator
        .check_in_patient(&user, first.id, Destination::PreExam)
        .await
        .unwrap();
    fx.orchestrator
        .check_in_patient(&user, second.id, Destination::PreExam)
        .await
        .unwrap();

    let queue = fx.store.queues.find_by_name(PRE_EXAM_QUEUE).await.unwrap().unwrap();

    let updated = fx
        .orchestrator
        .check_out_patient(&user, queue.id, first.id)
        .await
        .expect("check-out should succeed");
    assert_eq!(updated.appointment_ids, vec![second.id]);

    let stored = fx.store.appointments.find(first.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::CheckedOut);
    assert!(stored.checked_out_at.is_some());

    // Checking the same appointment out again fails: it is no longer queued.
    let err = fx
        .orchestrator
        .check_out_patient(&user, queue.id, first.id)
        .await
        .unwrap_err();
    assert_matches!(err, QueueError::NotQueued { .. });
}

// ==============================================================================
// PUSH / MOVE / DELETE
// ==============================================================================

#[tokio::test]
async fn test_push_forwards_between_queues_keeping_single_membership() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::Nurse);
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    fx.orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .unwrap();
    let pre_exam = fx.store.queues.find_by_name(PRE_EXAM_QUEUE).await.unwrap().unwrap();

    let dest = fx
        .orchestrator
        .push_patient_queue(&user, pre_exam.id, appointment.id, Destination::Physician)
        .await
        .expect("forwarding should succeed");
    assert_eq!(dest.name, "Dr. Jane Doe");
    assert_eq!(dest.appointment_ids, vec![appointment.id]);

    // Single membership: gone from the source, present once in the target.
    let pre_exam = fx.store.queues.find(pre_exam.id).await.unwrap().unwrap();
    assert!(!pre_exam.contains(appointment.id));
    let holder = fx.store.queues.find_containing(appointment.id).await.unwrap().unwrap();
    assert_eq!(holder.id, dest.id);
}

#[tokio::test]
async fn test_move_between_explicit_queues_is_atomic() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::Nurse);
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    fx.orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .unwrap();
    let source = fx.store.queues.find_by_name(PRE_EXAM_QUEUE).await.unwrap().unwrap();
    let dest = fx
        .store
        .queues
        .create("Pre-Operation", QueueKind::PreOperation)
        .await
        .unwrap();

    let updated = fx
        .orchestrator
        .move_patient_queue(&user, appointment.id, source.id, dest.id)
        .await
        .unwrap();

    let source_after = fx.store.queues.find(source.id).await.unwrap().unwrap();
    assert!(!source_after.contains(appointment.id));
    let occurrences = updated
        .appointment_ids
        .iter()
        .filter(|id| **id == appointment.id)
        .count();
    assert_eq!(occurrences, 1);

    // A failed move leaves both queues untouched.
    let err = fx
        .orchestrator
        .move_patient_queue(&user, appointment.id, dest.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, QueueError::NotFound(_));
    let dest_after = fx.store.queues.find(dest.id).await.unwrap().unwrap();
    assert!(dest_after.contains(appointment.id));
}

#[tokio::test]
async fn test_delete_from_queue_keeps_the_appointment_record() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    fx.orchestrator
        .check_in_patient(&user, appointment.id, Destination::PreExam)
        .await
        .unwrap();
    let queue = fx.store.queues.find_by_name(PRE_EXAM_QUEUE).await.unwrap().unwrap();

    let updated = fx
        .orchestrator
        .delete_from_queue(&user, queue.id, appointment.id)
        .await
        .unwrap();
    assert!(updated.is_empty());

    // Queue entries are weak references.
    let stored = fx.store.appointments.find(appointment.id).await.unwrap();
    assert!(stored.is_some());

    let err = fx
        .orchestrator
        .delete_from_queue(&user, queue.id, appointment.id)
        .await
        .unwrap_err();
    assert_matches!(err, QueueError::NotFound(_));
}

// ==============================================================================
// LIST / HYDRATION
// ==============================================================================

#[tokio::test]
async fn test_list_queues_hydrates_in_queue_order() {
    let fx = Fixture::new().await;
    let user = test_user(StaffRole::FrontDesk);

    let mut expected = Vec::new();
    for _ in 0..5 {
        let appointment = fx.scheduled_appointment(VisitType::Consultation).await;
        fx.orchestrator
            .check_in_patient(&user, appointment.id, Destination::PreExam)
            .await
            .unwrap();
        expected.push(appointment.id);
    }

    let views = fx.orchestrator.list_queues(&user).await.unwrap();
    let pre_exam = views
        .iter()
        .find(|v| v.name == PRE_EXAM_QUEUE)
        .expect("Pre-Exam view present");

    let hydrated: Vec<Uuid> = pre_exam.appointments.iter().map(|a| a.id).collect();
    assert_eq!(hydrated, expected, "view order must match queue order");
}

#[tokio::test]
async fn test_physicians_never_see_other_physicians_queues() {
    let fx = Fixture::new().await;
    let other = test_provider("John", "Roe", StaffRole::Physician);
    fx.store.providers.insert(&other).await.unwrap();

    fx.orchestrator.provision_physician_queue(&fx.provider).await.unwrap();
    fx.orchestrator.provision_physician_queue(&other).await.unwrap();
    fx.store
        .queues
        .create(PRE_EXAM_QUEUE, QueueKind::PreExam)
        .await
        .unwrap();

    let physician = principal_for(&fx.provider);
    let views = fx.orchestrator.list_queues(&physician).await.unwrap();

    let names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
    assert!(names.contains(&PRE_EXAM_QUEUE));
    assert!(names.contains(&"Dr. Jane Doe"));
    assert!(
        !names.contains(&"Dr. John Roe"),
        "foreign personal queues must be filtered"
    );

    // Non-physician staff see everything.
    let nurse = test_user(StaffRole::Nurse);
    let views = fx.orchestrator.list_queues(&nurse).await.unwrap();
    assert_eq!(views.len(), 3);
}

// ==============================================================================
// DESTINATIONS
// ==============================================================================

#[tokio::test]
async fn test_resolve_destination_for_all_tags() {
    let fx = Fixture::new().await;
    let appointment = fx.scheduled_appointment(VisitType::Consultation).await;

    let (name, kind) = fx
        .orchestrator
        .resolve_destination(Destination::PreExam, &appointment)
        .await
        .unwrap();
    assert_eq!((name.as_str(), kind), (PRE_EXAM_QUEUE, QueueKind::PreExam));

    let (name, kind) = fx
        .orchestrator
        .resolve_destination(Destination::PreOperation, &appointment)
        .await
        .unwrap();
    assert_eq!((name.as_str(), kind), ("Pre-Operation", QueueKind::PreOperation));

    let (name, kind) = fx
        .orchestrator
        .resolve_destination(Destination::Physician, &appointment)
        .await
        .unwrap();
    assert_eq!((name.as_str(), kind), ("Dr. Jane Doe", QueueKind::User));
}

#[tokio::test]
async fn test_physician_destination_with_unknown_provider_fails() {
    let fx = Fixture::new().await;
    let mut appointment = fx.scheduled_appointment(VisitType::Consultation).await;
    appointment.provider_id = Uuid::new_v4();

    let err = fx
        .orchestrator
        .resolve_destination(Destination::Physician, &appointment)
        .await
        .unwrap_err();
    assert_matches!(err, QueueError::ProviderNotFound);
}

#[test]
fn test_unrecognized_destination_tags_are_rejected() {
    // Closed enumeration: unknown tags fail at deserialization instead of
    // silently no-opping.
    assert!(serde_json::from_str::<Destination>("\"PREEXAM\"").is_ok());
    assert!(serde_json::from_str::<Destination>("\"TRIAGE\"").is_err());
    assert!(serde_json::from_str::<Destination>("\"preexam\"").is_err());
}
