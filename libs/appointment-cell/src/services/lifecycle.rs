use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::clinical::{Appointment, AppointmentStatus, VisitType};

use crate::models::AppointmentError;

/// The visit state machine: Scheduled → Checked-In → Checked-Out, with
/// cancellation/no-show exits. Queue membership is a derived condition
/// tracked by the queue cell, not a status value here. All operations are
/// pure; the orchestrator persists the results.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(AppointmentError::InvalidStatusTransition {
                from: *current_status,
                to: *new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(
        &self,
        current_status: &AppointmentStatus,
    ) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::CheckedIn,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::CheckedIn => vec![
                AppointmentStatus::CheckedOut,
                AppointmentStatus::Cancelled, // emergency cancellation mid-visit
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::CheckedOut => vec![],
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::NoShow => vec![],
        }
    }

    /// Stamp the check-in. The transition table is the single-check-in
    /// guard: a Checked-In appointment cannot check in again.
    pub fn apply_check_in(
        &self,
        appointment: &mut Appointment,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        self.validate_status_transition(&appointment.status, &AppointmentStatus::CheckedIn)?;

        appointment.status = AppointmentStatus::CheckedIn;
        appointment.checked_in_at = Some(now);
        appointment.updated_at = now;

        info!("Appointment {} checked in", appointment.id);
        Ok(())
    }

    /// Stamp the check-out.
    pub fn apply_check_out(
        &self,
        appointment: &mut Appointment,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        self.validate_status_transition(&appointment.status, &AppointmentStatus::CheckedOut)?;

        appointment.status = AppointmentStatus::CheckedOut;
        appointment.checked_out_at = Some(now);
        appointment.updated_at = now;

        info!("Appointment {} checked out", appointment.id);
        Ok(())
    }

    /// Build the post-operative follow-up spawned when a Surgery visit
    /// checks in. Patient and provider carry over; the follow-up starts
    /// Scheduled with no check-in stamp and links back to its surgery.
    pub fn spawn_post_op(&self, source: &Appointment, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: source.patient_id,
            provider_id: source.provider_id,
            visit_type: VisitType::PostOperative,
            room: None,
            status: AppointmentStatus::Scheduled,
            scheduled_at: source.scheduled_at,
            checked_in_at: None,
            checked_out_at: None,
            invoice_id: None,
            follow_up_to: Some(source.id),
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
