use shared_models::auth::User;
use shared_models::clinical::StaffRole;
use shared_models::error::AppError;

/// Privileged actions gated by staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageQueues,
    ViewQueues,
    ManageSubscriptions,
    ScheduleAppointments,
    ManageStaff,
    RegisterPatients,
}

/// Permit/deny gate. Every principal must carry a staff role; admins pass
/// all checks.
pub fn ensure(user: &User, action: Action) -> Result<(), AppError> {
    let role = user
        .role
        .ok_or_else(|| AppError::Authorization("staff role required".to_string()))?;

    if role == StaffRole::Admin {
        return Ok(());
    }

    let permitted = match action {
        Action::ManageQueues | Action::ViewQueues | Action::ManageSubscriptions => true,
        Action::ScheduleAppointments => {
            matches!(role, StaffRole::Physician | StaffRole::Nurse | StaffRole::FrontDesk)
        }
        Action::RegisterPatients => matches!(role, StaffRole::Nurse | StaffRole::FrontDesk),
        Action::ManageStaff => false,
    };

    if permitted {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "role '{}' is not permitted to perform this action",
            role
        )))
    }
}
