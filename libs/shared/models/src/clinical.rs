use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ==============================================================================
// APPOINTMENT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub visit_type: VisitType,
    pub room: Option<String>,
    pub status: AppointmentStatus,
    pub scheduled_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub invoice_id: Option<Uuid>,
    /// Set on a post-operative follow-up: the surgery appointment it was
    /// spawned from.
    pub follow_up_to: Option<Uuid>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Active means the visit has not reached a terminal status and has not
    /// been soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Resolve a status from its display title, the form the clinic
    /// front-end historically sent ("Checked-In", "Checked-Out", ...).
    pub fn from_title(title: &str) -> Option<Self> {
        match title {
            "Scheduled" => Some(AppointmentStatus::Scheduled),
            "Checked-In" => Some(AppointmentStatus::CheckedIn),
            "Checked-Out" => Some(AppointmentStatus::CheckedOut),
            "Cancelled" => Some(AppointmentStatus::Cancelled),
            "No-Show" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::CheckedOut
                | AppointmentStatus::Cancelled
                | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::CheckedIn => write!(f, "Checked-In"),
            AppointmentStatus::CheckedOut => write!(f, "Checked-Out"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::NoShow => write!(f, "No-Show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[serde(alias = "general_consultation", alias = "office_visit")]
    Consultation,

    #[serde(alias = "followup")]
    FollowUp,

    #[serde(alias = "surgical", alias = "operation")]
    Surgery,

    #[serde(alias = "post_op", alias = "postop")]
    PostOperative,

    Procedure,

    Referral,
}

impl VisitType {
    /// Surgery visits spawn a linked post-operative follow-up at check-in.
    pub fn spawns_post_op(&self) -> bool {
        matches!(self, VisitType::Surgery)
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitType::Consultation => write!(f, "Consultation"),
            VisitType::FollowUp => write!(f, "Follow-Up"),
            VisitType::Surgery => write!(f, "Surgery"),
            VisitType::PostOperative => write!(f, "Post-Operative"),
            VisitType::Procedure => write!(f, "Procedure"),
            VisitType::Referral => write!(f, "Referral"),
        }
    }
}

// ==============================================================================
// NAMED QUEUES
// ==============================================================================

/// Wire tags match the historical string-tagged values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueueKind {
    #[serde(rename = "PREEXAM")]
    PreExam,
    #[serde(rename = "PREOPERATION")]
    PreOperation,
    #[serde(rename = "USER")]
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedQueue {
    pub id: Uuid,
    pub name: String,
    pub kind: QueueKind,
    /// Ordered membership; position determines serving priority.
    pub appointment_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NamedQueue {
    pub fn contains(&self, appointment_id: Uuid) -> bool {
        self.appointment_ids.contains(&appointment_id)
    }

    pub fn position(&self, appointment_id: Uuid) -> Option<usize> {
        self.appointment_ids.iter().position(|id| *id == appointment_id)
    }

    pub fn len(&self) -> usize {
        self.appointment_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointment_ids.is_empty()
    }
}

// ==============================================================================
// SUBSCRIPTIONS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Ordered set; subscription order drives feed concatenation order.
    pub queue_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueSubscription {
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            queue_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ==============================================================================
// STAFF & PATIENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Physician,
    Nurse,
    FrontDesk,
    Admin,
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physician" | "doctor" => Ok(StaffRole::Physician),
            "nurse" => Ok(StaffRole::Nurse),
            "front_desk" | "frontdesk" => Ok(StaffRole::FrontDesk),
            "admin" => Ok(StaffRole::Admin),
            other => Err(format!("unknown staff role: {}", other)),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Physician => write!(f, "physician"),
            StaffRole::Nurse => write!(f, "nurse"),
            StaffRole::FrontDesk => write!(f, "front_desk"),
            StaffRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
}

impl Provider {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Name of the physician's personal work queue.
    pub fn queue_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
