use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::clinical::{
    Appointment, AppointmentStatus, Patient, Provider, StaffRole, VisitType,
};
use shared_store::{AppState, Datastore};

pub struct TestConfig {
    pub jwt_secret: String,
    pub bind_addr: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            bind_addr: self.bind_addr.clone(),
            jwt_secret: self.jwt_secret.clone(),
            database_url: String::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// App state over a fresh in-memory store, for handler and service tests.
pub fn test_state() -> AppState {
    AppState::new(TestConfig::default().to_arc(), Datastore::in_memory())
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Mint an HS256 token the shared validator accepts.
    pub fn create_token(user_id: Uuid, email: &str, role: &str, secret: &str) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let now = Utc::now();
        let claims = json!({
            "sub": user_id.to_string(),
            "email": email,
            "role": role,
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp(),
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }
}

pub fn test_user(role: StaffRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: Some(format!("{}@clinic.test", role)),
        role: Some(role),
        created_at: Some(Utc::now()),
    }
}

pub fn test_provider(first_name: &str, last_name: &str, role: StaffRole) -> Provider {
    Provider {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@clinic.test",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        role,
        created_at: Utc::now(),
    }
}

pub fn test_patient(first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        date_of_birth: None,
        created_at: Utc::now(),
    }
}

pub fn test_appointment(patient_id: Uuid, provider_id: Uuid, visit_type: VisitType) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        provider_id,
        visit_type,
        room: None,
        status: AppointmentStatus::Scheduled,
        scheduled_at: now + Duration::hours(1),
        checked_in_at: None,
        checked_out_at: None,
        invoice_id: None,
        follow_up_to: None,
        deleted: false,
        created_at: now,
        updated_at: now,
    }
}
