use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A patient record. `user_id` is the owning user, stamped at creation and
/// immutable afterwards; every read and write of a patient is scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create payload. Carries no owner field; the owning user always comes
/// from the authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: String,
    pub address: String,
    pub medical_history: Option<String>,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.first_name, "First name")?;
        require_non_empty(&self.last_name, "Last name")?;
        require_non_empty(&self.contact_number, "Contact number")?;
        require_non_empty(&self.address, "Address")?;
        if self.date_of_birth > Utc::now().date_naive() {
            return Err(AppError::ValidationError(
                "Date of birth cannot be in the future".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(first_name) = &self.first_name {
            require_non_empty(first_name, "First name")?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty(last_name, "Last name")?;
        }
        if let Some(contact_number) = &self.contact_number {
            require_non_empty(contact_number, "Contact number")?;
        }
        if let Some(address) = &self.address {
            require_non_empty(address, "Address")?;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            if date_of_birth > Utc::now().date_naive() {
                return Err(AppError::ValidationError(
                    "Date of birth cannot be in the future".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Field map for a partial PATCH. Absent fields stay untouched; an
    /// empty map means no write should be issued at all.
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut fields = Map::new();

        if let Some(first_name) = &self.first_name {
            fields.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = &self.last_name {
            fields.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(date_of_birth) = &self.date_of_birth {
            fields.insert("date_of_birth".to_string(), json!(date_of_birth));
        }
        if let Some(gender) = &self.gender {
            fields.insert("gender".to_string(), json!(gender));
        }
        if let Some(contact_number) = &self.contact_number {
            fields.insert("contact_number".to_string(), json!(contact_number));
        }
        if let Some(address) = &self.address {
            fields.insert("address".to_string(), json!(address));
        }
        if let Some(medical_history) = &self.medical_history {
            fields.insert("medical_history".to_string(), json!(medical_history));
        }

        fields
    }
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}
