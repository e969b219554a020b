use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use shared_models::error::AppError;

/// A doctor record. Readable by any authenticated user; `created_by` scopes
/// update and delete to the user who registered the doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub license_number: String,
    pub contact_number: String,
    pub email: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub license_number: String,
    pub contact_number: String,
    pub email: String,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.first_name, "First name")?;
        require_non_empty(&self.last_name, "Last name")?;
        require_non_empty(&self.specialization, "Specialization")?;
        require_non_empty(&self.license_number, "License number")?;
        require_non_empty(&self.contact_number, "Contact number")?;
        require_email(&self.email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

impl UpdateDoctorRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(first_name) = &self.first_name {
            require_non_empty(first_name, "First name")?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty(last_name, "Last name")?;
        }
        if let Some(specialization) = &self.specialization {
            require_non_empty(specialization, "Specialization")?;
        }
        if let Some(license_number) = &self.license_number {
            require_non_empty(license_number, "License number")?;
        }
        if let Some(contact_number) = &self.contact_number {
            require_non_empty(contact_number, "Contact number")?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        Ok(())
    }

    /// Field map for a partial PATCH; absent fields are left unchanged.
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut fields = Map::new();

        if let Some(first_name) = &self.first_name {
            fields.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = &self.last_name {
            fields.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(specialization) = &self.specialization {
            fields.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(license_number) = &self.license_number {
            fields.insert("license_number".to_string(), json!(license_number));
        }
        if let Some(contact_number) = &self.contact_number {
            fields.insert("contact_number".to_string(), json!(contact_number));
        }
        if let Some(email) = &self.email {
            fields.insert("email".to_string(), json!(email));
        }

        fields
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::ValidationError(
            "Please enter a valid email".to_string(),
        ));
    }
    Ok(())
}
