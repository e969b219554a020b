use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, Patient, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

/// Ownership guard for patients: entity id and owner id are combined into
/// one store predicate so a missing row and a row owned by someone else are
/// indistinguishable, in lookup shape and in response.
fn owned_patient_path(patient_id: Uuid, user_id: &str) -> String {
    format!("/rest/v1/patients?id=eq.{}&user_id=eq.{}", patient_id, user_id)
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Patient, AppError> {
        request.validate()?;

        debug!("Creating patient record for user: {}", user_id);

        let now = Utc::now();
        let patient_data = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "date_of_birth": request.date_of_birth,
            "gender": request.gender,
            "contact_number": request.contact_number,
            "address": request.address,
            "medical_history": request.medical_history,
            "user_id": user_id,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(return_representation()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Store returned no row for created patient".to_string()))
    }

    /// All patients owned by `user_id`, in a stable order.
    pub async fn list_patients(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Patient>, AppError> {
        let path = format!(
            "/rest/v1/patients?user_id=eq.{}&order=created_at.asc,id.asc",
            user_id
        );

        let patients = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(patients)
    }

    pub async fn get_patient(
        &self,
        patient_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Patient, AppError> {
        let result: Vec<Patient> = self
            .supabase
            .request(
                Method::GET,
                &owned_patient_path(patient_id, user_id),
                Some(auth_token),
                None,
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Patient, AppError> {
        request.validate()?;

        let mut patch = request.to_patch();
        if patch.is_empty() {
            // Nothing to change; succeed with the current record.
            return self.get_patient(patient_id, user_id, auth_token).await;
        }
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating patient {} for user {}", patient_id, user_id);

        let result: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &owned_patient_path(patient_id, user_id),
                Some(auth_token),
                Some(Value::Object(patch)),
                Some(return_representation()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    }

    pub async fn delete_patient(
        &self,
        patient_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let result: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &owned_patient_path(patient_id, user_id),
                Some(auth_token),
                None,
                Some(return_representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(AppError::NotFound("Patient not found".to_string()));
        }

        debug!("Deleted patient {} for user {}", patient_id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_path_combines_id_and_owner_in_one_lookup() {
        let id = Uuid::new_v4();
        let path = owned_patient_path(id, "user-1");
        assert!(path.contains(&format!("id=eq.{}", id)));
        assert!(path.contains("user_id=eq.user-1"));
    }
}
