use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, Doctor, UpdateDoctorRequest};

pub struct DoctorService {
    supabase: SupabaseClient,
}

/// Write guard for doctors: mutations are scoped to the registering user in
/// the same single-predicate way patients are owner-scoped.
fn creator_scoped_path(doctor_id: Uuid, user_id: &str) -> String {
    format!(
        "/rest/v1/doctors?id=eq.{}&created_by=eq.{}",
        doctor_id, user_id
    )
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Doctor, AppError> {
        request.validate()?;

        debug!("Registering doctor {} {}", request.first_name, request.last_name);

        let now = Utc::now();
        let doctor_data = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "specialization": request.specialization,
            "license_number": request.license_number,
            "contact_number": request.contact_number,
            "email": request.email,
            "created_by": user_id,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(return_representation()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Store returned no row for created doctor".to_string()))
    }

    /// Doctors are readable by any authenticated user, so listing is
    /// unscoped.
    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>, AppError> {
        let doctors = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/doctors?order=created_at.asc,id.asc",
                Some(auth_token),
                None,
            )
            .await?;

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor, AppError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Doctor, AppError> {
        request.validate()?;

        let mut patch = request.to_patch();
        if patch.is_empty() {
            // No effective changes; succeed with the current record, still
            // through the creator-scoped lookup.
            let result: Vec<Doctor> = self
                .supabase
                .request(
                    Method::GET,
                    &creator_scoped_path(doctor_id, user_id),
                    Some(auth_token),
                    None,
                )
                .await?;
            return result
                .into_iter()
                .next()
                .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating doctor {} for user {}", doctor_id, user_id);

        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &creator_scoped_path(doctor_id, user_id),
                Some(auth_token),
                Some(Value::Object(patch)),
                Some(return_representation()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))
    }

    pub async fn delete_doctor(
        &self,
        doctor_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &creator_scoped_path(doctor_id, user_id),
                Some(auth_token),
                None,
                Some(return_representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(AppError::NotFound("Doctor not found".to_string()));
        }

        debug!("Deleted doctor {} for user {}", doctor_id, user_id);
        Ok(())
    }
}
