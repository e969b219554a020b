use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_database::StoreError;
use shared_models::error::AppError;

use crate::models::{CreateMappingRequest, Mapping, MappingStatus, MappingWithRelations};

/// Embed clause pulling the related records. `patients!inner` makes the
/// patient join mandatory, so combining it with an ownership filter drops
/// whole rows the caller does not own instead of returning them with a
/// null patient.
const RELATIONS_SELECT: &str = "select=*,patient:patients!inner(*),doctor:doctors(*)";

pub struct MappingService {
    supabase: SupabaseClient,
}

/// Ownership guard for mappings: a mapping is visible iff its patient is
/// owned by the caller, expressed as a store-side join predicate.
fn owner_filter(user_id: &str) -> String {
    format!("patient.user_id=eq.{}", user_id)
}

fn owned_mapping_path(mapping_id: Uuid, user_id: &str) -> String {
    format!(
        "/rest/v1/mappings?id=eq.{}&{}&{}",
        mapping_id,
        RELATIONS_SELECT,
        owner_filter(user_id)
    )
}

/// PostgREST answers 409 for unique violations (23505) but also for
/// foreign key violations (23503); only the former means a duplicate
/// active pair, so the error body's Postgres code has to be checked
/// before substituting the duplicate message.
fn is_unique_violation(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str().map(str::to_string)))
        .is_some_and(|code| code == "23505")
}

impl MappingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Assigns a doctor to a patient. The one-active-mapping-per-pair rule
    /// is enforced by the store's partial unique index, not by a lookup
    /// here: two concurrent creates for the same pair would both pass a
    /// pre-check, so the insert itself has to be the arbiter. The losing
    /// writer gets the store's 409 back as a Conflict.
    pub async fn create_mapping(
        &self,
        request: CreateMappingRequest,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Mapping, AppError> {
        let patient_path = format!(
            "/rest/v1/patients?id=eq.{}&user_id=eq.{}&select=id",
            request.patient_id, user_id
        );
        let patients: Vec<Value> = self
            .supabase
            .request(Method::GET, &patient_path, Some(auth_token), None)
            .await?;
        if patients.is_empty() {
            return Err(AppError::NotFound("Patient not found".to_string()));
        }

        let doctor_path = format!("/rest/v1/doctors?id=eq.{}&select=id", request.doctor_id);
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &doctor_path, Some(auth_token), None)
            .await?;
        if doctors.is_empty() {
            return Err(AppError::NotFound("Doctor not found".to_string()));
        }

        debug!(
            "Assigning doctor {} to patient {}",
            request.doctor_id, request.patient_id
        );

        let now = Utc::now();
        let mapping_data = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "status": MappingStatus::Active,
            "assigned_date": now.to_rfc3339(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Mapping> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/mappings",
                Some(auth_token),
                Some(mapping_data),
                Some(return_representation()),
            )
            .await
            .map_err(|err| match err {
                StoreError::Conflict(body) if is_unique_violation(&body) => AppError::Conflict(
                    "An active mapping already exists for this patient and doctor".to_string(),
                ),
                StoreError::Conflict(body) => AppError::Conflict(body),
                other => other.into(),
            })?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Store returned no row for created mapping".to_string()))
    }

    /// All mappings whose patient the caller owns, with patient and doctor
    /// records embedded.
    pub async fn list_mappings(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<MappingWithRelations>, AppError> {
        let path = format!(
            "/rest/v1/mappings?{}&{}&order=assigned_date.asc,id.asc",
            RELATIONS_SELECT,
            owner_filter(user_id)
        );

        let mappings = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(mappings)
    }

    /// Active mappings for one patient. An unowned or unknown patient just
    /// produces an empty list; the ownership join filters those rows out
    /// before they leave the store.
    pub async fn list_mappings_for_patient(
        &self,
        patient_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<MappingWithRelations>, AppError> {
        let path = format!(
            "/rest/v1/mappings?patient_id=eq.{}&status=eq.active&{}&{}&order=assigned_date.asc,id.asc",
            patient_id,
            RELATIONS_SELECT,
            owner_filter(user_id)
        );

        let mappings = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(mappings)
    }

    /// Single mapping lookup through the ownership guard. Absent and
    /// not-owned are the same NotFound.
    pub async fn get_mapping(
        &self,
        mapping_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<MappingWithRelations, AppError> {
        let result: Vec<MappingWithRelations> = self
            .supabase
            .request(
                Method::GET,
                &owned_mapping_path(mapping_id, user_id),
                Some(auth_token),
                None,
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Mapping not found".to_string()))
    }

    /// Soft delete: the row stays, status flips to inactive. The write is
    /// unconditional on current status, so deactivating twice is a
    /// deterministic no-op success. Inactive is terminal.
    pub async fn deactivate_mapping(
        &self,
        mapping_id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Mapping, AppError> {
        self.get_mapping(mapping_id, user_id, auth_token).await?;

        debug!("Deactivating mapping {}", mapping_id);

        let path = format!("/rest/v1/mappings?id=eq.{}", mapping_id);
        let patch = json!({
            "status": MappingStatus::Inactive,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let result: Vec<Mapping> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(patch),
                Some(return_representation()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Store returned no row for deactivated mapping".to_string()))
    }
}
