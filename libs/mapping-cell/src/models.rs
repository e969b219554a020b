use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use patient_cell::models::Patient;

/// Lifecycle state of a patient-doctor assignment. A mapping is born
/// `active` and can only ever move to `inactive`. There is no way back;
/// reassigning the same pair means creating a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    Active,
    Inactive,
}

/// A patient-doctor assignment. At most one `active` row may exist per
/// (patient, doctor) pair; the store's partial unique index enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: MappingStatus,
    pub assigned_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A mapping with its related records embedded, as returned by list
/// endpoints. The embedded patient comes through an inner join filtered on
/// ownership, so a row the caller may not see never reaches this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingWithRelations {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: MappingStatus,
    pub assigned_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub patient: Patient,
    pub doctor: Doctor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMappingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}
