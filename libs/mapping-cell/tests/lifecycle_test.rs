// Lifecycle properties exercised at the service level, where the
// deactivate-then-lookup sequence is visible.

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mapping_cell::models::MappingStatus;
use mapping_cell::services::MappingService;
use shared_utils::test_utils::TestConfig;

fn full_row(mapping_id: Uuid, user_id: &str, status: &str) -> Value {
    let patient_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    json!({
        "id": mapping_id,
        "patient_id": patient_id,
        "doctor_id": doctor_id,
        "status": status,
        "assigned_date": Utc::now().to_rfc3339(),
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339(),
        "patient": {
            "id": patient_id,
            "first_name": "Jane",
            "last_name": "Doe",
            "date_of_birth": "1990-01-01",
            "gender": "female",
            "contact_number": "555-1234",
            "address": "1 Main St",
            "medical_history": null,
            "user_id": user_id,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        },
        "doctor": {
            "id": doctor_id,
            "first_name": "Alan",
            "last_name": "Smith",
            "specialization": "Cardiology",
            "license_number": "LIC1",
            "contact_number": "555-9999",
            "email": "smith@x.com",
            "created_by": user_id,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        }
    })
}

fn flat_row(row: &Value, status: &str) -> Value {
    json!({
        "id": row["id"],
        "patient_id": row["patient_id"],
        "doctor_id": row["doctor_id"],
        "status": status,
        "assigned_date": row["assigned_date"],
        "created_at": row["created_at"],
        "updated_at": Utc::now().to_rfc3339()
    })
}

#[tokio::test]
async fn deactivation_keeps_the_row_fetchable() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();
    let mapping_id = Uuid::new_v4();
    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = MappingService::new(&config);

    let active = full_row(mapping_id, &user_id, "active");

    // Guard lookup before the write sees the active row.
    Mock::given(method("GET"))
        .and(path("/rest/v1/mappings"))
        .and(query_param("id", format!("eq.{}", mapping_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([active])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/mappings"))
        .and(query_param("id", format!("eq.{}", mapping_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([flat_row(&active, "inactive")])),
        )
        .mount(&server)
        .await;
    // After the write the same id still resolves, now inactive.
    let mut inactive = full_row(mapping_id, &user_id, "inactive");
    inactive["patient_id"] = active["patient_id"].clone();
    inactive["doctor_id"] = active["doctor_id"].clone();
    Mock::given(method("GET"))
        .and(path("/rest/v1/mappings"))
        .and(query_param("id", format!("eq.{}", mapping_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([inactive])))
        .mount(&server)
        .await;

    let deactivated = service
        .deactivate_mapping(mapping_id, &user_id, "token")
        .await
        .unwrap();
    assert_eq!(deactivated.status, MappingStatus::Inactive);

    let looked_up = service
        .get_mapping(mapping_id, &user_id, "token")
        .await
        .unwrap();
    assert_eq!(looked_up.id, mapping_id);
    assert_eq!(looked_up.status, MappingStatus::Inactive);
}

#[tokio::test]
async fn repeated_deactivation_is_a_successful_no_op() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();
    let mapping_id = Uuid::new_v4();
    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = MappingService::new(&config);

    let inactive = full_row(mapping_id, &user_id, "inactive");

    // Already-inactive row: the write happens again regardless of current
    // status and still succeeds.
    Mock::given(method("GET"))
        .and(path("/rest/v1/mappings"))
        .and(query_param("id", format!("eq.{}", mapping_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([inactive])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/mappings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([flat_row(&inactive, "inactive")])),
        )
        .mount(&server)
        .await;

    let first = service
        .deactivate_mapping(mapping_id, &user_id, "token")
        .await
        .unwrap();
    let second = service
        .deactivate_mapping(mapping_id, &user_id, "token")
        .await
        .unwrap();

    assert_eq!(first.status, MappingStatus::Inactive);
    assert_eq!(second.status, MappingStatus::Inactive);
}
