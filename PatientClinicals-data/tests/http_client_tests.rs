use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use patient_clinicals_data::models::clinical::UpsertClinicalRequest;
use patient_clinicals_data::models::patient::CreatePatientRequest;
use patient_clinicals_data::{ApiErrorKind, HttpPatientApi, PatientApiTrait};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A request as seen by the stub backend
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    content_type: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn record(log: &Log, method: Method, path: String, headers: &HeaderMap, body: Option<Value>) {
    log.lock().unwrap().push(Recorded {
        method,
        path,
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
}

async fn list_patients(State(log): State<Log>, headers: HeaderMap) -> Json<Value> {
    record(&log, Method::GET, "/patients".to_string(), &headers, None);
    Json(json!([
        {"id": 1, "firstName": "Ana", "lastName": "Lopez", "age": 30},
        {"id": 2, "firstName": "Luis", "lastName": "Diaz", "age": 52}
    ]))
}

async fn create_patient(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&log, Method::POST, "/patients".to_string(), &headers, Some(body.clone()));
    let mut created = body;
    created["id"] = json!(10);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_patient(Path(id): Path<i64>) -> Response {
    if id == 1 {
        Json(json!({"id": 1, "firstName": "Ana", "lastName": "Lopez", "age": 30})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn delete_patient(State(log): State<Log>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    record(&log, Method::DELETE, format!("/patients/{}", id), &headers, None);
    if id == 1 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, "Patient not found").into_response()
    }
}

async fn list_clinicals(Path(patient_id): Path<i64>) -> Response {
    match patient_id {
        1 => Json(json!([
            {"id": 5, "patientId": 1, "componentName": "bp", "componentValue": "120/80",
             "measuredDateTime": "2024-05-01T10:00:00"}
        ]))
        .into_response(),
        2 => Json(json!({"message": "not an array"})).into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "Database down"}))).into_response(),
    }
}

async fn upsert_clinical(
    State(log): State<Log>,
    headers: HeaderMap,
    Path(patient_id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, Method::PUT, format!("/clinicals/{}", patient_id), &headers, Some(body.clone()));
    let mut saved = body;
    saved["id"] = json!(99);
    Json(saved)
}

/// Start the stub backend and return a client pointed at it
async fn spawn_backend() -> (HttpPatientApi, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let services = Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", get(get_patient).delete(delete_patient))
        .route("/clinicals/patient/:patient_id", get(list_clinicals))
        .route("/clinicals/:patient_id", put(upsert_clinical))
        .with_state(log.clone());
    let app = Router::new().nest("/patientservices", services);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = HttpPatientApi::new(format!("http://{}/patientservices", addr), Duration::from_secs(5)).unwrap();
    (api, log)
}

#[tokio::test]
async fn test_list_patients() {
    let (api, _) = spawn_backend().await;

    let patients = api.list_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0].first_name, "Ana");
    assert_eq!(patients[1].age, 52);
}

#[tokio::test]
async fn test_create_patient_posts_json() {
    let (api, log) = spawn_backend().await;

    let created = api
        .create_patient(CreatePatientRequest {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            age: 30,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 10);

    let log = log.lock().unwrap();
    let post = log.iter().find(|r| r.method == Method::POST).unwrap();
    assert_eq!(post.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        post.body.as_ref().unwrap(),
        &json!({"firstName": "Ana", "lastName": "Lopez", "age": 30})
    );
}

#[tokio::test]
async fn test_get_missing_patient_is_not_found() {
    let (api, _) = spawn_backend().await;

    assert_eq!(api.get_patient(1).await.unwrap().last_name, "Lopez");

    let err = api.get_patient(42).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::NotFound);
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_delete_patient() {
    let (api, log) = spawn_backend().await;

    api.delete_patient(1).await.unwrap();

    let err = api.delete_patient(7).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("Patient not found"));

    let paths: Vec<String> = log.lock().unwrap().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/patients/1", "/patients/7"]);
}

#[tokio::test]
async fn test_list_clinicals_shapes() {
    let (api, _) = spawn_backend().await;

    let records = api.list_clinicals_for_patient(1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].component_value.as_deref(), Some("120/80"));

    let err = api.list_clinicals_for_patient(2).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Decode);

    let err = api.list_clinicals_for_patient(3).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Server { status: 500 });
    assert_eq!(err.user_message("fallback"), "Database down");
}

#[tokio::test]
async fn test_upsert_clinical_puts_to_patient_path() {
    let (api, log) = spawn_backend().await;

    let saved = api
        .upsert_clinical(
            1,
            UpsertClinicalRequest {
                patient_id: 1,
                component_name: "temperature".to_string(),
                component_value: "36.5".to_string(),
                measured_date_time: "2024-05-01T10:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.id, Some(99));
    assert_eq!(saved.component_name.as_deref(), Some("temperature"));

    let log = log.lock().unwrap();
    let put = log.iter().find(|r| r.method == Method::PUT).unwrap();
    assert_eq!(put.path, "/clinicals/1");
    assert_eq!(put.content_type.as_deref(), Some("application/json"));
    assert_eq!(put.body.as_ref().unwrap()["patientId"], 1);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Grab a free port, then close it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpPatientApi::new(format!("http://{}/patientservices", addr), Duration::from_secs(2)).unwrap();
    let err = api.list_patients().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Network);
    assert_eq!(err.user_message("Could not load patients"), "Could not load patients");
}
