//! 엔터티 CRUD 핸들러
//!
//! `/students`, `/employees` 라우트가 같은 핸들러를 [`Resource`] 타입만 바꿔 사용합니다.
//! 요청 → 필터/값 맵 → SQL 빌드 + 실행 → 상태 코드 순서로 처리합니다.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use roster_sql::params::validate_columns;
use roster_sql::{Filters, ListParams, Row, Scalar, Values};

use crate::entities::{Action, Resource, EMAIL_COLUMN};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// `GET /{resource}`
///
/// query string은 equality 필터, `fields`는 프로젝션 컬럼 목록입니다.
pub async fn list<R: Resource>(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Row>>> {
    let params = ListParams::from_pairs(pairs);
    params.validate(R::COLUMNS)?;

    let rows = state
        .db
        .select(R::TABLE, &params.columns, &params.filters)
        .await?;

    Ok(Json(rows))
}

/// `GET /{resource}/{id}`
pub async fn get<R: Resource>(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Row>> {
    let Path(id) = path?;
    let row = find_by_id::<R>(&state, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;

    Ok(Json(row))
}

/// `POST /{resource}`
pub async fn create<R: Resource>(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let values = body_to_values::<R>(body)?;

    match values.get(EMAIL_COLUMN) {
        None | Some(Scalar::Null) => {
            return Err(ApiError::bad_request(format!("{} is required", EMAIL_COLUMN)))
        }
        Some(email) => ensure_email_available::<R>(&state, email, None).await?,
    }

    R::check_values(&values, Action::Create)?;

    let affected = state
        .db
        .insert(R::TABLE, &values)
        .await
        .map_err(ApiError::from_write)?;

    if affected == 0 {
        return Err(ApiError::bad_request(format!("No {} was created", R::TABLE)));
    }

    tracing::info!("Created {} row", R::TABLE);
    Ok((StatusCode::CREATED, Json(json!({ "affected": affected }))))
}

/// `PUT /{resource}/{id}`
///
/// 존재 확인 후 수정하므로, 값이 그대로라서 영향 받은 행이 0이어도 200입니다.
pub async fn update<R: Resource>(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Path(id) = path?;
    let Json(body) = body?;
    if find_by_id::<R>(&state, id).await?.is_none() {
        return Err(not_found::<R>(id));
    }

    let values = body_to_values::<R>(body)?;

    if let Some(email) = values.get(EMAIL_COLUMN) {
        if email.is_null() {
            return Err(ApiError::bad_request(format!("{} cannot be null", EMAIL_COLUMN)));
        }
        ensure_email_available::<R>(&state, email, Some(id)).await?;
    }

    R::check_values(&values, Action::Update)?;

    let affected = state
        .db
        .update(R::TABLE, &values, &id_filter::<R>(id))
        .await
        .map_err(ApiError::from_write)?;

    Ok(Json(json!({ "affected": affected })))
}

/// `DELETE /{resource}/{id}`
pub async fn delete<R: Resource>(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let Path(id) = path?;
    if find_by_id::<R>(&state, id).await?.is_none() {
        return Err(not_found::<R>(id));
    }

    let affected = state
        .db
        .delete(R::TABLE, &id_filter::<R>(id))
        .await
        .map_err(ApiError::from_write)?;

    if affected == 0 {
        return Err(ApiError::bad_request(format!("No {} was deleted", R::TABLE)));
    }

    Ok(Json(json!({ "affected": affected })))
}

fn id_filter<R: Resource>(id: i64) -> Filters {
    let mut filters = Filters::new();
    filters.insert(R::ID_COLUMN.to_string(), Scalar::Int(id));
    filters
}

fn not_found<R: Resource>(id: i64) -> ApiError {
    ApiError::NotFound {
        message: format!("{} {} not found", R::TABLE, id),
    }
}

async fn find_by_id<R: Resource>(state: &AppState, id: i64) -> Result<Option<Row>> {
    let rows = state.db.select(R::TABLE, &[], &id_filter::<R>(id)).await?;
    Ok(rows.into_iter().next())
}

/// 같은 email을 가진 다른 행이 있으면 400
async fn ensure_email_available<R: Resource>(
    state: &AppState,
    email: &Scalar,
    current_id: Option<i64>,
) -> Result<()> {
    let mut filters = Filters::new();
    filters.insert(EMAIL_COLUMN.to_string(), email.clone());

    let rows = state
        .db
        .select(R::TABLE, &[R::ID_COLUMN.to_string()], &filters)
        .await?;

    let taken = rows.iter().any(|row| {
        let owner = row.get(R::ID_COLUMN).and_then(Scalar::as_i64);
        current_id.is_none() || owner != current_id
    });

    if taken {
        return Err(ApiError::bad_request(format!("{} already exists", EMAIL_COLUMN)));
    }
    Ok(())
}

/// JSON 객체 본문을 값 맵으로 변환
///
/// 모르는 컬럼, ID 컬럼, 스칼라가 아닌 값은 거부합니다.
fn body_to_values<R: Resource>(body: Value) -> Result<Values> {
    let Value::Object(object) = body else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };

    validate_columns(object.keys().map(String::as_str), R::COLUMNS)?;
    if object.contains_key(R::ID_COLUMN) {
        return Err(ApiError::bad_request(format!(
            "{} cannot be set by the client",
            R::ID_COLUMN
        )));
    }

    object
        .into_iter()
        .map(|(column, value)| {
            Scalar::try_from(value)
                .map(|scalar| (column.clone(), scalar))
                .map_err(|e| ApiError::bad_request(format!("{}: {}", column, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::Router;
    use sqlx::any::AnyPoolOptions;
    use tower::ServiceExt;

    use roster_sql::SqlxExecutor;

    use crate::entities::Student;
    use crate::schema::{self, Backend};

    async fn test_app() -> Router {
        sqlx::any::install_default_drivers();

        // in-memory DB는 연결마다 따로 생기므로 연결 하나만 유지
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::bootstrap(&pool, Backend::Sqlite).await.unwrap();

        let state = AppState::with_executor(Arc::new(SqlxExecutor::new(pool)));
        crate::create_router(Arc::new(state))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(json) => send_raw(app, method, uri, Some("application/json"), json.to_string()).await,
            None => send_raw(app, method, uri, None, String::new()).await,
        }
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }

        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn seed_student(app: &Router, first: &str, last: &str, email: &str) {
        let body = json!({ "first_name": first, "last_name": last, "email": email, "enrollment_year": 2020 });
        let (status, _) = send(app, Method::POST, "/students", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[test]
    fn test_body_to_values() {
        let values =
            body_to_values::<Student>(json!({ "first_name": "A", "enrollment_year": 2019 })).unwrap();
        assert_eq!(values["first_name"], Scalar::from("A"));
        assert_eq!(values["enrollment_year"], Scalar::Int(2019));

        assert!(body_to_values::<Student>(json!(["A"])).is_err());
        assert!(body_to_values::<Student>(json!({ "iq": 50 })).is_err());
        assert!(body_to_values::<Student>(json!({ "student_id": 3 })).is_err());
        assert!(body_to_values::<Student>(json!({ "first_name": { "x": 1 } })).is_err());
    }

    #[tokio::test]
    async fn test_create_and_get_student() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;

        let (status, body) = send(&app, Method::GET, "/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_name"], "John");
        assert_eq!(body["email"], "jd@columbia.edu");
        assert_eq!(body["enrollment_year"], 2020);

        let (status, body) = send(&app, Method::GET, "/students/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_with_filters_and_fields() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;
        seed_student(&app, "John", "Roe", "jr@columbia.edu").await;
        seed_student(&app, "Jane", "Doe", "jane@columbia.edu").await;

        let (status, body) = send(&app, Method::GET, "/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send(&app, Method::GET, "/students?first_name=John&last_name=Doe", None).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], "jd@columbia.edu");

        let (_, body) =
            send(&app, Method::GET, "/students?first_name=John&fields=first_name,email", None).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], json!({ "first_name": "John", "email": "jd@columbia.edu" }));

        let (status, body) = send(&app, Method::GET, "/students?iq=50", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_COLUMN");
    }

    #[tokio::test]
    async fn test_create_student_validation() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;

        let cases = [
            json!({ "first_name": "NoEmail" }),
            json!({ "first_name": "Dup", "email": "jd@columbia.edu" }),
            json!({ "email": "early@columbia.edu", "enrollment_year": 2015 }),
            json!({ "email": "late@columbia.edu", "enrollment_year": "2024" }),
            json!({ "email": "nan@columbia.edu", "enrollment_year": "soon" }),
            json!({ "email": null }),
        ];

        for body in cases {
            let (status, _) = send(&app, Method::POST, "/students", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        }

        let (_, body) = send(&app, Method::GET, "/students", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_student() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;
        seed_student(&app, "Jane", "Roe", "jr@columbia.edu").await;

        let (status, body) =
            send(&app, Method::PUT, "/students/1", Some(json!({ "first_name": "Joe" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["affected"], 1);

        let (_, body) = send(&app, Method::GET, "/students/1", None).await;
        assert_eq!(body["first_name"], "Joe");

        // 자기 자신의 email은 다시 써도 됨
        let (status, _) =
            send(&app, Method::PUT, "/students/1", Some(json!({ "email": "jd@columbia.edu" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(&app, Method::PUT, "/students/1", Some(json!({ "email": "jr@columbia.edu" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::PUT, "/students/1", Some(json!({ "email": null }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::PUT, "/students/1", Some(json!({ "enrollment_year": 2030 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::PUT, "/students/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");

        let (status, _) =
            send(&app, Method::PUT, "/students/42", Some(json!({ "first_name": "Ghost" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_student() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;

        let (status, body) = send(&app, Method::DELETE, "/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["affected"], 1);

        let (status, _) = send(&app, Method::DELETE, "/students/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/students/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_employee_lifecycle() {
        let app = test_app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({ "first_name": "Don", "last_name": "Ferguson", "email": "dff9@columbia.edu" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({ "first_name": "Don", "email": "dff9@columbia.edu", "employee_type": "Dean" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({
                "first_name": "Don",
                "last_name": "Ferguson",
                "email": "dff9@columbia.edu",
                "employee_type": "Professor"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, Method::GET, "/employees?last_name=Ferguson&fields=email", None).await;
        assert_eq!(body, json!([{ "email": "dff9@columbia.edu" }]));

        let (status, _) =
            send(&app, Method::PUT, "/employees/1", Some(json!({ "first_name": "Donald" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(&app, Method::PUT, "/employees/1", Some(json!({ "employee_type": "Janitor" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::PUT, "/employees/1", Some(json!({ "employee_type": "Lecturer" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/employees/1", None).await;
        assert_eq!(body["first_name"], "Donald");
        assert_eq!(body["employee_type"], "Lecturer");

        let (status, _) = send(&app, Method::DELETE, "/employees/1", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_students_and_employees_are_separate() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "shared@columbia.edu").await;

        // 같은 email이라도 다른 테이블이면 허용
        let (status, _) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({ "email": "shared@columbia.edu", "employee_type": "Staff" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, Method::GET, "/employees", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    fn assert_bad_request_envelope(status: StatusCode, body: &Value) {
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"].is_string());
        assert!(body["error"]["requestId"].is_string());
    }

    #[tokio::test]
    async fn test_extractor_rejections_use_error_envelope() {
        let app = test_app().await;
        seed_student(&app, "John", "Doe", "jd@columbia.edu").await;

        // 정수가 아닌 id
        let (status, body) = send(&app, Method::GET, "/students/abc", None).await;
        assert_bad_request_envelope(status, &body);
        let (status, body) = send(&app, Method::DELETE, "/employees/abc", None).await;
        assert_bad_request_envelope(status, &body);
        let (status, body) =
            send(&app, Method::PUT, "/students/abc", Some(json!({ "first_name": "X" }))).await;
        assert_bad_request_envelope(status, &body);

        // 깨진 JSON
        let (status, body) = send_raw(
            &app,
            Method::POST,
            "/students",
            Some("application/json"),
            "{not json".to_string(),
        )
        .await;
        assert_bad_request_envelope(status, &body);
        let (status, body) = send_raw(
            &app,
            Method::PUT,
            "/students/1",
            Some("application/json"),
            "{not json".to_string(),
        )
        .await;
        assert_bad_request_envelope(status, &body);

        // content-type 없음
        let valid = json!({ "email": "x@columbia.edu", "enrollment_year": 2020 }).to_string();
        let (status, body) = send_raw(&app, Method::POST, "/students", None, valid).await;
        assert_bad_request_envelope(status, &body);

        // 아무것도 쓰이지 않음
        let (_, body) = send(&app, Method::GET, "/students", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_and_request_id() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>Heartbeat</h1>");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/students/7")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["requestId"], "req-123");
    }
}
