use std::time::Duration;

use fastfix_console::api::{ApiClient, ApiError, GENERIC_FAILURE, Resource, Session};
use fastfix_console::models::{Credentials, Expense, ServiceLine, Vehicle, WorkStatus};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client builds")
}

fn credentials() -> Credentials {
    Credentials {
        username: "admin".to_string(),
        password: "s3cret".to_string(),
    }
}

#[tokio::test]
async fn login_starts_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({"username": "admin", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "token": "tok-123",
            "username": "admin"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, message) = client(&server).login(&credentials()).await.expect("login");
    assert_eq!(message, "Login successful");
    assert_eq!(session.username(), Some("admin"));
    assert_eq!(session.token(), Some("tok-123"));
}

#[tokio::test]
async fn failed_login_surfaces_the_server_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let err = client(&server).login(&credentials()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn failed_login_without_a_reason_uses_the_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).login(&credentials()).await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn protected_calls_carry_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/vehicles"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok-123");
    let vehicles = client(&server).list_vehicles(&session).await.expect("list");
    assert!(vehicles.is_empty());
}

#[tokio::test]
async fn cleared_session_sends_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/expenses"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/expenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::establish("admin", "tok-123");
    session.clear();
    let expenses = client(&server).list_expenses(&session).await.expect("list");
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn user_list_needs_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .list_users(&Session::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn lists_tolerate_loose_field_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/vehicles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "v1",
            "vehicleId": 17,
            "date": "2024-05-02T08:30:00.000Z",
            "customerName": "Ahmed",
            "phone": 971501234567u64,
            "services": [{"serviceType": "Oil Change", "amount": "120", "quantity": "2", "vat": null}],
            "discount": "",
            "dueAmount": "240.5",
            "statusOfWork": "done"
        }])))
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok");
    let vehicles = client(&server).list_vehicles(&session).await.expect("list");
    let vehicle = &vehicles[0];
    assert_eq!(vehicle.vehicle_id, "17");
    assert_eq!(vehicle.phone, "971501234567");
    assert_eq!(vehicle.discount, dec!(0));
    assert_eq!(vehicle.due_amount, dec!(240.5));
    assert_eq!(vehicle.status_of_work, WorkStatus::Done);
    assert_eq!(vehicle.services[0].unit_price, dec!(120));
    assert_eq!(vehicle.services[0].quantity, 2);
    assert!(vehicle.date.is_some());
}

#[tokio::test]
async fn missing_record_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Employee not found"})))
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok");
    let err = client(&server).get_employee(&session, "gone").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn record_ids_are_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/a%2Fb"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok");
    client(&server)
        .delete(&session, Resource::Employees, "a/b")
        .await
        .expect("delete");
}

#[tokio::test]
async fn batch_delete_reports_each_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/expenses/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Deleted"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/expenses/b"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/expenses/c"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok");
    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let outcome = client(&server)
        .delete_many(&session, Resource::Expenses, &ids)
        .await;

    assert_eq!(outcome.deleted, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, "b");
    assert!(!outcome.is_complete());
    assert!(outcome.describe(Resource::Expenses).contains("b: Database unavailable"));
}

#[tokio::test]
async fn create_sends_backend_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/expenses"))
        .and(body_partial_json(json!({"expense": "Garage rent", "amount": 2500.0})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/vehicles/v9"))
        .and(body_partial_json(json!({
            "customerName": "Sara",
            "services": [{"serviceType": "Wash", "totalPrice": 52.5}],
            "statusOfWork": "PROGRESS"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::establish("admin", "tok");
    let api = client(&server);

    let expense = Expense {
        description: "Garage rent".to_string(),
        amount: dec!(2500),
        ..Default::default()
    };
    api.create_expense(&session, &expense).await.expect("create");

    let vehicle = Vehicle {
        id: "v9".to_string(),
        customer_name: "Sara".to_string(),
        services: vec![ServiceLine {
            description: "Wash".to_string(),
            unit_price: dec!(50),
            quantity: 1,
            vat: dec!(2.5),
            sub_total: dec!(52.5),
            ..Default::default()
        }],
        ..Default::default()
    };
    api.update_vehicle(&session, &vehicle).await.expect("update");
}
