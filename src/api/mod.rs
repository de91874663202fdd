//! REST client for the FastFix backend.

mod error;
mod session;

use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{
    Credentials, Employee, Expense, LoginResponse, PartOrder, Registration, User, Vehicle,
};

pub use error::{ApiError, GENERIC_FAILURE};
pub use session::Session;

pub type ApiResult<T> = Result<T, ApiError>;

/// Collections exposed under `/api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Vehicles,
    Expenses,
    Employees,
    PartOrders,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Vehicles => "/api/vehicles",
            Resource::Expenses => "/api/expenses",
            Resource::Employees => "/api/employees",
            Resource::PartOrders => "/api/part-orders",
        }
    }

    /// Path of one record. The id is percent-encoded as a single segment.
    pub fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), urlencoding::encode(id))
    }

    /// Singular noun for messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Resource::Vehicles => "Vehicle",
            Resource::Expenses => "Expense",
            Resource::Employees => "Employee",
            Resource::PartOrders => "Part order",
        }
    }
}

/// Result of deleting several records at once. Nothing is rolled back.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, ApiError)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Summary line for an alert.
    pub fn describe(&self, resource: Resource) -> String {
        if self.is_complete() {
            return format!("Deleted {} record(s)", self.deleted.len());
        }
        let failures: Vec<String> = self
            .failed
            .iter()
            .map(|(id, err)| format!("{}: {}", id, err.user_message()))
            .collect();
        format!(
            "Deleted {} record(s); {} {} deletion(s) failed ({})",
            self.deleted.len(),
            self.failed.len(),
            resource.noun().to_lowercase(),
            failures.join("; ")
        )
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Typed client over the backend endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "api request");
        let builder = self.client.request(method, url);
        match session.and_then(Session::token) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and map non-success statuses onto [`ApiError`].
    async fn dispatch(&self, builder: RequestBuilder, what: &str) -> ApiResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %message, "{} request failed", what);

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> ApiResult<T> {
        let body = self.dispatch(builder, what).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // Authentication

    /// Log in and start a session. Returns the session and the server's greeting.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<(Session, String)> {
        let builder = self
            .request(Method::POST, "/api/auth/login", None)
            .json(credentials);
        let response: LoginResponse = self.fetch(builder, "Login").await?;
        match response.token {
            Some(token) => {
                let username = response
                    .username
                    .unwrap_or_else(|| credentials.username.clone());
                tracing::info!(%username, "logged in");
                Ok((Session::establish(username, token), response.message))
            }
            None => Err(ApiError::Unauthorized(response.message)),
        }
    }

    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, "/api/auth/register", None)
            .json(registration);
        self.dispatch(builder, "Registration").await?;
        tracing::info!(username = %registration.username, "registered user");
        Ok(())
    }

    pub async fn list_users(&self, session: &Session) -> ApiResult<Vec<User>> {
        if !session.is_logged_in() {
            return Err(ApiError::Unauthorized("Not logged in".to_string()));
        }
        let builder = self.request(Method::GET, "/api/auth/users", Some(session));
        self.fetch(builder, "Users").await
    }

    // Generic collection operations

    async fn list<T: DeserializeOwned>(&self, session: &Session, resource: Resource) -> ApiResult<Vec<T>> {
        let builder = self.request(Method::GET, resource.path(), Some(session));
        self.fetch(builder, resource.noun()).await
    }

    async fn get<T: DeserializeOwned>(&self, session: &Session, resource: Resource, id: &str) -> ApiResult<T> {
        let path = resource.record_path(id);
        let builder = self.request(Method::GET, &path, Some(session));
        self.fetch(builder, resource.noun()).await
    }

    async fn create<T: Serialize>(&self, session: &Session, resource: Resource, record: &T) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, resource.path(), Some(session))
            .json(record);
        self.dispatch(builder, resource.noun()).await?;
        tracing::info!(resource = resource.path(), "created record");
        Ok(())
    }

    async fn update<T: Serialize>(
        &self,
        session: &Session,
        resource: Resource,
        id: &str,
        record: &T,
    ) -> ApiResult<()> {
        let path = resource.record_path(id);
        let builder = self.request(Method::PUT, &path, Some(session)).json(record);
        self.dispatch(builder, resource.noun()).await?;
        tracing::info!(resource = resource.path(), %id, "updated record");
        Ok(())
    }

    pub async fn delete(&self, session: &Session, resource: Resource, id: &str) -> ApiResult<()> {
        let path = resource.record_path(id);
        let builder = self.request(Method::DELETE, &path, Some(session));
        self.dispatch(builder, resource.noun()).await?;
        tracing::info!(resource = resource.path(), %id, "deleted record");
        Ok(())
    }

    /// Delete every id concurrently and report each outcome.
    pub async fn delete_many(&self, session: &Session, resource: Resource, ids: &[String]) -> BatchOutcome {
        let results = join_all(ids.iter().map(|id| async move {
            (id.clone(), self.delete(session, resource, id).await)
        }))
        .await;

        let mut outcome = BatchOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(err) => {
                    tracing::warn!(resource = resource.path(), %id, error = %err, "batch delete item failed");
                    outcome.failed.push((id, err));
                }
            }
        }
        outcome
    }

    // Vehicles

    pub async fn list_vehicles(&self, session: &Session) -> ApiResult<Vec<Vehicle>> {
        self.list(session, Resource::Vehicles).await
    }

    pub async fn get_vehicle(&self, session: &Session, id: &str) -> ApiResult<Vehicle> {
        self.get(session, Resource::Vehicles, id).await
    }

    pub async fn create_vehicle(&self, session: &Session, vehicle: &Vehicle) -> ApiResult<()> {
        self.create(session, Resource::Vehicles, vehicle).await
    }

    pub async fn update_vehicle(&self, session: &Session, vehicle: &Vehicle) -> ApiResult<()> {
        self.update(session, Resource::Vehicles, &vehicle.id, vehicle).await
    }

    // Expenses

    pub async fn list_expenses(&self, session: &Session) -> ApiResult<Vec<Expense>> {
        self.list(session, Resource::Expenses).await
    }

    pub async fn create_expense(&self, session: &Session, expense: &Expense) -> ApiResult<()> {
        self.create(session, Resource::Expenses, expense).await
    }

    pub async fn update_expense(&self, session: &Session, expense: &Expense) -> ApiResult<()> {
        self.update(session, Resource::Expenses, &expense.id, expense).await
    }

    // Employees

    pub async fn list_employees(&self, session: &Session) -> ApiResult<Vec<Employee>> {
        self.list(session, Resource::Employees).await
    }

    pub async fn get_employee(&self, session: &Session, id: &str) -> ApiResult<Employee> {
        self.get(session, Resource::Employees, id).await
    }

    pub async fn create_employee(&self, session: &Session, employee: &Employee) -> ApiResult<()> {
        self.create(session, Resource::Employees, employee).await
    }

    pub async fn update_employee(&self, session: &Session, employee: &Employee) -> ApiResult<()> {
        self.update(session, Resource::Employees, &employee.id, employee).await
    }

    // Part orders

    pub async fn list_part_orders(&self, session: &Session) -> ApiResult<Vec<PartOrder>> {
        self.list(session, Resource::PartOrders).await
    }

    pub async fn get_part_order(&self, session: &Session, id: &str) -> ApiResult<PartOrder> {
        self.get(session, Resource::PartOrders, id).await
    }

    pub async fn create_part_order(&self, session: &Session, order: &PartOrder) -> ApiResult<()> {
        self.create(session, Resource::PartOrders, order).await
    }

    pub async fn update_part_order(&self, session: &Session, order: &PartOrder) -> ApiResult<()> {
        self.update(session, Resource::PartOrders, &order.id, order).await
    }

    /// Everything the dashboard needs, fetched concurrently.
    pub async fn load_workshop(&self, session: &Session) -> ApiResult<Workshop> {
        let (vehicles, expenses, employees, part_orders) = tokio::try_join!(
            self.list_vehicles(session),
            self.list_expenses(session),
            self.list_employees(session),
            self.list_part_orders(session),
        )?;
        Ok(Workshop {
            vehicles,
            expenses,
            employees,
            part_orders,
        })
    }
}

/// A snapshot of every collection.
#[derive(Debug, Clone, Default)]
pub struct Workshop {
    pub vehicles: Vec<Vehicle>,
    pub expenses: Vec<Expense>,
    pub employees: Vec<Employee>,
    pub part_orders: Vec<PartOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_path_keeps_the_id_in_one_segment() {
        assert_eq!(Resource::Vehicles.record_path("665f1c"), "/api/vehicles/665f1c");
        assert_eq!(Resource::Employees.record_path("a/b"), "/api/employees/a%2Fb");
        assert_eq!(
            Resource::PartOrders.record_path("x?y#z"),
            "/api/part-orders/x%3Fy%23z"
        );
    }
}
