//! HTTP client for the Dayflow backend.
//!
//! Every request goes through one choke point that attaches the bearer
//! token, decodes the `{ error, code }` envelope on failure and reports
//! token expiry to whoever registered interest via [`ApiClient::on_auth_expired`].
//! The session-clearing policy itself lives in the session store, not here.

use chrono::NaiveDate;
use parking_lot::RwLock;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use dayflow_common::models::{
    AttendanceHistory, AttendanceRecord, AuthResponse, DashboardStats, LeaveList, LeaveStatus,
    LeaveType, ManagerList, MessageResponse, PayslipList, SalaryResponse, SalaryStructure,
    SignupRequest, TimesheetList, TimesheetState, TimesheetStatus, User, WeeklyAttendance,
};

use crate::config::ApiSettings;

static APP_USER_AGENT: &str = concat!("dayflow/", env!("CARGO_PKG_VERSION"));

/// Error code the backend sends alongside a 401 when the bearer token is
/// no longer valid.
pub const TOKEN_EXPIRED_CODE: &str = "token_expired";

const GENERIC_ERROR: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success response; `message` is the server-provided text.
    #[error("{message}")]
    Server {
        status: StatusCode,
        message: String,
        code: Option<String>,
    },
    /// 401 with `token_expired`: the session has already been torn down.
    #[error("Session expired, please log in again")]
    SessionExpired,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Review verdict for leave, timesheet and document requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ReviewAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(format!("Unknown review action: {}", s)),
        }
    }
}

type AuthExpiredHook = Box<dyn Fn() + Send + Sync>;

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
    auth_expired: RwLock<Option<AuthExpiredHook>>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
            auth_expired: RwLock::new(None),
        })
    }

    /// Installs the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Registers the callback invoked when the backend reports an expired
    /// token. At most one hook is held; the last registration wins.
    pub fn on_auth_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.auth_expired.write() = Some(Box::new(hook));
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let envelope = response
            .json::<ErrorEnvelope>()
            .await
            .unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED && envelope.code.as_deref() == Some(TOKEN_EXPIRED_CODE)
        {
            debug!("bearer token expired, notifying session layer");
            if let Some(hook) = self.auth_expired.read().as_ref() {
                hook();
            }
            return Err(ApiError::SessionExpired);
        }

        Err(ApiError::Server {
            status,
            message: envelope.error.unwrap_or_else(|| GENERIC_ERROR.to_string()),
            code: envelope.code,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        self.execute(self.authorize(self.http.get(self.url(path))))
            .await
    }

    async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!("GET {}", path);
        self.execute(self.authorize(self.http.get(self.url(path)).query(query)))
            .await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        debug!("POST {}", path);
        self.execute(self.authorize(self.http.post(self.url(path)).json(body)))
            .await
    }

    /// POST without the bearer header; only the auth and health endpoints
    /// opt out of authorization.
    async fn post_public<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        debug!("POST {} (public)", path);
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {} (public)", path);
        self.execute(self.http.get(self.url(path))).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        debug!("PUT {}", path);
        self.execute(self.authorize(self.http.put(self.url(path)).json(body)))
            .await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("DELETE {}", path);
        self.execute(self.authorize(self.http.delete(self.url(path))))
            .await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        debug!("POST {} (multipart)", path);
        self.execute(self.authorize(self.http.post(self.url(path)).multipart(form)))
            .await
    }

    fn file_part(file_name: &str, bytes: Vec<u8>) -> Part {
        Part::bytes(bytes).file_name(file_name.to_string())
    }

    // ---- Auth ----------------------------------------------------------

    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        self.post_public("/auth/signup", &json!(request)).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, ApiError> {
        self.post_public("/auth/verify-otp", &json!({ "email": email, "otp": otp }))
            .await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        self.post_public("/auth/resend-otp", &json!({ "email": email }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_public("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn manager_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.post_public(
            "/auth/manager/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    // ---- Employee profile ----------------------------------------------

    pub async fn profile(&self) -> Result<Value, ApiError> {
        self.get("/employee/profile").await
    }

    pub async fn update_profile(&self, data: &Value) -> Result<MessageResponse, ApiError> {
        self.put("/employee/profile", data).await
    }

    pub async fn upload_profile_picture(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let form = Form::new().part("file", Self::file_part(file_name, bytes));
        self.post_multipart("/employee/profile/picture", form).await
    }

    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        document_type: &str,
    ) -> Result<Value, ApiError> {
        let form = Form::new()
            .part("file", Self::file_part(file_name, bytes))
            .text("document_type", document_type.to_string());
        self.post_multipart("/employee/documents", form).await
    }

    pub async fn delete_document(&self, index: usize) -> Result<MessageResponse, ApiError> {
        self.delete(&format!("/employee/documents/{}", index)).await
    }

    pub async fn salary(&self) -> Result<SalaryResponse, ApiError> {
        self.get("/employee/salary").await
    }

    // ---- Attendance ----------------------------------------------------

    pub async fn check_in(&self, date: Option<NaiveDate>) -> Result<Value, ApiError> {
        self.post("/attendance/check-in", &json!({ "date": date }))
            .await
    }

    pub async fn check_out(&self, date: Option<NaiveDate>) -> Result<Value, ApiError> {
        self.post("/attendance/check-out", &json!({ "date": date }))
            .await
    }

    pub async fn today_attendance(&self) -> Result<AttendanceRecord, ApiError> {
        self.get("/attendance/today").await
    }

    pub async fn weekly_attendance(&self) -> Result<WeeklyAttendance, ApiError> {
        self.get("/attendance/weekly").await
    }

    pub async fn attendance_history(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: u32,
    ) -> Result<AttendanceHistory, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let (Some(start), Some(end)) = (start_date, end_date) {
            query.push(("start_date", start.to_string()));
            query.push(("end_date", end.to_string()));
        }
        self.get_query("/attendance/history", &query).await
    }

    pub async fn managers(&self) -> Result<ManagerList, ApiError> {
        self.get("/attendance/managers").await
    }

    pub async fn can_submit_timesheet(&self) -> Result<Value, ApiError> {
        self.get("/attendance/can-submit-timesheet").await
    }

    // ---- Timesheets ----------------------------------------------------

    pub async fn submit_timesheet(&self, manager_id: &str) -> Result<MessageResponse, ApiError> {
        self.post("/timesheet/submit", &json!({ "manager_id": manager_id }))
            .await
    }

    pub async fn timesheet_status(&self) -> Result<TimesheetState, ApiError> {
        self.get("/timesheet/status").await
    }

    pub async fn timesheet_history(&self, limit: u32) -> Result<TimesheetList, ApiError> {
        self.get_query("/timesheet/history", &[("limit", limit.to_string())])
            .await
    }

    pub async fn pending_timesheets(&self) -> Result<TimesheetList, ApiError> {
        self.get("/timesheet/manager/pending").await
    }

    pub async fn all_timesheets(
        &self,
        status: Option<TimesheetStatus>,
        limit: u32,
    ) -> Result<TimesheetList, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get_query("/timesheet/manager/all", &query).await
    }

    pub async fn review_timesheet(
        &self,
        employee_id: &str,
        week_start: NaiveDate,
        action: ReviewAction,
        comments: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.post(
            "/timesheet/manager/review",
            &json!({
                "employee_id": employee_id,
                "week_start": week_start,
                "action": action.as_str(),
                "comments": comments,
            }),
        )
        .await
    }

    // ---- Leave ---------------------------------------------------------

    pub async fn apply_leave(
        &self,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> Result<Value, ApiError> {
        self.post(
            "/leave/apply",
            &json!({
                "leave_type": leave_type,
                "start_date": start_date,
                "end_date": end_date,
                "reason": reason,
            }),
        )
        .await
    }

    pub async fn my_leaves(
        &self,
        status: Option<LeaveStatus>,
        limit: u32,
    ) -> Result<LeaveList, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get_query("/leave/my-leaves", &query).await
    }

    pub async fn cancel_leave(&self, leave_id: &str) -> Result<MessageResponse, ApiError> {
        self.delete(&format!("/leave/cancel/{}", leave_id)).await
    }

    pub async fn all_leaves(
        &self,
        status: Option<LeaveStatus>,
        limit: u32,
    ) -> Result<LeaveList, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get_query("/leave/admin/all", &query).await
    }

    pub async fn pending_leaves(&self) -> Result<LeaveList, ApiError> {
        self.get("/leave/admin/pending").await
    }

    pub async fn review_leave(
        &self,
        leave_id: &str,
        action: ReviewAction,
        comment: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.post(
            "/leave/admin/review",
            &json!({
                "leave_id": leave_id,
                "action": action.as_str(),
                "comment": comment,
            }),
        )
        .await
    }

    // ---- Admin ---------------------------------------------------------

    pub async fn employees(
        &self,
        search: Option<&str>,
        department: Option<&str>,
        limit: u32,
    ) -> Result<Value, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        if let Some(department) = department {
            query.push(("department", department.to_string()));
        }
        self.get_query("/admin/employees", &query).await
    }

    pub async fn employee(&self, employee_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/admin/employees/{}", employee_id)).await
    }

    pub async fn update_employee(
        &self,
        employee_id: &str,
        data: &Value,
    ) -> Result<MessageResponse, ApiError> {
        self.put(&format!("/admin/employees/{}", employee_id), data)
            .await
    }

    pub async fn update_employee_salary(
        &self,
        employee_id: &str,
        salary: &SalaryStructure,
    ) -> Result<MessageResponse, ApiError> {
        self.put(
            &format!("/admin/employees/{}/salary", employee_id),
            &json!(salary),
        )
        .await
    }

    pub async fn all_attendance(
        &self,
        date: Option<NaiveDate>,
        employee_id: Option<&str>,
        limit: u32,
    ) -> Result<Value, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(date) = date {
            query.push(("date", date.to_string()));
        }
        if let Some(employee_id) = employee_id {
            query.push(("employee_id", employee_id.to_string()));
        }
        self.get_query("/admin/attendance/all", &query).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/dashboard/stats").await
    }

    pub async fn departments(&self) -> Result<Value, ApiError> {
        self.get("/admin/departments").await
    }

    // ---- Document requests ---------------------------------------------

    pub async fn document_types(&self) -> Result<Value, ApiError> {
        self.get("/documents/types").await
    }

    pub async fn pending_document_requests(&self) -> Result<Value, ApiError> {
        self.get("/documents/requests/pending").await
    }

    pub async fn upload_requested_document(
        &self,
        request_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let form = Form::new().part("file", Self::file_part(file_name, bytes));
        self.post_multipart(&format!("/documents/upload/{}", request_id), form)
            .await
    }

    pub async fn request_document(
        &self,
        employee_id: &str,
        document_type: &str,
        description: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Value, ApiError> {
        self.post(
            "/documents/request",
            &json!({
                "employee_id": employee_id,
                "document_type": document_type,
                "description": description,
                "due_date": due_date,
            }),
        )
        .await
    }

    pub async fn admin_document_requests(
        &self,
        status: Option<&str>,
        employee_id: Option<&str>,
        limit: u32,
    ) -> Result<Value, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        if let Some(employee_id) = employee_id {
            query.push(("employee_id", employee_id.to_string()));
        }
        self.get_query("/documents/admin/requests", &query).await
    }

    pub async fn employee_documents(&self, employee_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/documents/admin/employee/{}", employee_id))
            .await
    }

    pub async fn review_document(
        &self,
        request_id: &str,
        action: ReviewAction,
        comments: &str,
    ) -> Result<Value, ApiError> {
        self.post(
            "/documents/admin/review",
            &json!({
                "request_id": request_id,
                "action": action.as_str(),
                "comments": comments,
            }),
        )
        .await
    }

    // ---- Payroll -------------------------------------------------------

    pub async fn my_payslips(&self, limit: u32) -> Result<PayslipList, ApiError> {
        self.get_query("/payroll/my-payslips", &[("limit", limit.to_string())])
            .await
    }

    pub async fn payroll_employees(&self, search: Option<&str>) -> Result<Value, ApiError> {
        let mut query = Vec::new();
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        self.get_query("/payroll/admin/employees", &query).await
    }

    pub async fn generate_payslip(
        &self,
        employee_id: &str,
        month_year: &str,
    ) -> Result<Value, ApiError> {
        self.post(
            "/payroll/admin/generate-payslip",
            &json!({ "employee_id": employee_id, "month_year": month_year }),
        )
        .await
    }

    pub async fn all_payslips(
        &self,
        employee_id: Option<&str>,
        month_year: Option<&str>,
        status: Option<&str>,
        limit: u32,
    ) -> Result<PayslipList, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(employee_id) = employee_id {
            query.push(("employee_id", employee_id.to_string()));
        }
        if let Some(month_year) = month_year {
            query.push(("month_year", month_year.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get_query("/payroll/admin/payslips", &query).await
    }

    pub async fn mark_payslip_paid(&self, payslip_id: &str) -> Result<MessageResponse, ApiError> {
        self.post(
            &format!("/payroll/admin/payslip/{}/mark-paid", payslip_id),
            &json!({}),
        )
        .await
    }

    // ---- AI ------------------------------------------------------------

    pub async fn ai_chat(&self, message: &str) -> Result<Value, ApiError> {
        self.post("/ai/chat", &json!({ "message": message })).await
    }

    pub async fn ai_insights(&self, insight_type: &str) -> Result<Value, ApiError> {
        self.post("/ai/insights", &json!({ "type": insight_type }))
            .await
    }

    pub async fn quick_insights(&self) -> Result<Value, ApiError> {
        self.get("/ai/quick-insights").await
    }

    // ---- Health --------------------------------------------------------

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get_public("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: server.uri(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    struct NoAuthHeader;

    impl Match for NoAuthHeader {
        fn matches(&self, request: &Request) -> bool {
            !request.headers.contains_key("authorization")
        }
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_set() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "email": "ava@dayflow.dev",
                "name": "Ava",
                "employee_id": "EMP001",
                "role": "employee"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_token("jwt-123");

        let user = client.me().await.unwrap();
        assert_eq!(user.email, "ava@dayflow.dev");
        assert_eq!(user.id(), Some("EMP001"));
    }

    #[tokio::test]
    async fn login_goes_out_without_auth_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(NoAuthHeader)
            .and(body_json(serde_json::json!({
                "email": "ava@dayflow.dev",
                "password": "hunter2!A"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Login successful",
                "token": "jwt-123",
                "user": { "email": "ava@dayflow.dev", "name": "Ava", "employee_id": "EMP001", "role": "employee" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        // A stale token must not leak onto the public login call.
        client.set_token("stale");

        let auth = client.login("ava@dayflow.dev", "hunter2!A").await.unwrap();
        assert_eq!(auth.token, "jwt-123");
    }

    #[tokio::test]
    async fn server_error_surfaces_the_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Invalid email or password"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.login("ava@dayflow.dev", "nope").await.unwrap_err();

        match err {
            ApiError::Server { status, message, code } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Invalid email or password");
                assert!(code.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_without_body_falls_back_to_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/employee/profile"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.profile().await.unwrap_err();
        assert_eq!(err.to_string(), "An error occurred");
    }

    #[tokio::test]
    async fn token_expiry_fires_hook_and_still_rejects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/employee/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Token has expired",
                "code": "token_expired"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_token("jwt-old");

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        client.on_auth_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn plain_401_is_not_treated_as_expiry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/employee/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        client.on_auth_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn multipart_upload_carries_the_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/employee/profile/picture"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Uploaded"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_token("jwt-123");

        let result = client
            .upload_profile_picture("avatar.png", vec![0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();
        assert_eq!(result["message"], "Uploaded");
    }

    #[tokio::test]
    async fn optional_filters_are_only_sent_when_present() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leave/my-leaves"))
            .and(wiremock::matchers::query_param("limit", "20"))
            .and(wiremock::matchers::query_param("status", "Approved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "leaves": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_token("jwt-123");

        let leaves = client
            .my_leaves(Some(LeaveStatus::Approved), 20)
            .await
            .unwrap();
        assert!(leaves.leaves.is_empty());
    }
}
