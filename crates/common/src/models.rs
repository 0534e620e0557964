//! Domain models for the Dayflow HRMS client

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account role as declared by the backend.
///
/// The capability order lives in [`Role::satisfies`]; everything that gates
/// access by role goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Default landing route after login.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Employee => "/employee/dashboard",
            Role::Manager => "/manager/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }

    /// Whether a session with this role may access a route requiring
    /// `required`. Admin covers everything, manager covers employee.
    pub fn satisfies(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::Manager, Role::Manager | Role::Employee) => true,
            (Role::Employee, Role::Employee) => true,
            _ => false,
        }
    }

    pub fn all() -> &'static [Role] {
        &[Role::Employee, Role::Manager, Role::Admin]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// The authenticated user as returned by the auth endpoints.
///
/// Employees carry `employee_id`, managers `manager_id`; the remaining
/// profile fields are only populated by some endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    /// Server-assigned identifier, whichever kind this account carries.
    pub fn id(&self) -> Option<&str> {
        self.employee_id.as_deref().or(self.manager_id.as_deref())
    }
}

/// An established session: identity, role and bearer token, all present.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half-day")]
    HalfDay,
    Leave,
    Weekend,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::HalfDay => "Half-day",
            AttendanceStatus::Leave => "Leave",
            AttendanceStatus::Weekend => "Weekend",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day of attendance as the backend reports it. `status` is absent for
/// days the server has no verdict on yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyAttendance {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub total_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceHistory {
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "Paid Leave")]
    Paid,
    #[serde(rename = "Sick Leave")]
    Sick,
    #[serde(rename = "Unpaid Leave")]
    Unpaid,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Paid => "Paid Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Unpaid => "Unpaid Leave",
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paid" | "paid leave" => Ok(LeaveType::Paid),
            "sick" | "sick leave" => Ok(LeaveType::Sick),
            "unpaid" | "unpaid leave" => Ok(LeaveType::Unpaid),
            _ => Err(format!("Unknown leave type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            _ => Err(format!("Unknown leave status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveList {
    pub leaves: Vec<LeaveRequest>,
}

/// Monthly salary components in whole currency units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryStructure {
    #[serde(default)]
    pub basic: u64,
    #[serde(default)]
    pub hra: u64,
    #[serde(default)]
    pub allowances: u64,
    #[serde(default)]
    pub deductions: u64,
}

impl SalaryStructure {
    pub fn gross(&self) -> u64 {
        self.basic + self.hra + self.allowances
    }

    /// Net salary; goes negative when deductions exceed gross.
    pub fn net(&self) -> i64 {
        self.gross() as i64 - self.deductions as i64
    }

    /// Whether any earning component has been configured at all.
    pub fn is_configured(&self) -> bool {
        self.basic > 0 || self.hra > 0 || self.allowances > 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryResponse {
    #[serde(default)]
    pub salary: SalaryStructure,
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayslipStatus {
    Pending,
    Paid,
}

impl std::fmt::Display for PayslipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayslipStatus::Pending => write!(f, "Pending"),
            PayslipStatus::Paid => write!(f, "Paid"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payslip {
    pub id: String,
    pub month_year: String,
    #[serde(default)]
    pub basic: u64,
    #[serde(default)]
    pub hra: u64,
    #[serde(default)]
    pub allowances: u64,
    #[serde(default)]
    pub deductions: u64,
    #[serde(default)]
    pub gross_salary: u64,
    #[serde(default)]
    pub net_salary: i64,
    pub status: PayslipStatus,
    #[serde(default)]
    pub paid_on: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayslipList {
    pub payslips: Vec<Payslip>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimesheetStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimesheetStatus::Pending => write!(f, "pending"),
            TimesheetStatus::Approved => write!(f, "approved"),
            TimesheetStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for TimesheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TimesheetStatus::Pending),
            "approved" => Ok(TimesheetStatus::Approved),
            "rejected" => Ok(TimesheetStatus::Rejected),
            _ => Err(format!("Unknown timesheet status: {}", s)),
        }
    }
}

/// Current-week submission state; most fields only exist once submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct TimesheetState {
    pub submitted: bool,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    #[serde(default)]
    pub status: Option<TimesheetStatus>,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timesheet {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: TimesheetStatus,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimesheetList {
    pub timesheets: Vec<Timesheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manager {
    pub manager_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerList {
    pub managers: Vec<Manager>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_employees: u64,
    #[serde(default)]
    pub present_today: u64,
    #[serde(default)]
    pub absent_today: u64,
    #[serde(default)]
    pub pending_leaves: u64,
    #[serde(default)]
    pub pending_timesheets: u64,
}

// ---- Auth wire shapes --------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub employee_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_capability_order() {
        use Role::*;
        assert!(Admin.satisfies(Admin));
        assert!(Admin.satisfies(Manager));
        assert!(Admin.satisfies(Employee));
        assert!(Manager.satisfies(Manager));
        assert!(Manager.satisfies(Employee));
        assert!(!Manager.satisfies(Admin));
        assert!(Employee.satisfies(Employee));
        assert!(!Employee.satisfies(Manager));
        assert!(!Employee.satisfies(Admin));
    }

    #[test]
    fn user_id_prefers_whichever_is_set() {
        let json = r#"{"email":"a@b.c","name":"A","role":"manager","manager_id":"MGR007"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id(), Some("MGR007"));
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn attendance_record_tolerates_missing_fields() {
        let json = r#"{"date":"2024-03-04","check_in":"09:02"}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.check_in.as_deref(), Some("09:02"));
        assert!(record.status.is_none());
        assert!(record.check_out.is_none());
    }

    #[test]
    fn salary_net_matches_component_sum() {
        let salary = SalaryStructure {
            basic: 30000,
            hra: 10000,
            allowances: 5000,
            deductions: 2000,
        };
        assert_eq!(salary.gross(), 45000);
        assert_eq!(salary.net(), 43000);
    }

    #[test]
    fn salary_net_can_go_negative_on_over_deduction() {
        let salary = SalaryStructure {
            basic: 1000,
            hra: 0,
            allowances: 0,
            deductions: 2500,
        };
        assert_eq!(salary.net(), -1500);
    }

    #[test]
    fn leave_type_wire_names() {
        let json = r#"{"leave_type":"Sick Leave","start_date":"2024-01-10","end_date":"2024-01-12","status":"Pending"}"#;
        let leave: LeaveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(leave.leave_type, LeaveType::Sick);
        assert_eq!(leave.status, LeaveStatus::Pending);
    }
}
