pub mod models;
pub mod storage;
pub mod views;

pub use models::{
    AttendanceHistory, AttendanceRecord, AttendanceStatus, AuthResponse, DashboardStats,
    LeaveList, LeaveRequest, LeaveStatus, LeaveType, Manager, ManagerList, MessageResponse,
    Payslip, PayslipList, PayslipStatus, Role, SalaryResponse, SalaryStructure, Session,
    SignupRequest, Timesheet, TimesheetList, TimesheetState, TimesheetStatus, User,
    WeeklyAttendance,
};

pub use storage::{KeyValueStore, SqliteStore, StorageError, KEY_ROLE, KEY_TOKEN, KEY_USER};

pub use views::{
    leave_days, remaining_leave, week_start_of, weekly_grid, LeavePolicy, WeekRow,
};
