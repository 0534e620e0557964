//! Dayflow HRMS Client
//!
//! A terminal client for the Dayflow HR backend: authentication with
//! OTP-verified signup, attendance and timesheet tracking, leave and
//! payroll queries, document requests and the AI insights panel.

mod api;
mod config;
mod guard;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use dayflow_common::models::{Role, SalaryStructure, SignupRequest};
use dayflow_common::storage::SqliteStore;
use dayflow_common::views;

use api::{ApiClient, ReviewAction};
use config::ClientConfig;
use guard::RouteDecision;
use session::SessionStore;

#[derive(Parser)]
#[command(name = "dayflow")]
#[command(about = "Dayflow HRMS - terminal client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        email: String,

        #[arg(short, long)]
        password: Option<String>,

        /// Role to log in as: employee, manager or admin
        #[arg(short, long, default_value = "employee")]
        role: String,
    },

    /// Register a new account (completes via verify-otp)
    Signup {
        email: String,
        name: String,
        employee_id: String,

        #[arg(short, long)]
        password: Option<String>,

        #[arg(short, long, default_value = "employee")]
        role: String,
    },

    /// Verify the emailed OTP and establish the session
    VerifyOtp { email: String, otp: String },

    /// Request a fresh OTP
    ResendOtp { email: String },

    /// Clear the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Role-specific overview assembled from several endpoints
    Dashboard,

    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },

    Timesheet {
        #[command(subcommand)]
        command: TimesheetCommands,
    },

    Leave {
        #[command(subcommand)]
        command: LeaveCommands,
    },

    Payroll {
        #[command(subcommand)]
        command: PayrollCommands,
    },

    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },

    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },

    /// Check backend availability
    Health,

    GenerateConfig {
        #[arg(short, long, default_value = "dayflow.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum AttendanceCommands {
    /// Check in for the day
    CheckIn {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Check out for the day
    CheckOut {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Today's record
    Today,
    /// Weekly grid, Sunday through Saturday
    Week,
    History {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(short, long, default_value_t = 30)]
        limit: u32,
    },
    /// Managers available for timesheet submission
    Managers,
    /// Whether the timesheet window is open this week
    CanSubmit,
}

#[derive(Subcommand)]
enum TimesheetCommands {
    /// Submit this week's timesheet to a manager
    Submit { manager_id: String },
    /// This week's submission state
    Status,
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Timesheets awaiting your review (manager)
    Pending,
    /// All timesheets routed to you (manager)
    All {
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Approve or reject a submitted timesheet (manager)
    Review {
        employee_id: String,
        week_start: NaiveDate,
        action: String,
        #[arg(long, default_value = "")]
        comments: String,
    },
}

#[derive(Subcommand)]
enum LeaveCommands {
    /// Apply for leave: paid, sick or unpaid
    Apply {
        leave_type: String,
        start: NaiveDate,
        end: NaiveDate,
        #[arg(long, default_value = "")]
        reason: String,
    },
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    Cancel { id: String },
    /// Remaining annual allowance
    Balance,
    /// Requests awaiting review (admin)
    Pending,
    /// All leave requests (admin)
    All {
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Approve or reject a request (admin)
    Review {
        id: String,
        action: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum PayrollCommands {
    /// Your payslips
    Payslips {
        #[arg(short, long, default_value_t = 12)]
        limit: u32,
    },
    /// Your salary structure
    Salary,
    /// Employees with salary info (admin)
    Employees {
        #[arg(long)]
        search: Option<String>,
    },
    /// All generated payslips (admin)
    All {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },
    /// Generate a payslip for MM-YYYY (admin)
    Generate { employee_id: String, month_year: String },
    /// Mark a payslip as paid (admin)
    MarkPaid { id: String },
}

#[derive(Subcommand)]
enum ProfileCommands {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    UploadPicture { file: PathBuf },
    UploadDocument {
        file: PathBuf,
        #[arg(long)]
        doc_type: String,
    },
    DeleteDocument { index: usize },
}

#[derive(Subcommand)]
enum AdminCommands {
    Employees {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },
    Employee { id: String },
    UpdateEmployee {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        job_title: Option<String>,
    },
    UpdateSalary {
        id: String,
        #[arg(long, default_value_t = 0)]
        basic: u64,
        #[arg(long, default_value_t = 0)]
        hra: u64,
        #[arg(long, default_value_t = 0)]
        allowances: u64,
        #[arg(long, default_value_t = 0)]
        deductions: u64,
    },
    Attendance {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        employee: Option<String>,
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },
    Stats,
    Departments,
}

#[derive(Subcommand)]
enum DocsCommands {
    /// Accepted document types
    Types,
    /// Requests waiting for your upload
    Pending,
    Upload { request_id: String, file: PathBuf },
    /// Ask an employee for a document (admin)
    Request {
        employee_id: String,
        doc_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// All document requests (admin)
    All {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        employee: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Documents uploaded by an employee (admin)
    Employee { id: String },
    /// Approve or reject an uploaded document (admin)
    Review {
        request_id: String,
        action: String,
        #[arg(long, default_value = "")]
        comments: String,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Ask the HR assistant a question
    Chat { message: String },
    /// Generate insights: attendance, leave, payroll or general
    Insights {
        #[arg(default_value = "general")]
        insight_type: String,
    },
    /// Precomputed highlights
    Quick,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = cli.config.unwrap_or_else(ClientConfig::default_path);
    let mut config = if config_path.exists() {
        ClientConfig::load(&config_path)?
    } else {
        ClientConfig::default()
    };

    if let Some(server) = cli.server {
        config.api.base_url = server;
    }

    match cli.command {
        Commands::Login { email, password, role } => run_login(&config, &email, password, &role).await,
        Commands::Signup { email, name, employee_id, password, role } => {
            run_signup(&config, &email, &name, &employee_id, password, &role).await
        }
        Commands::VerifyOtp { email, otp } => run_verify_otp(&config, &email, &otp).await,
        Commands::ResendOtp { email } => run_resend_otp(&config, &email).await,
        Commands::Logout => run_logout(&config),
        Commands::Whoami => run_whoami(&config).await,
        Commands::Dashboard => run_dashboard(&config).await,
        Commands::Attendance { command } => run_attendance(&config, command).await,
        Commands::Timesheet { command } => run_timesheet(&config, command).await,
        Commands::Leave { command } => run_leave(&config, command).await,
        Commands::Payroll { command } => run_payroll(&config, command).await,
        Commands::Profile { command } => run_profile(&config, command).await,
        Commands::Admin { command } => run_admin(&config, command).await,
        Commands::Docs { command } => run_docs(&config, command).await,
        Commands::Ai { command } => run_ai(&config, command).await,
        Commands::Health => run_health(&config).await,
        Commands::GenerateConfig { output } => generate_config(&output),
    }
}

/// Builds the API client and session store and wires the token-expiry hook
/// so an expired session is torn down no matter which call trips it.
fn context(config: &ClientConfig) -> Result<(Arc<ApiClient>, Arc<SessionStore>)> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    let storage = Arc::new(SqliteStore::open(&config.storage.session_db_path())?);
    let session = Arc::new(SessionStore::new(api.clone(), storage)?);

    let hooked = session.clone();
    api.on_auth_expired(move || hooked.handle_auth_expired());

    Ok((api, session))
}

/// Evaluates the route guard for a screen requiring `required`, mapping
/// redirects onto command-line failures.
fn require(session: &SessionStore, required: Role) -> Result<()> {
    match guard::evaluate(session.current().as_ref(), required) {
        RouteDecision::Render => Ok(()),
        RouteDecision::Redirect(route) if route == session::LOGIN_ROUTE => {
            bail!("Not logged in. Run 'dayflow login <email>' first.")
        }
        RouteDecision::Redirect(route) => {
            bail!("This command needs the {} role; your dashboard is {}", required, route)
        }
    }
}

fn read_secret(prompt: &str) -> Result<String> {
    use std::io::{self, BufRead, Write};

    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid file name: {:?}", path))?
        .to_string();
    let bytes = std::fs::read(path)?;
    Ok((name, bytes))
}

fn message_of(value: &Value) -> &str {
    value["message"].as_str().unwrap_or("OK")
}

async fn run_login(
    config: &ClientConfig,
    email: &str,
    password: Option<String>,
    role: &str,
) -> Result<()> {
    let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
    let password = match password {
        Some(password) => password,
        None => read_secret("Password")?,
    };

    let (_api, session) = context(config)?;
    let route = session.login(email, &password, role).await?;

    if let Some(current) = session.current() {
        println!("Logged in as {} ({})", current.user.name, current.role);
    }
    println!("Landing: {}", route);
    Ok(())
}

async fn run_signup(
    config: &ClientConfig,
    email: &str,
    name: &str,
    employee_id: &str,
    password: Option<String>,
    role: &str,
) -> Result<()> {
    let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
    if role == Role::Manager {
        bail!("Manager accounts are provisioned by HR; sign up as employee or admin");
    }

    let password = match password {
        Some(password) => password,
        None => read_secret("Password")?,
    };

    let (_api, session) = context(config)?;
    let message = session
        .signup(&SignupRequest {
            email: email.to_string(),
            password,
            name: name.to_string(),
            employee_id: employee_id.to_string(),
            role,
        })
        .await?;

    println!("{}", message);
    println!("Complete registration with: dayflow verify-otp {} <otp>", email);
    Ok(())
}

async fn run_verify_otp(config: &ClientConfig, email: &str, otp: &str) -> Result<()> {
    let (_api, session) = context(config)?;
    let route = session.verify_otp(email, otp).await?;
    println!("Email verified, you are logged in.");
    println!("Landing: {}", route);
    Ok(())
}

async fn run_resend_otp(config: &ClientConfig, email: &str) -> Result<()> {
    let (_api, session) = context(config)?;
    let message = session.resend_otp(email).await?;
    println!("{}", message);
    Ok(())
}

fn run_logout(config: &ClientConfig) -> Result<()> {
    let (_api, session) = context(config)?;
    let route = session.logout();
    println!("Logged out. Landing: {}", route);
    Ok(())
}

async fn run_whoami(config: &ClientConfig) -> Result<()> {
    let (api, session) = context(config)?;
    require(&session, Role::Employee)?;

    let user = api.me().await?;
    println!("{} <{}>", user.name, user.email);
    println!("Role: {}", user.role);
    if let Some(id) = user.id() {
        println!("ID:   {}", id);
    }
    if let Some(department) = &user.department {
        if !department.is_empty() {
            println!("Dept: {}", department);
        }
    }
    Ok(())
}

async fn run_dashboard(config: &ClientConfig) -> Result<()> {
    let (api, session) = context(config)?;

    let Some(current) = session.current() else {
        bail!("Not logged in. Run 'dayflow login <email>' first.");
    };

    println!("Dashboard for {} ({})", current.user.name, current.role);
    println!();

    // One render pass: the component fetches run concurrently and the whole
    // batch fails if any one of them does.
    match current.role {
        Role::Employee => {
            let (today, weekly, leaves) = tokio::try_join!(
                api.today_attendance(),
                api.weekly_attendance(),
                api.my_leaves(None, 100),
            )?;

            let status = today
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Absent".to_string());
            println!(
                "Today:           {} (in {}, out {})",
                status,
                today.check_in.as_deref().unwrap_or("-"),
                today.check_out.as_deref().unwrap_or("-"),
            );
            println!("Hours this week: {:.1}", weekly.total_hours);
            println!(
                "Remaining leave: {} of {}",
                views::remaining_leave(&config.leave, &leaves.leaves),
                config.leave.annual_allowance
            );
        }
        Role::Manager => {
            let (stats, pending) =
                tokio::try_join!(api.dashboard_stats(), api.pending_timesheets())?;

            println!("Employees:          {}", stats.total_employees);
            println!("Present today:      {}", stats.present_today);
            println!("Pending timesheets: {}", pending.timesheets.len());
        }
        Role::Admin => {
            let (stats, pending) = tokio::try_join!(api.dashboard_stats(), api.pending_leaves())?;

            println!("Employees:      {}", stats.total_employees);
            println!("Present today:  {}", stats.present_today);
            println!("Absent today:   {}", stats.absent_today);
            println!("Pending leaves: {}", pending.leaves.len());
        }
    }

    Ok(())
}

async fn run_attendance(config: &ClientConfig, command: AttendanceCommands) -> Result<()> {
    let (api, session) = context(config)?;
    require(&session, Role::Employee)?;

    match command {
        AttendanceCommands::CheckIn { date } => {
            let result = api.check_in(date).await?;
            println!("{}", message_of(&result));
        }
        AttendanceCommands::CheckOut { date } => {
            let result = api.check_out(date).await?;
            println!("{}", message_of(&result));
        }
        AttendanceCommands::Today => {
            let today = api.today_attendance().await?;
            let status = today
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Absent".to_string());
            println!("{}  {}", today.date, status);
            println!("Check-in:  {}", today.check_in.as_deref().unwrap_or("-"));
            println!("Check-out: {}", today.check_out.as_deref().unwrap_or("-"));
            println!("Hours:     {:.1}", today.total_hours);
        }
        AttendanceCommands::Week => {
            let weekly = api.weekly_attendance().await?;
            let today = Local::now().date_naive();
            let grid =
                views::weekly_grid(weekly.week_start, &weekly.attendance, today, &config.leave);

            println!("Week {} to {}", weekly.week_start, weekly.week_end);
            for row in &grid {
                let marker = if row.is_today { ">" } else { " " };
                println!(
                    "{} {}  {:<3}  in {:<6} out {:<6} {}",
                    marker,
                    row.date,
                    row.weekday,
                    row.check_in.as_deref().unwrap_or("-"),
                    row.check_out.as_deref().unwrap_or("-"),
                    row.status,
                );
            }
            println!("Total hours: {:.1}", weekly.total_hours);
        }
        AttendanceCommands::History { start, end, limit } => {
            let history = api.attendance_history(start, end, limit).await?;
            for record in &history.attendance {
                let status = record
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Absent".to_string());
                println!(
                    "{}  in {:<6} out {:<6} {:<8} {:.1}h",
                    record.date,
                    record.check_in.as_deref().unwrap_or("-"),
                    record.check_out.as_deref().unwrap_or("-"),
                    status,
                    record.total_hours,
                );
            }
        }
        AttendanceCommands::Managers => {
            let managers = api.managers().await?;
            for manager in &managers.managers {
                println!("{}  {} <{}>", manager.manager_id, manager.name, manager.email);
            }
        }
        AttendanceCommands::CanSubmit => {
            let result = api.can_submit_timesheet().await?;
            if result["can_submit"].as_bool().unwrap_or(false) {
                println!("Timesheet submission window is open.");
            } else {
                println!(
                    "{}",
                    result["reason"]
                        .as_str()
                        .unwrap_or("Timesheet cannot be submitted right now.")
                );
            }
        }
    }

    Ok(())
}

async fn run_timesheet(config: &ClientConfig, command: TimesheetCommands) -> Result<()> {
    let (api, session) = context(config)?;

    match command {
        TimesheetCommands::Submit { manager_id } => {
            require(&session, Role::Employee)?;
            let result = api.submit_timesheet(&manager_id).await?;
            println!("{}", result.message);
        }
        TimesheetCommands::Status => {
            require(&session, Role::Employee)?;
            let state = api.timesheet_status().await?;
            println!("Week {} to {}", state.week_start, state.week_end);
            if state.submitted {
                let status = state
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "pending".to_string());
                println!("Status:  {}", status);
                if let Some(manager) = &state.manager_name {
                    println!("Manager: {}", manager);
                }
                if !state.comments.is_empty() {
                    println!("Comments: {}", state.comments);
                }
            } else {
                println!("Not submitted yet.");
            }
        }
        TimesheetCommands::History { limit } => {
            require(&session, Role::Employee)?;
            let history = api.timesheet_history(limit).await?;
            for ts in &history.timesheets {
                println!(
                    "{} to {}  {:<8} {:.1}h  {}",
                    ts.week_start,
                    ts.week_end,
                    ts.status.to_string(),
                    ts.total_hours,
                    ts.manager_name.as_deref().unwrap_or("-"),
                );
            }
        }
        TimesheetCommands::Pending => {
            require(&session, Role::Manager)?;
            let pending = api.pending_timesheets().await?;
            if pending.timesheets.is_empty() {
                println!("No timesheets waiting for review.");
            }
            for ts in &pending.timesheets {
                println!(
                    "{}  {}  week of {}  {:.1}h",
                    ts.employee_id.as_deref().unwrap_or("-"),
                    ts.employee_name.as_deref().unwrap_or("-"),
                    ts.week_start,
                    ts.total_hours,
                );
            }
        }
        TimesheetCommands::All { status, limit } => {
            require(&session, Role::Manager)?;
            let status = status
                .map(|s| s.parse().map_err(|e: String| anyhow!(e)))
                .transpose()?;
            let all = api.all_timesheets(status, limit).await?;
            for ts in &all.timesheets {
                println!(
                    "{}  {}  week of {}  {}",
                    ts.employee_id.as_deref().unwrap_or("-"),
                    ts.employee_name.as_deref().unwrap_or("-"),
                    ts.week_start,
                    ts.status,
                );
            }
        }
        TimesheetCommands::Review { employee_id, week_start, action, comments } => {
            require(&session, Role::Manager)?;
            let action: ReviewAction = action.parse().map_err(|e: String| anyhow!(e))?;
            let result = api
                .review_timesheet(&employee_id, week_start, action, &comments)
                .await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

async fn run_leave(config: &ClientConfig, command: LeaveCommands) -> Result<()> {
    let (api, session) = context(config)?;

    match command {
        LeaveCommands::Apply { leave_type, start, end, reason } => {
            require(&session, Role::Employee)?;
            let leave_type = leave_type.parse().map_err(|e: String| anyhow!(e))?;
            let days = views::leave_days(start, end);
            let result = api.apply_leave(leave_type, start, end, &reason).await?;
            println!("{} ({} days)", message_of(&result), days);
        }
        LeaveCommands::List { status, limit } => {
            require(&session, Role::Employee)?;
            let status = status
                .map(|s| s.parse().map_err(|e: String| anyhow!(e)))
                .transpose()?;
            let leaves = api.my_leaves(status, limit).await?;
            for leave in &leaves.leaves {
                println!(
                    "{}  {} to {} ({}d)  {:<12} {}",
                    leave.id,
                    leave.start_date,
                    leave.end_date,
                    views::leave_days(leave.start_date, leave.end_date),
                    leave.leave_type.as_str(),
                    leave.status,
                );
            }
        }
        LeaveCommands::Cancel { id } => {
            require(&session, Role::Employee)?;
            let result = api.cancel_leave(&id).await?;
            println!("{}", result.message);
        }
        LeaveCommands::Balance => {
            require(&session, Role::Employee)?;
            let leaves = api.my_leaves(None, 100).await?;
            let remaining = views::remaining_leave(&config.leave, &leaves.leaves);
            println!(
                "Remaining leave: {} of {}",
                remaining, config.leave.annual_allowance
            );
        }
        LeaveCommands::Pending => {
            require(&session, Role::Admin)?;
            let pending = api.pending_leaves().await?;
            if pending.leaves.is_empty() {
                println!("No leave requests waiting for review.");
            }
            for leave in &pending.leaves {
                println!(
                    "{}  {}  {} to {}  {}",
                    leave.id,
                    leave.employee_name.as_deref().unwrap_or("-"),
                    leave.start_date,
                    leave.end_date,
                    leave.leave_type,
                );
            }
        }
        LeaveCommands::All { status, limit } => {
            require(&session, Role::Admin)?;
            let status = status
                .map(|s| s.parse().map_err(|e: String| anyhow!(e)))
                .transpose()?;
            let leaves = api.all_leaves(status, limit).await?;
            for leave in &leaves.leaves {
                println!(
                    "{}  {}  {} to {}  {:<12} {}",
                    leave.id,
                    leave.employee_name.as_deref().unwrap_or("-"),
                    leave.start_date,
                    leave.end_date,
                    leave.leave_type.as_str(),
                    leave.status,
                );
            }
        }
        LeaveCommands::Review { id, action, comment } => {
            require(&session, Role::Admin)?;
            let action: ReviewAction = action.parse().map_err(|e: String| anyhow!(e))?;
            let result = api.review_leave(&id, action, &comment).await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

async fn run_payroll(config: &ClientConfig, command: PayrollCommands) -> Result<()> {
    let (api, session) = context(config)?;

    match command {
        PayrollCommands::Payslips { limit } => {
            require(&session, Role::Employee)?;
            let payslips = api.my_payslips(limit).await?;
            for slip in &payslips.payslips {
                println!(
                    "{}  gross {:>8}  deductions {:>8}  net {:>8}  {}",
                    slip.month_year, slip.gross_salary, slip.deductions, slip.net_salary, slip.status,
                );
            }
        }
        PayrollCommands::Salary => {
            require(&session, Role::Employee)?;
            let response = api.salary().await?;
            if !response.salary.is_configured() {
                println!("Salary structure not configured yet. Please contact HR.");
                return Ok(());
            }
            let salary = &response.salary;
            println!("Salary for {} ({})", response.name, response.employee_id);
            println!("Basic:      {:>10}", salary.basic);
            println!("HRA:        {:>10}", salary.hra);
            println!("Allowances: {:>10}", salary.allowances);
            println!("Gross:      {:>10}", salary.gross());
            println!("Deductions: {:>10}", salary.deductions);
            println!("Net:        {:>10}", salary.net());
        }
        PayrollCommands::Employees { search } => {
            require(&session, Role::Admin)?;
            let employees = api.payroll_employees(search.as_deref()).await?;
            println!("{:#}", employees);
        }
        PayrollCommands::All { employee, month, status, limit } => {
            require(&session, Role::Admin)?;
            let payslips = api
                .all_payslips(employee.as_deref(), month.as_deref(), status.as_deref(), limit)
                .await?;
            for slip in &payslips.payslips {
                println!(
                    "{}  {}  net {:>8}  {}",
                    slip.id, slip.month_year, slip.net_salary, slip.status,
                );
            }
        }
        PayrollCommands::Generate { employee_id, month_year } => {
            require(&session, Role::Admin)?;
            let result = api.generate_payslip(&employee_id, &month_year).await?;
            println!("{}", message_of(&result));
        }
        PayrollCommands::MarkPaid { id } => {
            require(&session, Role::Admin)?;
            let result = api.mark_payslip_paid(&id).await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

async fn run_profile(config: &ClientConfig, command: ProfileCommands) -> Result<()> {
    let (api, session) = context(config)?;
    require(&session, Role::Employee)?;

    match command {
        ProfileCommands::Show => {
            let profile = api.profile().await?;
            println!("{:#}", profile);
        }
        ProfileCommands::Update { name, phone, address } => {
            let mut data = serde_json::Map::new();
            if let Some(name) = name {
                data.insert("name".to_string(), Value::String(name));
            }
            if let Some(phone) = phone {
                data.insert("phone".to_string(), Value::String(phone));
            }
            if let Some(address) = address {
                data.insert("address".to_string(), Value::String(address));
            }
            if data.is_empty() {
                bail!("Nothing to update; pass at least one of --name, --phone, --address");
            }
            let result = api.update_profile(&Value::Object(data)).await?;
            println!("{}", result.message);
        }
        ProfileCommands::UploadPicture { file } => {
            let (name, bytes) = read_file(&file)?;
            let result = api.upload_profile_picture(&name, bytes).await?;
            println!("{}", message_of(&result));
        }
        ProfileCommands::UploadDocument { file, doc_type } => {
            let (name, bytes) = read_file(&file)?;
            let result = api.upload_document(&name, bytes, &doc_type).await?;
            println!("{}", message_of(&result));
        }
        ProfileCommands::DeleteDocument { index } => {
            let result = api.delete_document(index).await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

async fn run_admin(config: &ClientConfig, command: AdminCommands) -> Result<()> {
    let (api, session) = context(config)?;
    require(&session, Role::Admin)?;

    match command {
        AdminCommands::Employees { search, department, limit } => {
            let employees = api
                .employees(search.as_deref(), department.as_deref(), limit)
                .await?;
            println!("{:#}", employees);
        }
        AdminCommands::Employee { id } => {
            let employee = api.employee(&id).await?;
            println!("{:#}", employee);
        }
        AdminCommands::UpdateEmployee { id, name, department, job_title } => {
            let mut data = serde_json::Map::new();
            if let Some(name) = name {
                data.insert("name".to_string(), Value::String(name));
            }
            if let Some(department) = department {
                data.insert("department".to_string(), Value::String(department));
            }
            if let Some(job_title) = job_title {
                data.insert("job_title".to_string(), Value::String(job_title));
            }
            if data.is_empty() {
                bail!("Nothing to update; pass at least one of --name, --department, --job-title");
            }
            let result = api.update_employee(&id, &Value::Object(data)).await?;
            println!("{}", result.message);
        }
        AdminCommands::UpdateSalary { id, basic, hra, allowances, deductions } => {
            let salary = SalaryStructure { basic, hra, allowances, deductions };
            // Same arithmetic the payslip view uses, shown before committing.
            println!("Gross {} / Net {}", salary.gross(), salary.net());
            let result = api.update_employee_salary(&id, &salary).await?;
            println!("{}", result.message);
        }
        AdminCommands::Attendance { date, employee, limit } => {
            let attendance = api.all_attendance(date, employee.as_deref(), limit).await?;
            println!("{:#}", attendance);
        }
        AdminCommands::Stats => {
            let stats = api.dashboard_stats().await?;
            println!("Employees:          {}", stats.total_employees);
            println!("Present today:      {}", stats.present_today);
            println!("Absent today:       {}", stats.absent_today);
            println!("Pending leaves:     {}", stats.pending_leaves);
            println!("Pending timesheets: {}", stats.pending_timesheets);
        }
        AdminCommands::Departments => {
            let departments = api.departments().await?;
            println!("{:#}", departments);
        }
    }

    Ok(())
}

async fn run_docs(config: &ClientConfig, command: DocsCommands) -> Result<()> {
    let (api, session) = context(config)?;

    match command {
        DocsCommands::Types => {
            require(&session, Role::Employee)?;
            let types = api.document_types().await?;
            println!("{:#}", types);
        }
        DocsCommands::Pending => {
            require(&session, Role::Employee)?;
            let pending = api.pending_document_requests().await?;
            println!("{:#}", pending);
        }
        DocsCommands::Upload { request_id, file } => {
            require(&session, Role::Employee)?;
            let (name, bytes) = read_file(&file)?;
            let result = api.upload_requested_document(&request_id, &name, bytes).await?;
            println!("{}", message_of(&result));
        }
        DocsCommands::Request { employee_id, doc_type, description, due } => {
            require(&session, Role::Admin)?;
            let result = api
                .request_document(&employee_id, &doc_type, &description, due)
                .await?;
            println!("{}", message_of(&result));
        }
        DocsCommands::All { status, employee, limit } => {
            require(&session, Role::Admin)?;
            let requests = api
                .admin_document_requests(status.as_deref(), employee.as_deref(), limit)
                .await?;
            println!("{:#}", requests);
        }
        DocsCommands::Employee { id } => {
            require(&session, Role::Admin)?;
            let documents = api.employee_documents(&id).await?;
            println!("{:#}", documents);
        }
        DocsCommands::Review { request_id, action, comments } => {
            require(&session, Role::Admin)?;
            let action: ReviewAction = action.parse().map_err(|e: String| anyhow!(e))?;
            let result = api.review_document(&request_id, action, &comments).await?;
            println!("{}", message_of(&result));
        }
    }

    Ok(())
}

async fn run_ai(config: &ClientConfig, command: AiCommands) -> Result<()> {
    let (api, session) = context(config)?;

    match command {
        AiCommands::Chat { message } => {
            require(&session, Role::Employee)?;
            let result = api.ai_chat(&message).await?;
            println!("{}", result["response"].as_str().unwrap_or(""));
        }
        AiCommands::Insights { insight_type } => {
            require(&session, Role::Manager)?;
            let result = api.ai_insights(&insight_type).await?;
            match result["insights"].as_str() {
                Some(insights) => println!("{}", insights),
                None => println!("{:#}", result),
            }
        }
        AiCommands::Quick => {
            require(&session, Role::Manager)?;
            let result = api.quick_insights().await?;
            println!("{:#}", result);
        }
    }

    Ok(())
}

async fn run_health(config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(&config.api)?;
    let health = api.health().await?;
    println!(
        "Backend {} ({})",
        health["status"].as_str().unwrap_or("unknown"),
        config.api.base_url,
    );
    Ok(())
}

fn generate_config(output: &PathBuf) -> Result<()> {
    let content = config::generate_example_config();
    std::fs::write(output, content)?;
    println!("Generated example config: {:?}", output);
    Ok(())
}
