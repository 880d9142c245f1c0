// src/main.rs

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staffdesk_core::auth::{AuthService, LoginView};
use staffdesk_core::dates;
use staffdesk_core::employee_log::LogService;
use staffdesk_core::employees::{EmployeeBoard, EmployeeForm, EmployeeService};
use staffdesk_core::models::{
    AttendanceRecord, EntityId, LogRecord, OnBehalfDraft, PermissionDraft, VacationDraft,
};
use staffdesk_core::permissions::{PermissionBoard, PermissionTab};
use staffdesk_core::vacations::{SortKey, VacationBoard, VacationTab};
use staffdesk_core::{
    ApiClient, Decision, Navigation, Notifications, Route, RouteGuard, Session, Settings,
    StaffdeskError,
};

/// Terminal client for the StaffDesk back-office API.
#[derive(Parser, Debug)]
#[command(name = "staffdesk", version, about, long_about = None)]
struct Cli {
    /// Session file; overrides STAFFDESK_SESSION_FILE
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Navigate to a view by path, e.g. `/permissions`
    Open { path: String },
    #[command(subcommand)]
    Employees(EmployeeCommand),
    #[command(subcommand)]
    Permissions(PermissionCommand),
    #[command(subcommand)]
    Vacations(VacationCommand),
    #[command(subcommand)]
    Logs(LogCommand),
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    #[command(alias = "ls")]
    List,
    Show { id: String },
    Add(EmployeeFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct EmployeeFields {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    salary: String,
    #[arg(long, default_value = "")]
    password: String,
    #[arg(long, default_value = "")]
    role_id: String,
    #[arg(long, default_value = "")]
    boss_id: String,
    #[arg(long, default_value = "")]
    shift_id: String,
}

impl From<EmployeeFields> for EmployeeForm {
    fn from(fields: EmployeeFields) -> Self {
        EmployeeForm {
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            salary: fields.salary,
            password: fields.password,
            role_id: fields.role_id,
            boss_id: fields.boss_id,
            shift_id: fields.shift_id,
        }
    }
}

#[derive(Subcommand, Debug)]
enum PermissionCommand {
    #[command(alias = "ls")]
    List {
        /// Only requests awaiting a decision
        #[arg(long)]
        pending: bool,
    },
    /// Ask your boss for leave
    Request {
        #[arg(long)]
        reason: String,
        #[arg(long, value_parser = parse_date_arg)]
        begin: DateTime<Utc>,
        #[arg(long, value_parser = parse_date_arg)]
        end: DateTime<Utc>,
    },
    /// File leave on behalf of another employee
    Create {
        #[arg(long)]
        target: String,
        #[arg(long)]
        reason: String,
        #[arg(long, value_parser = parse_date_arg)]
        begin: DateTime<Utc>,
        #[arg(long, value_parser = parse_date_arg)]
        end: DateTime<Utc>,
    },
    Approve { id: String },
    Reject { id: String },
}

#[derive(Subcommand, Debug)]
enum VacationCommand {
    /// Balance and requests of an employee (yourself by default)
    Show {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long, value_enum, default_value_t = TabArg::All)]
        tab: TabArg,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Descending order (with --sort)
        #[arg(long)]
        desc: bool,
    },
    Request {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long, value_parser = parse_date_arg)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_date_arg)]
        end: DateTime<Utc>,
    },
    Approve {
        id: String,
        #[arg(long)]
        employee: Option<String>,
    },
    Reject {
        id: String,
        #[arg(long)]
        employee: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabArg {
    All,
    Pending,
    Approved,
    Rejected,
}

impl From<TabArg> for VacationTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => VacationTab::All,
            TabArg::Pending => VacationTab::Pending,
            TabArg::Approved => VacationTab::Approved,
            TabArg::Rejected => VacationTab::Rejected,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Start,
    Status,
    Days,
}

impl From<SortArg> for SortKey {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Start => SortKey::StartDate,
            SortArg::Status => SortKey::Status,
            SortArg::Days => SortKey::Days,
        }
    }
}

#[derive(Subcommand, Debug)]
enum LogCommand {
    /// Clock in or out, e.g. `enter` / `exit`
    Entry { action: String },
    All,
    Employee { id: String },
    Attendance { id: String },
    Attendances,
}

fn parse_date_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    dates::parse_timestamp(raw)
        .ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD or RFC 3339)", raw))
}

impl Command {
    /// View a command belongs to; `None` for commands that bypass the guard.
    fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::Logout | Command::Open { .. } => None,
            Command::Employees(_) => Some(Route::Employees),
            Command::Permissions(_) => Some(Route::Permissions),
            Command::Vacations(_) => Some(Route::Vacations),
            Command::Logs(_) => Some(Route::Logs),
        }
    }
}

struct Shell {
    client: ApiClient,
    session: Session,
    guard: RouteGuard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("Failed to load configuration")?;
    if let Some(path) = cli.session_file {
        settings.session_file = path;
    }
    info!(
        "Using API at {} (session file {:?})",
        settings.api_base_url, settings.session_file
    );

    let session = Session::from_file(&settings.session_file);
    let client = ApiClient::from_settings(&settings, session.clone())
        .context("Failed to build API client")?;
    let mut guard = RouteGuard::new();
    guard.resolve(&session);

    let mut shell = Shell {
        client,
        session,
        guard,
    };

    if let Some(route) = cli.command.route() {
        if !shell.admit(route) {
            bail!("Not signed in. Run `staffdesk login <email>` first.");
        }
    }

    match shell.run(cli.command).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_session_expired() => {
            warn!("Session rejected by the server, clearing it");
            shell.guard.logout(&shell.session)?;
            println!("Redirect -> {}", Route::Login);
            bail!("{}", e)
        }
        Err(e) => {
            error!("Command failed: {:?}", e);
            Err(e.into())
        }
    }
}

impl Shell {
    /// Runs the guard for a route; prints the redirect when access is denied.
    fn admit(&self, route: Route) -> bool {
        match self.guard.navigate(route) {
            Navigation::Render(_) => true,
            Navigation::Redirect { to, .. } => {
                println!("Redirect -> {}", to);
                false
            }
            Navigation::Pending => false,
        }
    }

    async fn run(&mut self, command: Command) -> staffdesk_core::Result<()> {
        match command {
            Command::Login { email, password } => self.login(&email, password).await,
            Command::Logout => {
                self.guard.logout(&self.session)?;
                println!("Signed out.");
                Ok(())
            }
            Command::Open { path } => self.open(&path).await,
            Command::Employees(cmd) => self.employees(cmd).await,
            Command::Permissions(cmd) => self.permissions(cmd).await,
            Command::Vacations(cmd) => self.vacations(cmd).await,
            Command::Logs(cmd) => self.logs(cmd).await,
        }
    }

    async fn login(&mut self, email: &str, password: Option<String>) -> staffdesk_core::Result<()> {
        let password = match password {
            Some(password) => password,
            None => prompt("Password: ")?,
        };
        let auth = AuthService::new(self.client.clone());
        let mut view = LoginView::new();
        match view.submit(&auth, &mut self.guard, email, &password).await {
            Navigation::Render(Route::Login) => {
                println!("{}", view.error().unwrap_or_default());
                Err(StaffdeskError::InvalidCredentials)
            }
            Navigation::Render(route) => {
                println!("Signed in as {}.", email);
                self.render(route).await
            }
            other => {
                println!("{:?}", other);
                Ok(())
            }
        }
    }

    async fn open(&mut self, path: &str) -> staffdesk_core::Result<()> {
        match self.guard.navigate_path(path) {
            None => {
                println!("Not found: {}", path);
                Ok(())
            }
            Some(Navigation::Render(route)) => self.render(route).await,
            Some(Navigation::Redirect { to, replace }) => {
                println!("Redirect -> {} (replace: {})", to, replace);
                Ok(())
            }
            Some(Navigation::Pending) => Ok(()),
        }
    }

    async fn render(&mut self, route: Route) -> staffdesk_core::Result<()> {
        match route {
            Route::Login => {
                println!("Use `staffdesk login <email>` to sign in.");
                Ok(())
            }
            Route::Dashboard => {
                let mut board = PermissionBoard::from_client(self.client.clone());
                let loaded = board.load().await;
                println!("StaffDesk dashboard");
                if let Some(user_id) = self.session.user_id()? {
                    println!("  Signed in as employee {}", user_id);
                }
                print_notifications(board.notifications());
                loaded?;
                println!("  Pending permission requests: {}", board.pending_count());
                Ok(())
            }
            Route::Employees => self.employees(EmployeeCommand::List).await,
            Route::Permissions => {
                self.permissions(PermissionCommand::List { pending: false })
                    .await
            }
            Route::Vacations => {
                self.vacations(VacationCommand::Show {
                    employee: None,
                    tab: TabArg::All,
                    sort: None,
                    desc: false,
                })
                .await
            }
            Route::Logs => self.logs(LogCommand::All).await,
        }
    }

    async fn employees(&mut self, cmd: EmployeeCommand) -> staffdesk_core::Result<()> {
        let service = EmployeeService::new(self.client.clone());
        let mut board = EmployeeBoard::new(service.clone());
        let result = match cmd {
            EmployeeCommand::List => board.load().await,
            EmployeeCommand::Show { id } => {
                let employee = service.get_by_id(&EntityId::from(id)).await?;
                println!("{}", serde_json::to_string_pretty(&employee)?);
                return Ok(());
            }
            EmployeeCommand::Add(fields) => board.save(&fields.into(), None).await,
            EmployeeCommand::Update { id, fields } => {
                let id = EntityId::from(id);
                board.save(&fields.into(), Some(&id)).await
            }
            EmployeeCommand::Delete { id } => board.delete(&EntityId::from(id)).await,
        };
        print_notifications(board.notifications());
        result?;

        for employee in board.employees() {
            println!(
                "{:<38} {:<28} {:<30} {}",
                employee.id,
                employee.display_name(),
                employee.email.as_deref().unwrap_or_default(),
                employee
                    .salary
                    .map(|salary| salary.to_string())
                    .unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn permissions(&mut self, cmd: PermissionCommand) -> staffdesk_core::Result<()> {
        let mut board = PermissionBoard::from_client(self.client.clone());

        // Submissions go straight to the backend; only listing and deciding
        // need the rows loaded first
        let (result, tab) = match cmd {
            PermissionCommand::Request { reason, begin, end } => {
                let draft = PermissionDraft {
                    reason,
                    begin_date: begin,
                    end_date: end,
                };
                let result = board.submit_request(&draft).await;
                print_notifications(board.notifications());
                return result;
            }
            PermissionCommand::Create {
                target,
                reason,
                begin,
                end,
            } => {
                let draft = OnBehalfDraft {
                    target_employee_id: EntityId::from(target),
                    reason,
                    begin_date: begin,
                    end_date: end,
                };
                let result = board.create_on_behalf(&draft).await;
                print_notifications(board.notifications());
                return result;
            }
            PermissionCommand::List { pending } => {
                let tab = if pending {
                    PermissionTab::Pending
                } else {
                    PermissionTab::All
                };
                (board.load().await, tab)
            }
            PermissionCommand::Approve { id } => {
                let result = match board.load().await {
                    Ok(()) => board.decide(&wire_id(&id), Decision::Approve).await,
                    Err(e) => Err(e),
                };
                (result, PermissionTab::All)
            }
            PermissionCommand::Reject { id } => {
                let result = match board.load().await {
                    Ok(()) => board.decide(&wire_id(&id), Decision::Reject).await,
                    Err(e) => Err(e),
                };
                (result, PermissionTab::All)
            }
        };
        print_notifications(board.notifications());
        result?;

        println!(
            "All: {}  Pending: {}",
            board.rows(PermissionTab::All).len(),
            board.pending_count()
        );
        for row in board.rows(tab) {
            println!(
                "#{:<6} {:<9} {:<24} -> {:<24} {:<44} {}",
                row.record.id,
                row.status_text,
                row.requester_name,
                row.target_name,
                row.period(),
                row.record.reason.as_deref().unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn vacations(&mut self, cmd: VacationCommand) -> staffdesk_core::Result<()> {
        let mut board = VacationBoard::from_client(self.client.clone());
        let (employee, tab, sort) = match &cmd {
            VacationCommand::Show {
                employee,
                tab,
                sort,
                desc,
            } => (employee.clone(), VacationTab::from(*tab), sort.map(|s| (s, *desc))),
            VacationCommand::Request { employee, .. }
            | VacationCommand::Approve { employee, .. }
            | VacationCommand::Reject { employee, .. } => (employee.clone(), VacationTab::All, None),
        };

        let employee = match employee {
            Some(id) => Some(id),
            None => self.session.user_id()?,
        };
        if let Some(id) = employee {
            board.select_employee(EntityId::from(id));
        }
        if let Some((key, desc)) = sort {
            board.sort_by(key.into());
            if desc {
                board.sort_by(key.into());
            }
        }

        let result = match cmd {
            VacationCommand::Show { .. } => board.refresh().await,
            // Posts without a prior fetch; the board refreshes afterwards
            VacationCommand::Request { start, end, .. } => {
                let draft = VacationDraft {
                    start_date: start,
                    end_date: end,
                };
                board.submit_request(&draft).await
            }
            VacationCommand::Approve { id, .. } => match board.refresh().await {
                Ok(()) => board.decide(&wire_id(&id), Decision::Approve).await,
                Err(e) => Err(e),
            },
            VacationCommand::Reject { id, .. } => match board.refresh().await {
                Ok(()) => board.decide(&wire_id(&id), Decision::Reject).await,
                Err(e) => Err(e),
            },
        };
        print_notifications(board.notifications());
        result?;

        println!("Days left: {}", board.days_left());
        for row in board.rows(tab) {
            println!(
                "#{:<6} {:<9} {} - {}  ({} days)",
                row.record.id,
                row.status_text,
                dates::format_display(row.record.start_date.as_ref()),
                dates::format_display(row.record.end_date.as_ref()),
                row.days
            );
        }
        Ok(())
    }

    async fn logs(&mut self, cmd: LogCommand) -> staffdesk_core::Result<()> {
        let service = LogService::new(self.client.clone());
        match cmd {
            LogCommand::Entry { action } => {
                let message = service.log_entry(&action).await?;
                println!("{}", message);
            }
            LogCommand::All => print_logs(&service.all_logs().await?),
            LogCommand::Employee { id } => {
                print_logs(&service.logs_by_employee(&EntityId::from(id)).await?)
            }
            LogCommand::Attendance { id } => print_attendance(
                &service
                    .attendance_by_employee(&EntityId::from(id))
                    .await?,
            ),
            LogCommand::Attendances => print_attendance(&service.all_attendances().await?),
        }
        Ok(())
    }
}

// Numeric ids typed on the command line compare equal to numeric wire ids
fn wire_id(raw: &str) -> EntityId {
    raw.trim()
        .parse::<i64>()
        .map(EntityId::from)
        .unwrap_or_else(|_| EntityId::from(raw.trim()))
}

fn prompt(label: &str) -> staffdesk_core::Result<String> {
    let io_error = |e: io::Error| StaffdeskError::Io {
        source: e,
        context: "Failed to read from terminal".to_string(),
    };
    print!("{}", label);
    io::stdout().flush().map_err(io_error)?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(io_error)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_notifications(notifications: &Notifications) {
    if let Some(message) = notifications.success() {
        println!("[ok] {}", message);
    }
    if let Some(message) = notifications.error() {
        println!("[error] {}", message);
    }
}

fn print_logs(logs: &[LogRecord]) {
    if logs.is_empty() {
        println!("No log entries.");
    }
    for log in logs {
        println!(
            "{:<20} {:<38} {}",
            dates::format_log_time(log.logged_at.as_ref(), true),
            log.employee_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            log.action.as_deref().unwrap_or("N/A")
        );
    }
}

fn print_attendance(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No attendance records.");
    }
    for record in records {
        println!(
            "{:<38} {:<10} in {:<19} out {:<19} {}",
            record
                .employee_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            dates::format_log_time(record.date.as_ref(), false),
            dates::format_log_time(record.check_in.as_ref(), true),
            dates::format_log_time(record.check_out.as_ref(), true),
            record
                .hours_worked
                .map(|hours| format!("{:.2} h", hours))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
}
