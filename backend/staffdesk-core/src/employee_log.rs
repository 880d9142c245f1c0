// src/employee_log.rs

use reqwest::Method;
use tracing::info;

use crate::api_client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{AttendanceRecord, EntityId, LogEntryRequest, LogRecord};

const EMPLOYEE_LOG_API: &str = "EmployeeLog";

/// What a free-text clock action amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAction {
    Enter,
    Exit,
    Other,
}

impl ClockAction {
    /// Case-insensitive substring match; "enter"/"in" wins over "exit"/"out".
    pub fn classify(action: &str) -> Self {
        let action = action.to_lowercase();
        if action.contains("enter") || action.contains("in") {
            ClockAction::Enter
        } else if action.contains("exit") || action.contains("out") {
            ClockAction::Exit
        } else {
            ClockAction::Other
        }
    }

    pub fn confirmation(&self) -> &'static str {
        match self {
            ClockAction::Enter => "Successfully logged entry (Employee entered)",
            ClockAction::Exit => "Successfully logged exit (Employee exited)",
            ClockAction::Other => "Log entry successful",
        }
    }
}

#[derive(Clone)]
pub struct LogService {
    client: ApiClient,
}

impl LogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Records a clock action for the signed-in employee and returns the
    /// confirmation to show.
    pub async fn log_entry(&self, action: &str) -> Result<&'static str> {
        let body = LogEntryRequest {
            action: action.to_string(),
        };
        let request =
            ApiRequest::new(Method::POST, format!("{}/LogEntry", EMPLOYEE_LOG_API)).json(&body)?;
        self.client.send_expecting_success(request, "log entry").await?;

        let kind = ClockAction::classify(action);
        info!("Logged clock action '{}' as {:?}", action, kind);
        Ok(kind.confirmation())
    }

    pub async fn all_logs(&self) -> Result<Vec<LogRecord>> {
        self.client
            .get(&format!("{}/GetAllLogs", EMPLOYEE_LOG_API), "list all logs")
            .await
    }

    pub async fn logs_by_employee(&self, employee_id: &EntityId) -> Result<Vec<LogRecord>> {
        let request = ApiRequest::new(
            Method::GET,
            format!("{}/GetLogsByEmployeeId", EMPLOYEE_LOG_API),
        )
        .segment(employee_id);
        self.client
            .send_and_deserialize(request, "list employee logs")
            .await
    }

    pub async fn attendance_by_employee(
        &self,
        employee_id: &EntityId,
    ) -> Result<Vec<AttendanceRecord>> {
        let request = ApiRequest::new(
            Method::GET,
            format!("{}/GetAttendanceByEmployeeId", EMPLOYEE_LOG_API),
        )
        .segment(employee_id);
        self.client
            .send_and_deserialize(request, "employee attendance")
            .await
    }

    pub async fn all_attendances(&self) -> Result<Vec<AttendanceRecord>> {
        self.client
            .get(
                &format!("{}/GetAllEmployeesAttendances", EMPLOYEE_LOG_API),
                "all attendances",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_clock_actions() {
        assert_eq!(ClockAction::classify("Enter"), ClockAction::Enter);
        assert_eq!(ClockAction::classify("check-IN"), ClockAction::Enter);
        assert_eq!(ClockAction::classify("exit"), ClockAction::Exit);
        assert_eq!(ClockAction::classify("Clock out"), ClockAction::Exit);
        assert_eq!(ClockAction::classify("break"), ClockAction::Other);
        assert_eq!(
            ClockAction::Other.confirmation(),
            "Log entry successful"
        );
    }
}
