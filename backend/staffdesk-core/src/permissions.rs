// src/permissions.rs

use reqwest::Method;
use tracing::{info, warn};

use crate::api_client::{ApiClient, ApiRequest};
use crate::dates;
use crate::employees::{EmployeeDirectory, EmployeeService};
use crate::error::{Result, StaffdeskError};
use crate::models::{EntityId, OnBehalfDraft, PermissionDraft, PermissionRequest};
use crate::workflow::{self, warn_if_inverted, Decision, Notifications, RequestStatus};

const PERMISSION_API: &str = "Permission";

#[derive(Clone)]
pub struct PermissionService {
    client: ApiClient,
}

impl PermissionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn my_permissions(&self) -> Result<Vec<PermissionRequest>> {
        self.client
            .get(
                &format!("{}/MyPermissions", PERMISSION_API),
                "list permissions",
            )
            .await
    }

    pub async fn request_to_boss(&self, draft: &PermissionDraft) -> Result<()> {
        let request =
            ApiRequest::new(Method::POST, format!("{}/RequestToBoss", PERMISSION_API)).json(draft)?;
        self.client
            .send_expecting_success(request, "request permission")
            .await
    }

    pub async fn create_for_employee(&self, draft: &OnBehalfDraft) -> Result<()> {
        let request = ApiRequest::new(
            Method::POST,
            format!("{}/CreateForEmployee", PERMISSION_API),
        )
        .json(draft)?;
        self.client
            .send_expecting_success(request, "create permission for employee")
            .await
    }

    pub async fn update_status(&self, id: &EntityId, status: RequestStatus) -> Result<()> {
        let request = ApiRequest::new(Method::PUT, PERMISSION_API)
            .segment(id)
            .segment("status")
            .query("status", status.code())
            .json(&serde_json::json!({}))?;
        self.client
            .send_expecting_success(request, "update permission status")
            .await
    }
}

/// A permission as displayed: the record plus its status text and the
/// resolved requester/target names.
#[derive(Debug, Clone)]
pub struct PermissionRow {
    pub record: PermissionRequest,
    pub status_text: &'static str,
    pub requester_name: String,
    pub target_name: String,
}

impl PermissionRow {
    fn enrich(record: PermissionRequest, directory: &EmployeeDirectory) -> Self {
        Self {
            status_text: record.status.label(),
            requester_name: directory.display_name(record.requester_id.as_ref()),
            target_name: directory.display_name(record.target_employee_id.as_ref()),
            record,
        }
    }

    /// Approve/Reject are only offered while the row is pending.
    pub fn actions(&self) -> &'static [Decision] {
        workflow::available_actions(self.record.status)
    }

    pub fn period(&self) -> String {
        format!(
            "{} - {}",
            dates::format_display(self.record.begin_date.as_ref()),
            dates::format_display(self.record.end_date.as_ref())
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionTab {
    #[default]
    All,
    Pending,
}

/// Permission view state: the enriched list, a loading flag and the
/// snackbar notifications. Every mutation is followed by a full refresh.
pub struct PermissionBoard {
    permissions: PermissionService,
    employees: EmployeeService,
    directory: EmployeeDirectory,
    rows: Vec<PermissionRow>,
    loading: bool,
    notifications: Notifications,
}

impl PermissionBoard {
    pub fn new(permissions: PermissionService, employees: EmployeeService) -> Self {
        Self {
            permissions,
            employees,
            directory: EmployeeDirectory::default(),
            rows: Vec::new(),
            loading: false,
            notifications: Notifications::default(),
        }
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self::new(
            PermissionService::new(client.clone()),
            EmployeeService::new(client),
        )
    }

    pub fn rows(&self, tab: PermissionTab) -> Vec<&PermissionRow> {
        self.rows
            .iter()
            .filter(|row| match tab {
                PermissionTab::All => true,
                PermissionTab::Pending => row.record.status == RequestStatus::Pending,
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.rows(PermissionTab::Pending).len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self) {
        self.notifications.dismiss();
    }

    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    /// Initial load: permissions and employees are fetched concurrently and
    /// joined. If either fails the list is left empty.
    pub async fn load(&mut self) -> Result<()> {
        self.loading = true;
        let result = tokio::try_join!(self.permissions.my_permissions(), self.employees.get_all());
        self.loading = false;

        match result {
            Ok((permissions, employees)) => {
                self.directory = EmployeeDirectory::from_employees(&employees);
                self.rows = self.enrich(permissions);
                info!(
                    "Loaded {} permissions and {} employees",
                    self.rows.len(),
                    self.directory.len()
                );
                Ok(())
            }
            Err(e) => {
                self.rows.clear();
                self.directory = EmployeeDirectory::default();
                self.notifications
                    .set_error(e.user_message("Failed to fetch data. Please try again."));
                Err(e)
            }
        }
    }

    /// Re-fetches the list, reusing the employee lookup from the last load.
    /// On failure the previous rows stay in place.
    pub async fn refresh(&mut self) -> Result<()> {
        self.loading = true;
        let result = self.permissions.my_permissions().await;
        self.loading = false;

        match result {
            Ok(permissions) => {
                self.rows = self.enrich(permissions);
                Ok(())
            }
            Err(e) => {
                warn!("Permission refresh failed, keeping {} rows: {}", self.rows.len(), e);
                self.notifications
                    .set_error(e.user_message("Failed to refresh data. Please try again."));
                Err(e)
            }
        }
    }

    pub async fn submit_request(&mut self, draft: &PermissionDraft) -> Result<()> {
        warn_if_inverted(draft.begin_date, draft.end_date);
        if let Err(e) = self.permissions.request_to_boss(draft).await {
            self.notifications
                .set_error(e.user_message("Failed to submit request. Please try again."));
            return Err(e);
        }
        self.notifications
            .set_success("Permission request submitted successfully!");
        self.refresh().await
    }

    pub async fn create_on_behalf(&mut self, draft: &OnBehalfDraft) -> Result<()> {
        if draft.target_employee_id.is_blank() {
            let e = StaffdeskError::Validation("Target employee ID is required".to_string());
            self.notifications.set_error(e.user_message(""));
            return Err(e);
        }
        warn_if_inverted(draft.begin_date, draft.end_date);
        if let Err(e) = self.permissions.create_for_employee(draft).await {
            self.notifications
                .set_error(e.user_message("Failed to create permission. Please try again."));
            return Err(e);
        }
        self.notifications
            .set_success("Permission created successfully!");
        self.refresh().await
    }

    /// Approves or rejects a listed permission. The transition is checked
    /// against the row's current status before anything is sent.
    pub async fn decide(&mut self, id: &EntityId, decision: Decision) -> Result<()> {
        let current = match self.rows.iter().find(|row| &row.record.id == id) {
            Some(row) => row.record.status,
            None => {
                let e = StaffdeskError::UnknownRecord(id.to_string());
                self.notifications.set_error(e.user_message(""));
                return Err(e);
            }
        };
        let target = match workflow::transition(current, decision) {
            Ok(target) => target,
            Err(e) => {
                self.notifications.set_error(e.user_message(""));
                return Err(e);
            }
        };

        if let Err(e) = self.permissions.update_status(id, target).await {
            self.notifications
                .set_error(e.user_message("Failed to update status. Please try again."));
            return Err(e);
        }
        self.notifications.set_success(format!(
            "Permission {} successfully!",
            decision.past_tense()
        ));
        self.refresh().await
    }

    fn enrich(&self, permissions: Vec<PermissionRequest>) -> Vec<PermissionRow> {
        permissions
            .into_iter()
            .map(|record| PermissionRow::enrich(record, &self.directory))
            .collect()
    }
}
