// src/vacations.rs

use reqwest::Method;
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::api_client::{ApiClient, ApiRequest};
use crate::error::{Result, StaffdeskError};
use crate::models::{EntityId, VacationDecision, VacationDraft, VacationRequest};
use crate::workflow::{self, warn_if_inverted, Decision, Notifications, RequestStatus};

const VACATION_API: &str = "vacation";

#[derive(Clone)]
pub struct VacationService {
    client: ApiClient,
}

impl VacationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Remaining vacation days, rounded to the nearest whole day.
    pub async fn days_left(&self, employee_id: &EntityId) -> Result<i64> {
        let request = ApiRequest::new(Method::GET, VACATION_API)
            .segment(employee_id)
            .segment("left");
        let days: f64 = self
            .client
            .send_and_deserialize(request, "vacation days left")
            .await?;
        Ok(days.round() as i64)
    }

    pub async fn requests(&self, employee_id: &EntityId) -> Result<Vec<VacationRequest>> {
        let request = ApiRequest::new(Method::GET, VACATION_API)
            .segment(employee_id)
            .segment("requests");
        self.client
            .send_and_deserialize(request, "list vacation requests")
            .await
    }

    pub async fn request(&self, employee_id: &EntityId, draft: &VacationDraft) -> Result<()> {
        let request = ApiRequest::new(Method::POST, VACATION_API)
            .segment(employee_id)
            .segment("request")
            .json(draft)?;
        self.client
            .send_expecting_success(request, "request vacation")
            .await
    }

    pub async fn approve_or_reject(&self, decision: &VacationDecision) -> Result<()> {
        let request = ApiRequest::new(
            Method::PUT,
            format!("{}/approve-or-reject", VACATION_API),
        )
        .json(decision)?;
        self.client
            .send_expecting_success(request, "decide vacation request")
            .await
    }
}

#[derive(Debug, Clone)]
pub struct VacationRow {
    pub record: VacationRequest,
    pub status_text: &'static str,
    pub days: i64,
}

impl VacationRow {
    fn from_record(record: VacationRequest) -> Self {
        Self {
            status_text: record.status.label(),
            days: record.days(),
            record,
        }
    }

    pub fn actions(&self) -> &'static [Decision] {
        workflow::available_actions(self.record.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VacationTab {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl VacationTab {
    fn admits(&self, status: RequestStatus) -> bool {
        match self {
            VacationTab::All => true,
            VacationTab::Pending => status == RequestStatus::Pending,
            VacationTab::Approved => status == RequestStatus::Approved,
            VacationTab::Rejected => status == RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    StartDate,
    Status,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::StartDate,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    /// Choosing the active key while ascending flips to descending; any
    /// other choice starts ascending.
    pub fn select(&mut self, key: SortKey) {
        self.direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.key = key;
    }

    fn compare(&self, a: &VacationRow, b: &VacationRow) -> Ordering {
        let ordering = match self.key {
            SortKey::StartDate => a.record.start_date.cmp(&b.record.start_date),
            SortKey::Status => a.record.status.code().cmp(&b.record.status.code()),
            SortKey::Days => a.days.cmp(&b.days),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Vacation view state for one selected employee.
pub struct VacationBoard {
    service: VacationService,
    employee_id: Option<EntityId>,
    rows: Vec<VacationRow>,
    days_left: i64,
    loaded: bool,
    loading: bool,
    sort: SortConfig,
    notifications: Notifications,
}

impl VacationBoard {
    pub fn new(service: VacationService) -> Self {
        Self {
            service,
            employee_id: None,
            rows: Vec::new(),
            days_left: 0,
            loaded: false,
            loading: false,
            sort: SortConfig::default(),
            notifications: Notifications::default(),
        }
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self::new(VacationService::new(client))
    }

    pub fn employee_id(&self) -> Option<&EntityId> {
        self.employee_id.as_ref()
    }

    /// Switches to another employee; the next fetch counts as an initial load.
    pub fn select_employee(&mut self, employee_id: EntityId) {
        if self.employee_id.as_ref() != Some(&employee_id) {
            self.loaded = false;
        }
        self.employee_id = Some(employee_id);
    }

    pub fn days_left(&self) -> i64 {
        self.days_left
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.sort.select(key);
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self) {
        self.notifications.dismiss();
    }

    /// Rows for a tab, in the current sort order.
    pub fn rows(&self, tab: VacationTab) -> Vec<&VacationRow> {
        let mut rows: Vec<&VacationRow> = self
            .rows
            .iter()
            .filter(|row| tab.admits(row.record.status))
            .collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
    }

    fn selected(&self) -> Result<EntityId> {
        self.employee_id
            .clone()
            .filter(|id| !id.is_blank())
            .ok_or_else(|| StaffdeskError::Validation("Employee ID is required".to_string()))
    }

    /// Fetches balance and requests together. A failed first load leaves
    /// an empty list and a zero balance; a failed reload keeps what was shown.
    pub async fn refresh(&mut self) -> Result<()> {
        let employee_id = match self.selected() {
            Ok(id) => id,
            Err(e) => {
                self.notifications.set_error(e.user_message(""));
                return Err(e);
            }
        };

        self.loading = true;
        let result = tokio::try_join!(
            self.service.days_left(&employee_id),
            self.service.requests(&employee_id)
        );
        self.loading = false;

        match result {
            Ok((days_left, requests)) => {
                self.days_left = days_left;
                self.rows = requests.into_iter().map(VacationRow::from_record).collect();
                self.loaded = true;
                info!(
                    "Loaded {} vacation requests for employee {} ({} days left)",
                    self.rows.len(),
                    employee_id,
                    self.days_left
                );
                Ok(())
            }
            Err(e) => {
                if self.loaded {
                    warn!("Vacation refresh failed, keeping {} rows: {}", self.rows.len(), e);
                } else {
                    self.rows.clear();
                    self.days_left = 0;
                }
                self.notifications
                    .set_error(e.user_message("Failed to fetch vacation data"));
                Err(e)
            }
        }
    }

    pub async fn submit_request(&mut self, draft: &VacationDraft) -> Result<()> {
        let employee_id = match self.selected() {
            Ok(id) => id,
            Err(e) => {
                self.notifications.set_error(e.user_message(""));
                return Err(e);
            }
        };
        warn_if_inverted(draft.start_date, draft.end_date);

        if let Err(e) = self.service.request(&employee_id, draft).await {
            self.notifications
                .set_error(e.user_message("Failed to create vacation request"));
            return Err(e);
        }
        self.notifications
            .set_success("Vacation request created successfully!");
        self.refresh().await
    }

    pub async fn decide(&mut self, id: &EntityId, decision: Decision) -> Result<()> {
        let (record_id, current) = match self.rows.iter().find(|row| &row.record.id == id) {
            Some(row) => (row.record.id.clone(), row.record.status),
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

        // The wire id keeps the form the backend sent it in
        let body = VacationDecision {
            vacation_request_id: record_id,
            status: target,
        };
        if let Err(e) = self.service.approve_or_reject(&body).await {
            self.notifications
                .set_error(e.user_message("Failed to update vacation status"));
            return Err(e);
        }
        self.notifications.set_success(format!(
            "Vacation request {} successfully!",
            decision.past_tense()
        ));
        self.refresh().await
    }
}
