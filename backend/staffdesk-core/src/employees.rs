// src/employees.rs

use reqwest::Method;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::{info, warn};

use crate::api_client::{ApiClient, ApiRequest};
use crate::error::{Result, StaffdeskError};
use crate::models::{Employee, EmployeeInput, EntityId};
use crate::workflow::Notifications;

const EMPLOYEE_API: &str = "Employee";

#[derive(Clone)]
pub struct EmployeeService {
    client: ApiClient,
}

impl EmployeeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Employee>> {
        self.client
            .get(&format!("{}/GetAllEmployees", EMPLOYEE_API), "list employees")
            .await
    }

    pub async fn get_by_id(&self, id: &EntityId) -> Result<Employee> {
        let request =
            ApiRequest::new(Method::GET, format!("{}/GetEmployeeById", EMPLOYEE_API)).segment(id);
        self.client
            .send_and_deserialize(request, "get employee")
            .await
    }

    pub async fn add(&self, input: &EmployeeInput) -> Result<()> {
        let request =
            ApiRequest::new(Method::POST, format!("{}/AddEmployee", EMPLOYEE_API)).json(input)?;
        self.client
            .send_expecting_success(request, "add employee")
            .await
    }

    pub async fn update(&self, id: &EntityId, input: &EmployeeInput) -> Result<()> {
        let request = ApiRequest::new(Method::PUT, format!("{}/UpdateEmployee", EMPLOYEE_API))
            .segment(id)
            .json(input)?;
        self.client
            .send_expecting_success(request, "update employee")
            .await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<()> {
        let request =
            ApiRequest::new(Method::DELETE, format!("{}/DeleteEmployee", EMPLOYEE_API)).segment(id);
        self.client
            .send_expecting_success(request, "delete employee")
            .await
    }
}

/// Employees keyed by id, used to put names on request rows. Rebuilt from
/// scratch on every fetch.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    by_id: HashMap<EntityId, Employee>,
}

impl EmployeeDirectory {
    pub fn from_employees(employees: &[Employee]) -> Self {
        let by_id = employees
            .iter()
            .map(|employee| (employee.id.clone(), employee.clone()))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Employee> {
        self.by_id.get(id)
    }

    /// Display name for an id; empty when the id is absent or unknown.
    pub fn display_name(&self, id: Option<&EntityId>) -> String {
        id.and_then(|id| self.by_id.get(id))
            .map(Employee::display_name)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Raw form fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub salary: String,
    pub password: String,
    pub role_id: String,
    pub boss_id: String,
    pub shift_id: String,
}

pub type FieldErrors = BTreeMap<&'static str, &'static str>;

impl EmployeeForm {
    /// Pre-fills the form for editing. The password is never pre-filled.
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            name: employee.name.clone().unwrap_or_default(),
            email: employee.email.clone().unwrap_or_default(),
            phone: employee.phone.clone().unwrap_or_default(),
            salary: employee.salary.map(|s| s.to_string()).unwrap_or_default(),
            password: String::new(),
            role_id: employee
                .employee_role_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            boss_id: employee
                .boss_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            shift_id: employee
                .employee_shift_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self, is_edit: bool) -> std::result::Result<EmployeeInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required");
        }
        let salary = Decimal::from_str(self.salary.trim()).ok();
        if salary.is_none() {
            errors.insert("salary", "Valid salary is required");
        }
        if !is_edit && self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        let role_id = parse_leading_int(&self.role_id);
        if role_id.is_none() {
            errors.insert("roleId", "Role ID is required");
        }
        if self.boss_id.trim().is_empty() {
            errors.insert("bossId", "Boss ID is required");
        }
        let shift_id = parse_leading_int(&self.shift_id);
        if shift_id.is_none() {
            errors.insert("shiftId", "Shift ID is required");
        }

        match (salary, role_id, shift_id) {
            (Some(salary), Some(role_id), Some(shift_id)) if errors.is_empty() => Ok(EmployeeInput {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: Some(self.phone.trim().to_string()).filter(|p| !p.is_empty()),
                salary,
                password: self.password.clone(),
                role_id,
                boss_id: self.boss_id.trim().to_string(),
                shift_id,
            }),
            _ => Err(errors),
        }
    }
}

// Integer prefix of the input ("12abc" -> 12), as number inputs coerce them
fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

/// Employee list view state.
pub struct EmployeeBoard {
    service: EmployeeService,
    employees: Vec<Employee>,
    notifications: Notifications,
}

impl EmployeeBoard {
    pub fn new(service: EmployeeService) -> Self {
        Self {
            service,
            employees: Vec::new(),
            notifications: Notifications::default(),
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self) {
        self.notifications.dismiss();
    }

    pub async fn load(&mut self) -> Result<()> {
        match self.service.get_all().await {
            Ok(employees) => {
                info!("Loaded {} employees", employees.len());
                self.employees = employees;
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .set_error(e.user_message("Failed to fetch employees"));
                Err(e)
            }
        }
    }

    /// Validates and submits the form. `editing` carries the id of the
    /// employee being updated; `None` adds a new one. The list is re-fetched
    /// afterwards.
    pub async fn save(&mut self, form: &EmployeeForm, editing: Option<&EntityId>) -> Result<()> {
        let input = match form.validate(editing.is_some()) {
            Ok(input) => input,
            Err(errors) => {
                let message = errors.values().copied().collect::<Vec<_>>().join(", ");
                self.notifications.set_error(message.clone());
                return Err(StaffdeskError::Validation(message));
            }
        };

        let (result, verb) = match editing {
            Some(id) => (self.service.update(id, &input).await, "update"),
            None => (self.service.add(&input).await, "add"),
        };

        match result {
            Ok(()) => {
                let past = if editing.is_some() { "updated" } else { "added" };
                self.notifications
                    .set_success(format!("Employee {} successfully", past));
                self.load().await
            }
            Err(e) => {
                self.notifications
                    .set_error(e.user_message(&format!("Failed to {} employee", verb)));
                Err(e)
            }
        }
    }

    /// Deletes an employee and drops the row locally on success.
    pub async fn delete(&mut self, id: &EntityId) -> Result<()> {
        match self.service.delete(id).await {
            Ok(()) => {
                self.employees.retain(|employee| &employee.id != id);
                self.notifications.set_success("Employee deleted successfully");
                Ok(())
            }
            Err(e) => {
                warn!("Delete of employee {} failed: {}", id, e);
                let detail = e
                    .backend_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                self.notifications
                    .set_error(format!("Delete failed: {}", detail));
                Err(e)
            }
        }
    }
}
