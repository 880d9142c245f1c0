// src/employees_tests.rs

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio::runtime::Runtime;

    use crate::employees::{EmployeeBoard, EmployeeDirectory, EmployeeForm, EmployeeService};
    use crate::error::StaffdeskError;
    use crate::models::{Employee, EntityId};
    use crate::test_support::signed_in_client;

    const ALL_EMPLOYEES: &str = "GET Employee/GetAllEmployees";

    fn filled_form() -> EmployeeForm {
        EmployeeForm {
            name: " Ada Lovelace ".to_string(),
            email: "ada@example.com".to_string(),
            phone: "".to_string(),
            salary: "4200.50".to_string(),
            password: "secret".to_string(),
            role_id: "2".to_string(),
            boss_id: "boss-1".to_string(),
            shift_id: "3".to_string(),
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = EmployeeForm::default().validate(false).unwrap_err();
        assert_eq!(errors.get("name"), Some(&"Name is required"));
        assert_eq!(errors.get("email"), Some(&"Email is required"));
        assert_eq!(errors.get("salary"), Some(&"Valid salary is required"));
        assert_eq!(errors.get("password"), Some(&"Password is required"));
        assert_eq!(errors.get("roleId"), Some(&"Role ID is required"));
        assert_eq!(errors.get("bossId"), Some(&"Boss ID is required"));
        assert_eq!(errors.get("shiftId"), Some(&"Shift ID is required"));
    }

    #[test]
    fn test_password_optional_when_editing() {
        let mut form = filled_form();
        form.password.clear();
        assert!(form.validate(false).is_err());

        let input = form.validate(true).unwrap();
        assert_eq!(input.name, "Ada Lovelace");
        assert_eq!(input.salary, dec!(4200.50));
        assert_eq!(input.role_id, 2);
        assert_eq!(input.shift_id, 3);
        assert_eq!(input.phone, None);
    }

    #[test]
    fn test_numeric_fields_take_leading_digits() {
        let mut form = filled_form();
        form.role_id = "12abc".to_string();
        form.salary = "abc".to_string();
        let errors = form.validate(false).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("salary"));

        form.salary = "100".to_string();
        assert_eq!(form.validate(false).unwrap().role_id, 12);
    }

    #[test]
    fn test_input_serializes_salary_as_number() {
        let input = filled_form().validate(false).unwrap();
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["salary"], json!(4200.5));
        assert_eq!(value["roleId"], json!(2));
        assert_eq!(value["bossId"], json!("boss-1"));
    }

    #[test]
    fn test_edit_form_prefill_skips_password() {
        let employee: Employee = serde_json::from_value(json!({
            "id": "e-1",
            "name": "Ada",
            "email": "ada@example.com",
            "salary": 3000,
            "employeeRoleId": 1,
            "bossId": "b-1",
            "employeeShiftId": 4
        }))
        .unwrap();
        let form = EmployeeForm::from_employee(&employee);
        assert_eq!(form.name, "Ada");
        assert_eq!(form.salary, "3000");
        assert_eq!(form.boss_id, "b-1");
        assert_eq!(form.shift_id, "4");
        assert!(form.password.is_empty());
    }

    #[test]
    fn test_directory_display_names() {
        let employees: Vec<Employee> = serde_json::from_value(json!([
            {"id": 1, "firstName": "Ada", "lastName": ""},
            {"id": "2", "name": "  Grace  "}
        ]))
        .unwrap();
        let directory = EmployeeDirectory::from_employees(&employees);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.display_name(Some(&EntityId::from(1))), "Ada");
        // Numeric and textual ids compare by value
        assert_eq!(directory.display_name(Some(&EntityId::from(2))), "Grace");
        assert_eq!(directory.display_name(Some(&EntityId::from("x"))), "");
        assert_eq!(directory.display_name(None), "");
    }

    #[test]
    fn test_delete_removes_row_locally() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.reply_ok(
            ALL_EMPLOYEES,
            json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Grace"}]),
        );
        transport.reply_ok("DELETE Employee/DeleteEmployee/1", json!({}));

        let mut board = EmployeeBoard::new(EmployeeService::new(client));
        rt.block_on(board.load()).unwrap();
        rt.block_on(board.delete(&EntityId::from(1))).unwrap();

        assert_eq!(board.employees().len(), 1);
        assert_eq!(board.employees()[0].id, EntityId::from(2));
        assert_eq!(
            board.notifications().success(),
            Some("Employee deleted successfully")
        );
        // No reload after a delete
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn test_delete_failure_message() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.reply_json(
            "DELETE Employee/DeleteEmployee/5",
            409,
            json!({"message": "Employee has open requests"}),
        );

        let mut board = EmployeeBoard::new(EmployeeService::new(client));
        assert!(rt.block_on(board.delete(&EntityId::from(5))).is_err());
        assert_eq!(
            board.notifications().error(),
            Some("Delete failed: Employee has open requests")
        );
    }

    #[test]
    fn test_save_invalid_form_sends_nothing() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        let mut board = EmployeeBoard::new(EmployeeService::new(client));

        let err = rt
            .block_on(board.save(&EmployeeForm::default(), None))
            .unwrap_err();
        assert!(matches!(err, StaffdeskError::Validation(_)));
        assert!(transport.sent().is_empty());

        let shown = board.notifications().error().unwrap();
        assert!(shown.contains("Name is required"), "{}", shown);
        assert!(shown.contains("Shift ID is required"), "{}", shown);
        assert_eq!(err.user_message(""), shown);
    }

    #[test]
    fn test_update_puts_then_reloads() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.reply_ok("PUT Employee/UpdateEmployee/e-7", json!({}));
        transport.reply_ok(ALL_EMPLOYEES, json!([{"id": "e-7", "name": "Ada"}]));

        let mut board = EmployeeBoard::new(EmployeeService::new(client));
        let editing = EntityId::from("e-7");
        rt.block_on(board.save(&filled_form(), Some(&editing))).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::PUT);
        assert_eq!(sent[1].path(), "Employee/GetAllEmployees");
        assert_eq!(
            board.notifications().success(),
            Some("Employee updated successfully")
        );
        assert_eq!(board.employees().len(), 1);
    }
}
