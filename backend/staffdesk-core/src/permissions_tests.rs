// src/permissions_tests.rs

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tokio::runtime::Runtime;

    use crate::error::StaffdeskError;
    use crate::models::{EntityId, OnBehalfDraft, PermissionDraft};
    use crate::permissions::{PermissionBoard, PermissionTab};
    use crate::test_support::signed_in_client;
    use crate::workflow::{Decision, RequestStatus};

    const MY_PERMISSIONS: &str = "GET Permission/MyPermissions";
    const ALL_EMPLOYEES: &str = "GET Employee/GetAllEmployees";

    fn permissions_json() -> Value {
        json!([
            {
                "id": 1,
                "requesterId": "e-1",
                "targetEmployeeId": "e-2",
                "reason": "Dentist",
                "beginDate": "2024-03-01T09:00:00",
                "endDate": "2024-03-01T12:00:00",
                "status": 0
            },
            {
                "id": 2,
                "requesterId": "e-2",
                "targetEmployeeId": "e-9",
                "reason": "Moving",
                "beginDate": "2024-02-10T00:00:00Z",
                "endDate": "2024-02-11T00:00:00Z",
                "status": 1
            }
        ])
    }

    fn employees_json() -> Value {
        json!([
            {"id": "e-1", "firstName": "Ada", "lastName": "Lovelace"},
            {"id": "e-2", "name": "Grace Hopper"}
        ])
    }

    fn loaded_board() -> (
        PermissionBoard,
        std::sync::Arc<crate::test_support::ScriptedTransport>,
        Runtime,
    ) {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.reply_ok(MY_PERMISSIONS, permissions_json());
        transport.reply_ok(ALL_EMPLOYEES, employees_json());
        let mut board = PermissionBoard::from_client(client);
        rt.block_on(board.load()).unwrap();
        (board, transport, rt)
    }

    #[test]
    fn test_load_enriches_rows_with_names() {
        let (board, transport, _rt) = loaded_board();

        let rows = board.rows(PermissionTab::All);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].requester_name, "Ada Lovelace");
        assert_eq!(rows[0].target_name, "Grace Hopper");
        assert_eq!(rows[0].status_text, "Pending");
        assert_eq!(rows[0].actions(), &[Decision::Approve, Decision::Reject]);
        // Unknown ids resolve to an empty name
        assert_eq!(rows[1].target_name, "");
        assert!(rows[1].actions().is_empty());

        assert_eq!(board.pending_count(), 1);
        assert_eq!(board.rows(PermissionTab::Pending)[0].record.id, EntityId::from(1));
        assert!(board.notifications().is_empty());
        assert!(transport
            .sent()
            .iter()
            .all(|r| r.bearer.as_deref() == Some("test-token")));
    }

    #[test]
    fn test_initial_load_failure_leaves_empty_list() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.reply_ok(MY_PERMISSIONS, permissions_json());
        transport.fail_network(ALL_EMPLOYEES);

        let mut board = PermissionBoard::from_client(client);
        assert!(rt.block_on(board.load()).is_err());
        assert!(board.rows(PermissionTab::All).is_empty());
        assert_eq!(
            board.notifications().error(),
            Some("Failed to fetch data. Please try again.")
        );
        assert!(!board.is_loading());
    }

    #[test]
    fn test_refresh_failure_keeps_previous_rows() {
        let (mut board, transport, rt) = loaded_board();
        transport.reply_json(MY_PERMISSIONS, 500, json!({}));

        assert!(rt.block_on(board.refresh()).is_err());
        assert_eq!(board.rows(PermissionTab::All).len(), 2);
        assert_eq!(
            board.notifications().error(),
            Some("Failed to refresh data. Please try again.")
        );

        board.dismiss();
        assert!(board.notifications().is_empty());
    }

    #[test]
    fn test_decide_sends_status_then_refreshes() {
        let (mut board, transport, rt) = loaded_board();
        transport.reply_ok("PUT Permission/1/status", json!({}));
        let mut refreshed = permissions_json();
        refreshed[0]["status"] = json!(1);
        transport.reply_ok(MY_PERMISSIONS, refreshed);

        rt.block_on(board.decide(&EntityId::from(1), Decision::Approve))
            .unwrap();

        let routes = transport.sent_routes();
        assert_eq!(
            &routes[2..],
            &[
                "PUT Permission/1/status".to_string(),
                MY_PERMISSIONS.to_string()
            ]
        );
        let put = &transport.sent()[2];
        assert_eq!(put.query, vec![("status".to_string(), "1".to_string())]);

        assert_eq!(
            board.notifications().success(),
            Some("Permission approved successfully!")
        );
        assert_eq!(board.pending_count(), 0);
        assert_eq!(board.rows(PermissionTab::All)[0].record.status, RequestStatus::Approved);
        // Names survive the refresh without refetching employees
        assert_eq!(board.rows(PermissionTab::All)[0].requester_name, "Ada Lovelace");
    }

    #[test]
    fn test_decide_on_terminal_row_is_rejected_locally() {
        let (mut board, transport, rt) = loaded_board();
        let before = transport.sent().len();

        let err = rt
            .block_on(board.decide(&EntityId::from(2), Decision::Reject))
            .unwrap_err();
        assert!(matches!(err, StaffdeskError::InvalidTransition { .. }));
        assert_eq!(transport.sent().len(), before, "No request should be sent");
        assert!(board.notifications().error().is_some());

        let err = rt
            .block_on(board.decide(&EntityId::from(77), Decision::Approve))
            .unwrap_err();
        assert!(matches!(err, StaffdeskError::UnknownRecord(_)));
        assert_eq!(transport.sent().len(), before);
    }

    #[test]
    fn test_decide_failure_surfaces_backend_message() {
        let (mut board, transport, rt) = loaded_board();
        transport.reply_json(
            "PUT Permission/1/status",
            403,
            json!({"message": "Only the boss can decide"}),
        );

        assert!(rt
            .block_on(board.decide(&EntityId::from(1), Decision::Reject))
            .is_err());
        assert_eq!(
            board.notifications().error(),
            Some("Only the boss can decide")
        );
        assert_eq!(board.pending_count(), 1);
    }

    #[test]
    fn test_submit_request_posts_draft_and_refreshes() {
        let (mut board, transport, rt) = loaded_board();
        transport.reply_ok("POST Permission/RequestToBoss", json!({}));
        transport.reply_ok(MY_PERMISSIONS, permissions_json());

        let draft = PermissionDraft {
            reason: "Doctor".to_string(),
            begin_date: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
        };
        rt.block_on(board.submit_request(&draft)).unwrap();

        let post = transport
            .sent()
            .into_iter()
            .find(|r| r.path() == "Permission/RequestToBoss")
            .unwrap();
        assert_eq!(
            post.body,
            Some(json!({
                "reason": "Doctor",
                "beginDate": "2024-05-02T08:00:00.000Z",
                "endDate": "2024-05-02T10:00:00.000Z"
            }))
        );
        assert_eq!(
            board.notifications().success(),
            Some("Permission request submitted successfully!")
        );
        assert_eq!(transport.sent_routes().last().map(String::as_str), Some(MY_PERMISSIONS));
    }

    #[test]
    fn test_submit_request_without_prior_load() {
        let rt = Runtime::new().unwrap();
        let (client, transport) = signed_in_client();
        transport.fail_network(ALL_EMPLOYEES);
        transport.reply_ok("POST Permission/RequestToBoss", json!({}));
        transport.reply_ok(MY_PERMISSIONS, permissions_json());

        let mut board = PermissionBoard::from_client(client);
        let draft = PermissionDraft {
            reason: "Doctor".to_string(),
            begin_date: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
        };
        rt.block_on(board.submit_request(&draft)).unwrap();

        assert_eq!(
            transport.sent_routes(),
            vec!["POST Permission/RequestToBoss".to_string(), MY_PERMISSIONS.to_string()]
        );
        assert_eq!(
            board.notifications().success(),
            Some("Permission request submitted successfully!")
        );
        assert_eq!(board.notifications().error(), None);
        assert_eq!(board.rows(PermissionTab::All).len(), 2);
    }

    #[test]
    fn test_create_on_behalf_requires_target() {
        let (mut board, transport, rt) = loaded_board();
        let before = transport.sent().len();

        let draft = OnBehalfDraft {
            target_employee_id: EntityId::from(" "),
            reason: "Sick".to_string(),
            begin_date: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap(),
        };
        let err = rt.block_on(board.create_on_behalf(&draft)).unwrap_err();
        assert!(matches!(err, StaffdeskError::Validation(_)));
        assert_eq!(
            board.notifications().error(),
            Some("Target employee ID is required")
        );
        assert_eq!(transport.sent().len(), before);
    }

    #[test]
    fn test_create_on_behalf_succeeds() {
        let (mut board, transport, rt) = loaded_board();
        transport.reply_ok("POST Permission/CreateForEmployee", json!({}));
        transport.reply_ok(MY_PERMISSIONS, permissions_json());

        let draft = OnBehalfDraft {
            target_employee_id: EntityId::from("e-2"),
            reason: "Sick".to_string(),
            begin_date: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap(),
        };
        rt.block_on(board.create_on_behalf(&draft)).unwrap();
        assert_eq!(
            board.notifications().success(),
            Some("Permission created successfully!")
        );
    }
}
