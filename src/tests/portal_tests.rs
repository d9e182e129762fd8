use axum::http::{header, Method, StatusCode};
use serde_json::json;

use super::helpers::*;
use crate::repository::Repository;

const PRODUCTION_FORM: &[(&str, &str)] = &[
    ("Date", "2025-07-10"),
    ("Shift", "Morning"),
    ("Component_Name", "Wing Bracket"),
    ("Project_Name", "A320 Retrofit"),
    ("Total_Machined_Quantity", "100"),
    ("Total_Finished_Quantity", "90"),
    ("Total_Rejection_Quantity", "0"),
    ("Rejection_Reason", ""),
    ("Operator_Name", "Lin"),
];

fn employee_json(name: &str) -> serde_json::Value {
    json!({
        "Name": name,
        "Email": format!("{}@aero.example", name.to_lowercase()),
        "Departrment": "Engineering",
        "Position": "Machinist",
        "Phone": "555-0100",
        "Status": "Active"
    })
}

#[tokio::test]
async fn portals_redirect_to_login_without_a_session() {
    let (app, _) = test_app();

    for uri in ["/dashboard", "/employee", "/production", "/analytics"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(header_value(&response, header::LOCATION), "/login");
    }
}

#[tokio::test]
async fn valid_login_sets_the_session_and_lands_on_the_dashboard() {
    let (app, _) = test_app();

    let response = send(
        &app,
        form("/login", None, &[("username", "admin"), ("password", "admin123")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/dashboard");

    let cookies = set_cookies(&response);
    assert!(cookies.contains("aero_user="));
    assert!(cookies.contains("aero_flash="));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = test_app();

    let response = send(
        &app,
        form("/login", None, &[("username", "admin"), ("password", "nope")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("Invalid username or password"));
}

#[tokio::test]
async fn username_with_surrounding_space_is_not_accepted() {
    let (app, _) = test_app();

    let response = send(
        &app,
        form("/login", None, &[("username", " admin"), ("password", "admin123")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!set_cookies(&response).contains("aero_user="));
}

#[tokio::test]
async fn unsigned_session_cookie_is_ignored() {
    let (app, _) = test_app();
    let forged = forged_session("mallory", "admin");

    for uri in ["/dashboard", "/employee", "/analytics"] {
        let response = send(&app, get(uri, Some(&forged))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(header_value(&response, header::LOCATION), "/login");
    }
}

#[tokio::test]
async fn session_cookie_from_another_instance_is_ignored() {
    let (app, _) = test_app();
    let (other, _) = test_app();
    let foreign = admin(&other).await;

    let response = send(&app, get("/employee", Some(&foreign))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&other, get("/employee", Some(&foreign))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn blank_login_fields_are_rejected() {
    let (app, _) = test_app();

    let response = send(&app, form("/login", None, &[("username", ""), ("password", "")])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Please fill in all fields"));
}

#[tokio::test]
async fn registration_reports_mismatched_passwords() {
    let (app, _) = test_app();

    let response = send(
        &app,
        form(
            "/register",
            None,
            &[
                ("username", "operator"),
                ("email", "operator@aero.example"),
                ("password", "secret1"),
                ("confirm_password", "secret2"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Passwords do not match"));
}

#[tokio::test]
async fn password_reset_request_needs_an_email() {
    let (app, _) = test_app();

    let response = send(&app, get("/verification", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Back to Login"));

    let response = send(&app, form("/verification", None, &[("email", "  ")])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = body_text(response).await;
    assert!(page.contains("Email Required"));
    assert!(page.contains("Please enter your email address"));
}

#[tokio::test]
async fn password_reset_request_confirms_the_address() {
    let (app, _) = test_app();

    let response = send(
        &app,
        form("/verification", None, &[("email", "lin@aero.example")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("Verification Email Sent"));
    assert!(page.contains("Please check your email for password reset instructions"));
    assert!(page.contains("Email sent to: lin@aero.example"));
    assert!(page.contains("Back to Login"));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (app, _) = test_app();
    let admin = admin(&app).await;

    let response = send(&app, form("/logout", Some(&admin), &[])).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/login");
    assert!(set_cookies(&response)
        .lines()
        .any(|c| c.starts_with("aero_user=") && c.contains("Max-Age=0")));

    let response = send(&app, get("/dashboard", None)).await;
    assert_eq!(header_value(&response, header::LOCATION), "/login");
}

#[tokio::test]
async fn dashboard_lists_only_the_portals_a_guest_may_use() {
    let (app, _) = test_app();
    let guest = guest(&app).await;

    let response = send(&app, get("/dashboard", Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("Production Portal"));
    assert!(page.contains("Attendance Portal"));
    assert!(!page.contains("Employee Portal"));
    assert!(!page.contains("Raw Materials Portal"));
}

#[tokio::test]
async fn guest_is_forbidden_from_admin_portals() {
    let (app, _) = test_app();
    let guest = guest(&app).await;

    for uri in ["/employee", "/toolstocks", "/rawmaterials"] {
        let response = send(&app, get(uri, Some(&guest))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn guest_cannot_open_analytics() {
    let (app, _) = test_app();
    let guest = guest(&app).await;

    for uri in ["/analytics", "/production?tab=analytics"] {
        let response = send(&app, get(uri, Some(&guest))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
        assert!(body_text(response).await.contains("access to analytics features"));
    }
}

#[tokio::test]
async fn guest_can_add_production_but_not_edit_or_delete() {
    let (app, repos) = test_app();
    let guest = guest(&app).await;

    let response = send(&app, get("/production", Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, form("/production", Some(&guest), PRODUCTION_FORM)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/production");
    assert_eq!(repos.production.list().await.unwrap().len(), 1);

    let response = send(&app, get("/production/1/edit", Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, form("/production/1/delete", Some(&guest), &[])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(repos.production.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn admin_form_submission_creates_and_flashes() {
    let (app, repos) = test_app();
    let admin = admin(&app).await;

    let response = send(
        &app,
        form(
            "/toolstocks",
            Some(&admin),
            &[
                ("Tool_Name", "Torque Wrench"),
                ("Tool_ID", "TW-01"),
                ("Category", "Hand Tools"),
                ("Quantity", "4"),
                ("Location", "Bay 2"),
                ("Minimum_Stock", "2"),
                ("Maximum_Stock", ""),
                ("Supplier", "Snap Supply"),
                ("Status", "Available"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/toolstocks");
    assert!(set_cookies(&response).contains("aero_flash="));

    let stored = repos.tool_stocks.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].fields.maximum_stock, 6);
}

#[tokio::test]
async fn invalid_form_is_shown_again_with_the_error() {
    let (app, repos) = test_app();
    let admin = admin(&app).await;

    let mut pairs = PRODUCTION_FORM.to_vec();
    pairs.retain(|(k, _)| *k != "Total_Machined_Quantity");
    pairs.push(("Total_Machined_Quantity", "abc"));

    let response = send(&app, form("/production", Some(&admin), &pairs)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = body_text(response).await;
    assert!(page.contains("Total_Machined_Quantity must be a whole number"));
    assert!(page.contains("Wing Bracket"));
    assert!(repos.production.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_form_for_unknown_record_is_not_found() {
    let (app, _) = test_app();
    let admin = admin(&app).await;

    let response = send(&app, get("/employee/42/edit", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_delete_removes_and_redirects() {
    let (app, repos) = test_app();
    let admin = admin(&app).await;
    send(&app, json_request(Method::POST, "/api/employees", &employee_json("Ada"))).await;

    let response = send(&app, form("/employee/1/delete", Some(&admin), &[])).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/employee");
    assert!(repos.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_search_narrows_the_rows() {
    let (app, _) = test_app();
    let admin = admin(&app).await;
    for name in ["Ada", "Grace"] {
        send(&app, json_request(Method::POST, "/api/employees", &employee_json(name))).await;
    }

    let response = send(&app, get("/employee?search=gra", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("grace@aero.example"));
    assert!(!page.contains("ada@aero.example"));
}

#[tokio::test]
async fn admin_sees_portal_analytics() {
    let (app, _) = test_app();
    let admin = admin(&app).await;
    send(&app, json_request(Method::POST, "/api/employees", &employee_json("Ada"))).await;

    let response = send(&app, get("/employee?tab=analytics", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Active employees"));

    let response = send(&app, get("/analytics", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn oversized_cost_is_rejected_and_analytics_still_render() {
    let (app, repos) = test_app();
    let admin = admin(&app).await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/rawmaterials",
            &json!({
                "Marterial_Name": "Titanium Sheet",
                "Material_Code": "TI-64",
                "Category": "Metals",
                "Quantity": 2,
                "Unit": "sheets",
                "Minimum_Stock": 1,
                "Maximum_Stock": 10,
                "Supplier": "Alloy Works",
                "Cost_Per_Unit": "79228162514264337593543950335",
                "Status": "In Stock"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "Cost_Per_Unit");
    assert!(repos.raw_materials.list().await.unwrap().is_empty());

    for uri in ["/rawmaterials?tab=analytics", "/analytics"] {
        let response = send(&app, get(uri, Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn uploads_accept_documents_only() {
    let (app, repos) = test_app();
    let admin = admin(&app).await;

    let response = send(
        &app,
        file_upload("/rawmaterials/upload", &admin, "photo.png", "image/png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_text(response)
        .await
        .contains("Please upload a PDF, DOC, or Excel file."));

    let response = send(
        &app,
        file_upload("/rawmaterials/upload", &admin, "stock.pdf", "application/pdf"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&response, header::LOCATION), "/rawmaterials");
    assert!(repos.raw_materials.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn guest_cannot_upload() {
    let (app, _) = test_app();
    let guest = guest(&app).await;

    let response = send(
        &app,
        file_upload("/production/upload", &guest, "shift.pdf", "application/pdf"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
