// src/main.rs

use anyhow::Context;
use staffdesk_core::auth::AuthService;
use staffdesk_core::employees::EmployeeService;
use staffdesk_core::permissions::{PermissionBoard, PermissionTab};
use staffdesk_core::{ApiClient, Navigation, Route, RouteGuard, Session, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    let session = Session::in_memory();
    let client = ApiClient::from_settings(&settings, session.clone())?;
    println!("Smoke testing {}", settings.api_base_url);

    // Test 1: guard blocks protected views without a token
    println!("\n🔍 Checking route guard without a session...");
    let mut guard = RouteGuard::new();
    guard.resolve(&session);
    match guard.navigate(Route::Employees) {
        Navigation::Redirect { to, .. } => println!("Redirected to {} as expected", to),
        other => anyhow::bail!("Expected a redirect, got {:?}", other),
    }

    // Test 2: login
    let email = prompt("Email (press Enter to stop here): ")?;
    if email.is_empty() {
        println!("\n✅ Testing complete!");
        return Ok(());
    }
    let password = prompt("Password: ")?;

    println!("\n🔍 Logging in...");
    AuthService::new(client.clone())
        .login(&email, &password)
        .await
        .context("Login failed")?;
    guard.on_login();
    println!(
        "Logged in (user id: {})",
        session.user_id()?.unwrap_or_else(|| "unknown".to_string())
    );

    // Test 3: employees
    println!("\n🔍 Fetching employees...");
    let employees = EmployeeService::new(client.clone()).get_all().await?;
    println!("Employees returned: {}", employees.len());

    // Test 4: permissions with names joined in
    println!("\n🔍 Fetching permissions...");
    let mut board = PermissionBoard::from_client(client.clone());
    board.load().await?;
    println!(
        "Permissions: {} total, {} pending",
        board.rows(PermissionTab::All).len(),
        board.pending_count()
    );
    for row in board.rows(PermissionTab::All).into_iter().take(5) {
        println!(
            "  #{} {} {} -> {}",
            row.record.id, row.status_text, row.requester_name, row.target_name
        );
    }

    // Test 5: logout revokes access locally
    guard.logout(&session)?;
    println!("\n🔍 After logout: {:?}", guard.navigate(Route::Dashboard));

    println!("\n✅ Testing complete!");
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
