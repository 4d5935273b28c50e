//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::ServerConfig;
use scorebook_core::{
    EntityKind, NewAdmin, Repository, ScorebookError, class_results, seed_demo,
};

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn open_repository(config: &ServerConfig) -> Result<Repository, ScorebookError> {
    tracing::debug!(database = %config.database.display(), "Opening database");
    Repository::open(&config.database)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: ServerConfig) -> Result<(), ScorebookError> {
    println!("Scorebook Results Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:       {}", config.bind_addr());
    println!("  Database:      {}", config.database.display());
    println!("  Access policy: {}", config.access_policy);
    println!("  Rate limit:    {} req/s", config.rate_limit);
    println!();
    println!("Endpoints:");
    println!("  GET  /api/health             - Health check");
    println!("  *    /api/sessions, /api/classes, /api/students, /api/subjects");
    println!("  GET  /api/classes/{{id}}/results - Ranked class results");
    println!("  POST /api/marks              - Set or replace marks");
    println!("  *    /api/settings           - Key/value settings");
    println!("  POST /api/login, /api/logout - Admin login");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show record counts.
pub fn cmd_status(config: &ServerConfig, json_mode: bool) -> Result<(), ScorebookError> {
    let repo = open_repository(config)?;
    let stats = repo.stats()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": config.database.to_string_lossy(),
            "sessions": stats.sessions,
            "classes": stats.classes,
            "students": stats.students,
            "subjects": stats.subjects,
            "marks": stats.marks,
            "admins": stats.admins,
            "settings": stats.settings
        }));
        return Ok(());
    }

    println!("Scorebook Status");
    println!("================");
    println!("Database: {}", config.database.display());
    println!();
    println!("Sessions: {}", stats.sessions);
    println!("Classes:  {}", stats.classes);
    println!("Students: {}", stats.students);
    println!("Subjects: {}", stats.subjects);
    println!("Marks:    {}", stats.marks);
    println!("Admins:   {}", stats.admins);
    println!("Settings: {}", stats.settings);

    if stats.admins == 0 {
        println!();
        println!("No admin accounts yet. Create one with `scorebook create-admin`.");
    }

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(config: &ServerConfig, force: bool) -> Result<(), ScorebookError> {
    let path = &config.database;
    if path.exists() {
        if !force {
            return Err(ScorebookError::invalid(
                "database",
                "Database already exists. Use --force to overwrite.",
            ));
        }
        std::fs::remove_file(path).map_err(|e| {
            ScorebookError::StorageError(format!("Remove {}: {}", path.display(), e))
        })?;
        tracing::info!(database = %path.display(), "Removed existing database");
    }

    Repository::open(path)?;
    println!("Initialized new database at {}", path.display());
    Ok(())
}

// =============================================================================
// SEED COMMAND
// =============================================================================

/// Load the demo data set.
pub fn cmd_seed(config: &ServerConfig, json_mode: bool) -> Result<(), ScorebookError> {
    let repo = open_repository(config)?;
    let report = seed_demo(&repo)?;
    tracing::info!(
        event = "seed",
        session_id = report.session_id,
        class_id = report.class_id,
        created_students = report.created_students,
        "Seeded demo data"
    );

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    if !report.created_session && !report.created_class && report.created_students == 0 {
        println!("Demo data already present (class {})", report.class_id);
    } else {
        println!(
            "Seeded demo data: session {}, class {}, {} students",
            report.session_id, report.class_id, report.created_students
        );
    }
    Ok(())
}

// =============================================================================
// CREATE-ADMIN COMMAND
// =============================================================================

/// Create an admin account.
pub fn cmd_create_admin(
    config: &ServerConfig,
    json_mode: bool,
    email: &str,
    name: &str,
    password: &str,
    super_admin: bool,
) -> Result<(), ScorebookError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ScorebookError::invalid("email", "email must be a valid address"));
    }
    if name.trim().is_empty() {
        return Err(ScorebookError::invalid("name", "name is required"));
    }
    if password.is_empty() {
        return Err(ScorebookError::invalid("password", "password is required"));
    }

    let password_hash = api::hash_password(password)
        .map_err(|_| ScorebookError::invalid("password", "Password hashing failed"))?;

    let repo = open_repository(config)?;
    let admin = repo.create_admin(NewAdmin {
        email: email.to_string(),
        password_hash,
        name: name.trim().to_string(),
        is_super_admin: super_admin,
    })?;
    tracing::info!(event = "admin_created", admin_id = admin.id, "Admin created");

    if json_mode {
        print_json(&api::AdminProfile::from(admin));
        return Ok(());
    }

    println!("Created admin {} <{}> (id {})", admin.name, admin.email, admin.id);
    if admin.is_super_admin {
        println!("  super admin");
    }
    Ok(())
}

// =============================================================================
// RESULTS COMMAND
// =============================================================================

/// Print the leaderboard of a class.
pub fn cmd_results(
    config: &ServerConfig,
    json_mode: bool,
    class_id: u64,
) -> Result<(), ScorebookError> {
    let repo = open_repository(config)?;
    let data = repo
        .get_class_with_data(class_id)?
        .ok_or_else(|| ScorebookError::not_found(EntityKind::Class, class_id))?;
    let results = class_results(&data);

    if json_mode {
        print_json(&results);
        return Ok(());
    }

    println!("Results: {}", results.class.name);
    println!("{}", "=".repeat(9 + results.class.name.len()));
    if !results.columns.is_empty() {
        let names: Vec<&str> = results.columns.iter().map(|s| s.name.as_str()).collect();
        println!("Subjects: {}", names.join(", "));
    }
    println!();
    println!(
        "{:>4}  {:>6}  {:<28} {:>10} {:>8}  {}",
        "Rank", "Roll", "Name", "Total", "%", "Result"
    );
    for row in &results.rows {
        println!(
            "{:>4}  {:>6}  {:<28} {:>10} {:>7.2}%  {}",
            row.rank,
            row.roll_no,
            row.name,
            format!("{}/{}", row.totals.obtained, row.totals.max),
            row.totals.percentage,
            if row.passed { "PASS" } else { "FAIL" }
        );
    }
    println!();
    println!("Students: {}", results.summary.student_count);
    println!("Average:  {:.2}%", results.summary.average_percentage);
    if let Some(top) = &results.summary.top_performer {
        println!("Top:      {}", top);
    }
    Ok(())
}
