// UI layer: prints flow reports and provides the interactive menu built on
// `dialoguer`. Requests run behind an `indicatif` spinner; nothing is printed
// until the flow has returned.

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::time::Duration;

use crate::api::{ApiClient, ApiResponse, RegisterRequest, Role};
use crate::config::Config;
use crate::flows::{
    self, Attempt, AuthReport, ListReport, RoutesReport, UploadOptions, UploadReport, VideoScope,
    AUTH_TIMEOUT,
};
use crate::video::VideoListing;

/// Run `f` while a spinner with `msg` is shown on stderr.
pub fn with_spinner<T>(msg: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

/// Status code coloured by class: green 2xx, yellow 4xx, red otherwise.
fn colored_status(status: StatusCode) -> String {
    let text = status.as_u16().to_string();
    if status.is_success() {
        text.green().to_string()
    } else if status.is_client_error() {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

fn print_response(label: &str, resp: &ApiResponse) {
    println!("\n{} - Status: {}", label, colored_status(resp.status));
    println!("Response:");
    println!("{}", resp.pretty());
}

fn print_attempt(label: &str, attempt: &Attempt) {
    match attempt {
        Attempt::Completed(resp) => print_response(label, resp),
        Attempt::Failed(e) => println!("\n{}", format!("Error during {}: {:#}", label, e).red()),
    }
}

pub fn print_auth_report(report: &AuthReport) {
    println!("1) Trying to register a new user...");
    print_attempt("Register", &report.register);

    match &report.login {
        Some(login) => {
            println!("\n2) Trying to login with the same user...");
            print_attempt("Login", login);
        }
        None => println!("\nSkipping login because registration failed."),
    }

    println!("\n3) Trying to register the SAME user again (should get error)...");
    print_attempt("Register", &report.duplicate);
    if report.duplicate_rejected() {
        println!("Duplicate registration rejected as expected.");
    } else if report.duplicate.status().is_some() {
        println!("{}", "Duplicate registration was accepted!".red());
    }
}

pub fn print_routes_report(report: &RoutesReport) {
    let preview: String = report.token.chars().take(20).collect();
    println!("Using token: {}...", preview);
    if let Some(claims) = &report.claims {
        println!(
            "Token role: {} (organization: {})",
            claims.role.as_deref().unwrap_or("?"),
            claims.organization_id.as_deref().unwrap_or("?")
        );
    }

    let role = report.role();
    for probe in &report.probes {
        let mut label = probe.route.path.to_uppercase();
        if !probe.with_token && probe.route.tier.requires_token() {
            label.push_str(" (no token)");
        }
        print_attempt(&label, &probe.attempt);
        if role.is_some() || !probe.with_token {
            let expected = if probe.expected_allowed(role) {
                "allowed"
            } else {
                "denied"
            };
            println!("Expected by policy: {}", expected);
        }
    }
}

pub fn print_list_report(report: &ListReport) {
    let heading = match report.scope {
        VideoScope::Mine => "My Videos",
        VideoScope::Shared => "Shared Videos",
    };
    println!("\n{} Status: {}", heading, colored_status(report.response.status));

    match &report.listing {
        VideoListing::Raw(raw) => {
            println!("JSON parse failed: response body is not JSON");
            println!("Raw response: {}", raw);
        }
        listing => {
            println!("{} Data: {}", heading, report.response.pretty());
            match listing.count() {
                Some(n) => println!("Number of videos: {}", n),
                None => println!("Number of videos: N/A"),
            }
            for record in listing.records() {
                println!("  - {}", record.summary());
            }
        }
    }
}

pub fn print_upload_report(report: &UploadReport) {
    println!(
        "Uploaded {} as {} (title: {:?})",
        report.upload.file_name(),
        report.upload.mime,
        report.upload.title
    );
    for w in &report.warnings {
        println!("{}", format!("Warning: {}", w).yellow());
    }
    println!("Status: {}", colored_status(report.response.status));
    println!("{}", report.response.pretty());
    if let Some(video) = &report.created {
        println!(
            "Created video {} (status: {})",
            video.id,
            video.status.as_deref().unwrap_or("unknown")
        );
    }
}

// ---------------------------------------------------------------------------
// Subcommand runners, shared by the CLI and the menu
// ---------------------------------------------------------------------------

pub fn run_auth(config: &Config, role: Role) -> Result<()> {
    let config = config.clone().with_default_timeout(AUTH_TIMEOUT);
    let api = ApiClient::from_config(&config)?;
    println!("=== Testing Authentication Endpoints ===\n");
    println!("Target backend: {}\n", api.base_url());

    let request = RegisterRequest {
        email: config.credentials.email.clone(),
        password: config.credentials.password.clone(),
        role,
        organization_id: config.organization.clone(),
    };
    let report = with_spinner("Registering and logging in...", || {
        flows::check_auth(&api, &request)
    });
    print_auth_report(&report);
    println!("\n=== Tests finished ===");
    Ok(())
}

pub fn run_routes(config: &Config, anonymous: bool) -> Result<()> {
    let mut api = ApiClient::from_config(config)?;
    println!("=== Testing Protected Routes ===\n");
    let report = with_spinner("Probing routes...", || {
        flows::probe_routes(&mut api, &config.credentials, anonymous)
    })?;
    print_routes_report(&report);
    println!("\n=== Tests finished ===");
    Ok(())
}

pub fn run_videos(config: &Config, scope: VideoScope) -> Result<()> {
    let mut api = ApiClient::from_config(config)?;
    let report = with_spinner("Fetching videos...", || {
        flows::list_videos(&mut api, &config.credentials, scope)
    })?;
    println!("Login successful - Token acquired");
    print_list_report(&report);
    Ok(())
}

pub fn run_upload(config: &Config, options: UploadOptions) -> Result<()> {
    let mut api = ApiClient::from_config(config)?;
    let report = with_spinner("Uploading...", || {
        flows::upload_video(&mut api, &config.credentials, options)
    })?;
    print_upload_report(&report);
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive menu
// ---------------------------------------------------------------------------

/// Interactive menu, used when no subcommand is given. Runs until "Exit".
/// A failing flow is reported and the menu comes back.
pub fn main_menu(mut config: Config) -> Result<()> {
    println!("Backend: {}", config.base_url);
    loop {
        println!("Signed in as: {}", config.credentials.email);
        let items = vec![
            "Check registration and login",
            "Probe protected routes",
            "List my videos",
            "List shared videos",
            "Upload a video",
            "Change credentials",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        let outcome = match selection {
            0 => {
                let roles = [Role::Viewer, Role::Editor, Role::Admin];
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                let pick = Select::new()
                    .with_prompt("Role to register with")
                    .items(&names)
                    .default(1)
                    .interact()?;
                run_auth(&config, roles[pick])
            }
            1 => run_routes(&config, false),
            2 => run_videos(&config, VideoScope::Mine),
            3 => run_videos(&config, VideoScope::Shared),
            4 => prompt_upload().and_then(|options| run_upload(&config, options)),
            5 => {
                prompt_credentials(&mut config)?;
                Ok(())
            }
            6 => break,
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            println!("{}", format!("{:#}", e).red());
        }
        println!();
    }
    Ok(())
}

fn prompt_upload() -> Result<UploadOptions> {
    let path: String = Input::new().with_prompt("Video file path").interact_text()?;
    let mut options = UploadOptions::new(path.trim());
    options.title = Input::new()
        .with_prompt("Title")
        .default(options.title)
        .interact_text()?;
    options.description = Input::new()
        .with_prompt("Description")
        .default(options.description)
        .interact_text()?;
    let mime: String = Input::new()
        .with_prompt("MIME type (blank to infer)")
        .allow_empty(true)
        .interact_text()?;
    if !mime.trim().is_empty() {
        options.mime = Some(mime.trim().to_string());
    }
    Ok(options)
}

fn prompt_credentials(config: &mut Config) -> Result<()> {
    config.credentials.email = Input::new()
        .with_prompt("Email")
        .default(config.credentials.email.clone())
        .interact_text()?;
    // `Password` hides input in the terminal.
    config.credentials.password = Password::new().with_prompt("Password").interact()?;
    Ok(())
}
