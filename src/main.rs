// Entrypoint for the CLI.
// - Parses arguments, layers them over the environment config and hands off
//   to the matching runner in `ui`.
// - Without a subcommand the interactive menu starts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use vidhost_probe::api::Role;
use vidhost_probe::config::Config;
use vidhost_probe::flows::{
    UploadOptions, VideoScope, DEFAULT_UPLOAD_DESCRIPTION, DEFAULT_UPLOAD_TITLE,
};
use vidhost_probe::ui;

#[derive(Parser)]
#[command(name = "vidhost-probe", version, about = "Probe a video-hosting backend's HTTP API")]
struct Cli {
    /// Backend base URL (overrides VIDHOST_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Account email (overrides VIDHOST_EMAIL)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Account password (overrides VIDHOST_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Per-request timeout in seconds (overrides VIDHOST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Register, log in, then confirm a duplicate registration is refused
    Auth {
        #[arg(long, value_enum, default_value_t = Role::Editor)]
        role: Role,

        /// Organization id sent with the registration
        #[arg(long)]
        organization: Option<String>,
    },
    /// Log in and GET the public, protected, editor-only and admin-only routes
    Routes {
        /// Also probe every gated route without a token
        #[arg(long)]
        anonymous: bool,
    },
    /// Log in and list your uploaded videos
    Videos {
        /// List videos shared with you instead
        #[arg(long)]
        shared: bool,
    },
    /// Log in and upload a video file
    Upload {
        path: PathBuf,

        /// MIME type of the file; inferred from the extension when omitted
        #[arg(long)]
        mime: Option<String>,

        #[arg(long, default_value = DEFAULT_UPLOAD_TITLE)]
        title: String,

        #[arg(long, default_value = DEFAULT_UPLOAD_DESCRIPTION)]
        description: String,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(email) = &self.email {
            config.credentials.email = email.clone();
        }
        if let Some(password) = &self.password {
            config.credentials.password = password.clone();
        }
        if let Some(secs) = self.timeout.filter(|s| *s > 0) {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = cli.config();

    match cli.command {
        None => ui::main_menu(config)?,
        Some(Command::Auth { role, organization }) => {
            if let Some(org) = organization {
                config.organization = org;
            }
            ui::run_auth(&config, role)?
        }
        Some(Command::Routes { anonymous }) => ui::run_routes(&config, anonymous)?,
        Some(Command::Videos { shared }) => {
            let scope = if shared {
                VideoScope::Shared
            } else {
                VideoScope::Mine
            };
            ui::run_videos(&config, scope)?
        }
        Some(Command::Upload {
            path,
            mime,
            title,
            description,
        }) => {
            let options = UploadOptions {
                path,
                mime,
                title,
                description,
            };
            ui::run_upload(&config, options)?
        }
    }
    Ok(())
}
