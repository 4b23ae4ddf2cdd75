mod error_mapping;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use gcal_calendar::{
    AclRole, AclRule, CalendarClient, ClientOptions, Credentials, EventDraft, EventResponse,
    NewCalendar, NewEvent,
};
use gcal_core::{AccountConfig, AppError, Config, ConfigError, EMAIL_ENV};

use crate::error_mapping::IntoAppError;

#[derive(Parser)]
#[command(name = "gcal", version)]
#[command(about = "Manage Google Calendar calendars, events and sharing")]
struct Cli {
    /// Account email (password is read from GCAL_PASSWORD)
    #[arg(long, env = gcal_core::EMAIL_ENV, global = true)]
    email: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List calendars
    Calendars {
        /// Only calendars owned by the account
        #[arg(long)]
        own: bool,
    },
    /// Create a calendar owned by the account
    CreateCalendar {
        title: String,

        #[arg(long, default_value = "")]
        details: String,

        /// IANA zone (defaults to the configured timezone)
        #[arg(long)]
        timezone: Option<String>,

        #[arg(long)]
        location: String,

        #[arg(long, default_value = "#2952A3")]
        color: String,

        #[arg(long)]
        hidden: bool,
    },
    /// Delete one of the account's own calendars
    DeleteCalendar {
        handle: String,
    },
    /// List events in a calendar
    Events {
        handle: String,

        #[arg(short, long)]
        max: Option<u32>,

        /// Earliest start (e.g. "2025-03-20", "today", RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Latest start
        #[arg(long)]
        to: Option<String>,
    },
    /// Fetch one event; with --etag only if it changed
    Event {
        handle: String,
        id: String,

        #[arg(long)]
        etag: Option<String>,
    },
    /// Full-text search in a calendar
    Find {
        handle: String,
        query: String,

        #[arg(short, long)]
        max: Option<u32>,
    },
    /// Create an event from free text, e.g. "Lunch with Bob tomorrow 12:00"
    QuickAdd {
        handle: String,
        text: String,
    },
    /// Create an event with explicit start, end and location
    AddEvent {
        handle: String,
        title: String,

        /// Start date/time (e.g. "2025-03-20 15:00")
        #[arg(short, long)]
        start: String,

        #[arg(short, long)]
        end: String,

        #[arg(long)]
        location: String,

        #[arg(long, default_value = "")]
        details: String,

        #[arg(long, default_value = "opaque")]
        transparency: String,

        #[arg(long, default_value = "confirmed")]
        status: String,
    },
    /// Replace an event with a JSON object ("-" reads stdin)
    UpdateEvent {
        handle: String,
        id: String,
        json: String,

        #[arg(long)]
        etag: Option<String>,
    },
    /// Delete an event; with --etag only if it has not changed
    DeleteEvent {
        handle: String,
        id: String,

        #[arg(long)]
        etag: Option<String>,
    },
    /// Grant access to a calendar
    Share {
        handle: String,

        #[arg(long, value_enum, default_value_t = Role::Read)]
        role: Role,

        /// Share with one user
        #[arg(long, conflicts_with = "domain")]
        user: Option<String>,

        /// Share with everyone in a domain
        #[arg(long)]
        domain: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Root,
    Owner,
    Editor,
    Freebusy,
    Read,
    None,
}

impl From<Role> for AclRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Root => AclRole::Root,
            Role::Owner => AclRole::Owner,
            Role::Editor => AclRole::Editor,
            Role::Freebusy => AclRole::Freebusy,
            Role::Read => AclRole::Read,
            Role::None => AclRole::None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = gcal_core::init() {
        eprintln!("{}", e);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {}", e.user_message());
            eprintln!("  {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(cli.config.as_deref())?;
    let options = client_options(&config)?;
    let default_timezone = config.events.timezone.clone();

    let email = resolve_email(cli.email, &config.account)?;
    let password = AccountConfig::password_from_env().unwrap_or_default();

    let command = match cli.command {
        Commands::UpdateEvent {
            handle,
            id,
            json,
            etag,
        } => Commands::UpdateEvent {
            handle,
            id,
            json: read_event_json(json, std::io::stdin())?,
            etag,
        },
        other => other,
    };

    let mut client = CalendarClient::with_options(Credentials::new(email, password), options)
        .map_err(IntoAppError::into_app_error)?;
    client
        .authenticate()
        .await
        .map_err(IntoAppError::into_app_error)?;

    execute(&client, command, &default_timezone)
        .await
        .map_err(IntoAppError::into_app_error)
}

async fn execute(
    client: &CalendarClient,
    command: Commands,
    default_timezone: &str,
) -> Result<(), gcal_calendar::CalendarError> {
    match command {
        Commands::Calendars { own } => {
            let calendars = if own {
                client.get_own_calendars().await?
            } else {
                client.get_all_calendars().await?
            };
            print_json(&calendars);
        }
        Commands::CreateCalendar {
            title,
            details,
            timezone,
            location,
            color,
            hidden,
        } => {
            let calendar = NewCalendar {
                title,
                details,
                timezone: timezone.unwrap_or_else(|| default_timezone.to_string()),
                hidden,
                color,
                location,
            };
            print_json(&client.create_calendar(&calendar).await?);
        }
        Commands::DeleteCalendar { handle } => {
            client.delete_calendar(&handle).await?;
            println!("Deleted calendar {}", handle);
        }
        Commands::Events {
            handle,
            max,
            from,
            to,
        } => {
            let events = client
                .get_events(&handle, max, from.as_deref(), to.as_deref())
                .await?;
            print_json(&events);
        }
        Commands::Event { handle, id, etag } => {
            let response = match etag {
                Some(etag) => client.get_event(&handle, &id, &etag).await?,
                None => client.get_event_by_id(&handle, &id).await?,
            };
            match response {
                EventResponse::Data(event) => print_json(&event),
                EventResponse::Unchanged => println!("Event {} has not changed", id),
                EventResponse::Empty => println!("Event {} returned no data", id),
            }
        }
        Commands::Find { handle, query, max } => {
            print_json(&client.find_event(&handle, &query, max).await?);
        }
        Commands::QuickAdd { handle, text } => {
            print_json(&client.create_event(&handle, &NewEvent::quick(text)).await?);
        }
        Commands::AddEvent {
            handle,
            title,
            start,
            end,
            location,
            details,
            transparency,
            status,
        } => {
            let draft = EventDraft {
                title,
                details,
                transparency,
                status,
                location,
                start,
                end,
            };
            print_json(&client.create_event(&handle, &NewEvent::Full(draft)).await?);
        }
        Commands::UpdateEvent {
            handle,
            id,
            json,
            etag,
        } => {
            let updated = client
                .update_event(&handle, &id, etag.as_deref(), &json)
                .await?;
            print_json(&updated);
        }
        Commands::DeleteEvent { handle, id, etag } => {
            client.delete_event(&handle, &id, etag.as_deref()).await?;
            println!("Deleted event {}", id);
        }
        Commands::Share {
            handle,
            role,
            user,
            domain,
        } => {
            let rule = match (user, domain) {
                (Some(user), _) => AclRule::user(user, role.into()),
                (None, Some(domain)) => AclRule::domain(domain, role.into()),
                (None, None) => AclRule {
                    role: role.into(),
                    ..AclRule::default()
                },
            };
            print_json(&client.add_user_to_acl(&handle, &rule).await?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    let loaded = match path {
        Some(path) => Config::load_validated_from(path),
        None => Config::load_validated(),
    };
    let (config, _) = loaded.map_err(|e| ConfigError::Invalid(format!("{:#}", e)))?;
    Ok(config)
}

fn client_options(config: &Config) -> Result<ClientOptions, AppError> {
    Ok(ClientOptions {
        login_url: config.service.login_url.clone(),
        feeds_url: config.service.feeds_url.clone(),
        source: config.service.source.clone(),
        timeout: config.service.timeout(),
        accept_invalid_certs: config.service.allow_invalid_certs,
        default_max_results: config.events.default_max_results,
        timezone: config.events.tz()?,
    })
}

/// `--email`, then `GCAL_EMAIL`, then the config file.
fn resolve_email(flag: Option<String>, account: &AccountConfig) -> Result<String, AppError> {
    flag.filter(|e| !e.is_empty())
        .or_else(|| account.resolved_email())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            ConfigError::MissingSetting(format!("account.email (or --email / {})", EMAIL_ENV))
                .into()
        })
}

/// The event JSON argument, or all of `stdin` when it is "-".
fn read_event_json(arg: String, mut stdin: impl Read) -> Result<String, AppError> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut body = String::new();
    stdin.read_to_string(&mut body)?;
    Ok(body)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("failed to render output: {}", e),
    }
}
