// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CRM Calendar CLI
//!
//! Shows and edits CRM calendar events from the terminal, keeping the
//! session in a local file between runs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crm_calendar::{
    config::Config,
    models::{EventDraft, EventTime, EventType, RecordId},
    services::EventFilter,
    session::{ConsoleNavigator, FileStore},
    views, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crm-calendar")]
#[command(about = "Browse and edit CRM calendar events", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "CRM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the next few events
    Upcoming {
        #[arg(short, long, default_value_t = 3)]
        limit: usize,
    },
    /// List events
    List {
        /// Only events from this date/time on
        #[arg(long)]
        from: Option<EventTime>,

        /// Only events up to this date/time
        #[arg(long)]
        to: Option<EventTime>,

        /// Sort field, e.g. "start_time" or "-start_time"
        #[arg(long)]
        ordering: Option<String>,

        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one event with its participants
    Show { id: String },
    /// Create an event
    Create {
        title: String,

        /// Start date/time (e.g. "2026-03-20" or "2026-03-20T15:00:00Z")
        #[arg(short, long)]
        start: EventTime,

        #[arg(short, long)]
        end: EventTime,

        /// MEETING, CALL, DEADLINE, REVIEW or OTHER
        #[arg(short = 't', long = "type")]
        event_type: Option<EventType>,

        #[arg(long)]
        all_day: bool,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Owner user id (defaults to the signed-in user)
        #[arg(long)]
        owner: Option<String>,

        /// Participant user id (repeatable)
        #[arg(long = "participant")]
        participants: Vec<String>,
    },
    /// Change fields of an event
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<EventTime>,

        #[arg(short, long)]
        end: Option<EventTime>,

        #[arg(short = 't', long = "type")]
        event_type: Option<EventType>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event
    Delete { id: String },
    /// List users that can be invited
    Users,
}

impl Commands {
    /// Location to come back to after re-authenticating.
    fn location(&self) -> String {
        match self {
            Commands::Login { .. } | Commands::Logout => "/".to_string(),
            Commands::Upcoming { .. } => "/dashboard".to_string(),
            Commands::Show { id } | Commands::Update { id, .. } | Commands::Delete { id } => {
                format!("/calendar/{}", id)
            }
            Commands::Create { .. } => "/calendar/new".to_string(),
            Commands::List { .. } | Commands::Users => "/calendar".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let store = Arc::new(FileStore::open(&config.session_file).with_context(|| {
        format!("Failed to open session file {}", config.session_file.display())
    })?);
    let navigator = Arc::new(ConsoleNavigator::new(cli.command.location()));
    let state = AppState::new(config, store, navigator);

    run(cli.command, &state).await?;
    Ok(())
}

async fn run(command: Commands, state: &AppState) -> crm_calendar::error::Result<()> {
    if !matches!(command, Commands::Login { .. } | Commands::Logout) {
        state.auth.require_session().await?;
    }

    match command {
        Commands::Login { username, password } => {
            let outcome = state.auth.login(&username, &password).await?;
            println!("Signed in as user {}", outcome.user_id);
            if let Some(location) = outcome.redirect_to {
                println!("You were last at {}", location);
            }
        }
        Commands::Logout => {
            state.auth.logout()?;
            println!("Signed out");
        }
        Commands::Upcoming { limit } => {
            let events = state.calendar.upcoming_events(limit).await;
            print!("{}", views::render_event_list(&events));
        }
        Commands::List {
            from,
            to,
            ordering,
            page,
        } => {
            let mut filter = EventFilter::new();
            if let Some(from) = from {
                filter = filter.from_date(from.to_utc());
            }
            if let Some(to) = to {
                filter = filter.to_date(to.to_utc());
            }
            if let Some(ordering) = ordering {
                filter = filter.ordering(&ordering);
            }
            if let Some(page) = page {
                filter = filter.page(page);
            }

            let page = state.calendar.list_events(&filter).await?;
            print!("{}", views::render_event_list(&page.results));
            if let Some(next) = &page.next {
                println!("More results: {}", next);
            }
        }
        Commands::Show { id } => {
            let event = state.calendar.get_event(&RecordId::new(id)).await?;
            print!("{}", views::render_event_detail(&event));
        }
        Commands::Create {
            title,
            start,
            end,
            event_type,
            all_day,
            location,
            description,
            owner,
            participants,
        } => {
            let draft = EventDraft {
                title: Some(title),
                event_type,
                start_time: Some(start),
                end_time: Some(end),
                is_all_day: Some(all_day),
                location,
                description,
                owner: owner.map(RecordId::new),
                participants: Some(participants.into_iter().map(RecordId::new).collect()),
                ..Default::default()
            };
            let event = state.calendar.create_event(draft).await?;
            println!("Created event #{}", event.id);
        }
        Commands::Update {
            id,
            title,
            start,
            end,
            event_type,
            location,
            description,
        } => {
            let draft = EventDraft {
                title,
                event_type,
                start_time: start,
                end_time: end,
                location,
                description,
                ..Default::default()
            };
            let event = state.calendar.update_event(&RecordId::new(id), draft).await?;
            println!("Updated event #{}", event.id);
        }
        Commands::Delete { id } => {
            state.calendar.delete_event(&RecordId::new(id.clone())).await?;
            println!("Deleted event #{}", id);
        }
        Commands::Users => {
            let users = state.calendar.available_users().await?;
            print!("{}", views::render_users(&users.results));
        }
    }

    Ok(())
}

/// Initialize structured logging on stderr; JSON when `CRM_LOG_JSON` is set.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,crm_calendar=info"));

    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var_os("CRM_LOG_JSON").is_some() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
