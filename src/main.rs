//! Main entry point for the application.
//!
//! This module initializes logging, loads environment variables and
//! configuration, and dispatches the operator subcommands: the batch task
//! runner, manual sends and resends, broadcasts and the HTTP API server.

use chatsuite::api::{self, ApiState};
use chatsuite::clients::{RelayClient, TaskSourceClient, TwilioSender};
use chatsuite::config;
use chatsuite::constants::{RELAY_TIMEOUT, SEND_TIMEOUT, TASK_SOURCE_TIMEOUT};
use chatsuite::core::{
    parse_template_variables, Broadcaster, ManualTaskInput, TaskNotifier,
};
use chatsuite::db::{self, Database};
use chatsuite::utils::{self, console};
use chatsuite::cli::{Cli, Command};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::try_parse().expect("Failed to parse CLI arguments");
    let serve_mode = matches!(cli.command, Command::Serve { .. });
    utils::init_logging(&cli.logging_level, serve_mode);

    if let Err(e) = dotenvy::dotenv() {
        warn!("Failed to load .env file: {}", e);
    }

    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    let notifications_db = Database::new(&config.notifications_db);
    {
        let mut conn = notifications_db.get_conn();
        if let Err(e) = db::ensure_notifications_schema(&mut conn) {
            error!("Failed to prepare notification database: {}", e);
            std::process::exit(1);
        }
    }

    let sender = Arc::new(TwilioSender::new(&config.twilio, SEND_TIMEOUT));
    let task_source = TaskSourceClient::new(&config.task_source.base_url, TASK_SOURCE_TIMEOUT);
    let notifier = Arc::new(TaskNotifier::new(
        notifications_db.clone(),
        task_source,
        sender.clone(),
        config.assignee_directory(),
        config.send_delay(),
    ));
    let broadcaster = Arc::new(Broadcaster::new(sender, config.send_delay()));

    match cli.command {
        Command::CheckTasks { peek, dry_run, yes } => {
            if peek {
                let bar = console::spinner("Peeking at the task queue...");
                let previews = notifier.peek().await;
                bar.finish_and_clear();

                match previews {
                    Ok(previews) => console::print_previews(&previews),
                    Err(e) => {
                        error!("Failed to fetch tasks: {}", e);
                        std::process::exit(1);
                    }
                }
                return;
            }

            if !yes && !console::confirm_consume() {
                info!("Aborted, the queue was not touched");
                return;
            }

            let bar = console::spinner("Fetching and notifying...");
            let outcome = notifier.check_and_notify(true, dry_run).await;
            bar.finish_and_clear();

            match outcome {
                Ok(outcome) => console::print_batch_outcome(&outcome),
                Err(e) => {
                    error!("Failed to fetch tasks: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Command::Send {
            titulo,
            descripcion,
            asignado,
            creador,
            proyecto,
        } => {
            let result = notifier
                .send_manual(ManualTaskInput {
                    titulo,
                    descripcion,
                    asignado,
                    creador,
                    proyecto,
                })
                .await;

            match result {
                Ok(report) => console::print_send_report(&report),
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Command::Resend { id } => match notifier.resend(id).await {
            Ok(report) => console::print_send_report(&report),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },

        Command::Broadcast { numbers, variables } => {
            let variables = match parse_template_variables(&variables) {
                Ok(variables) => variables,
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            };

            let outcome = broadcaster.send_to_all(&numbers, &variables).await;
            console::print_broadcast_outcome(&outcome);
        }

        Command::Serve { port } => {
            let state = ApiState {
                messages_db: Database::new(&config.messages_db),
                notifications_db,
                notifier,
                relay: Arc::new(RelayClient::new(&config.relay, RELAY_TIMEOUT)),
                broadcaster,
                provider_sender: config.twilio.from.clone(),
                pause_minutes: config.pause_minutes(),
            };

            info!("Starting API server on port {}", port);
            if let Err(e) = api::server::launch_server(state, port).await {
                error!("Failed to start server: {}", e);
                std::process::exit(1);
            }
        }
    }
}
