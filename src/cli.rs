use clap::{Parser, Subcommand};

/// Command line interface for the application
#[derive(Parser)]
#[command(name = "chatsuite", about = "Admin backend and WhatsApp notification relay")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value_t = String::from("chatsuite.yaml"))]
    pub config: String,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Default: "info"
    #[arg(long, default_value_t = String::from("info"))]
    pub logging_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch high-priority tasks and notify each assignee over WhatsApp
    CheckTasks {
        /// Preview the queue without consuming it
        #[arg(long)]
        peek: bool,

        /// Resolve and report without persisting or sending
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt before a consuming run
        #[arg(short, long)]
        yes: bool,
    },

    /// Send a single notification entered by hand
    Send {
        /// Task title
        #[arg(long)]
        titulo: String,

        /// Task description
        #[arg(long)]
        descripcion: Option<String>,

        /// Assignee name, resolved against the directory
        #[arg(long)]
        asignado: String,

        /// Creator shown in the template
        #[arg(long)]
        creador: Option<String>,

        /// Project shown in the record
        #[arg(long)]
        proyecto: Option<String>,
    },

    /// Re-attempt delivery of a failed notification
    Resend {
        /// Database id of the failed record
        id: i32,
    },

    /// Send one template message to a list of numbers
    Broadcast {
        /// Newline/comma/semicolon separated list of numbers
        #[arg(long)]
        numbers: String,

        /// JSON object of template variables
        #[arg(long, default_value_t = String::from("{}"))]
        variables: String,
    },

    /// Run the HTTP API server for the admin UI
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}
