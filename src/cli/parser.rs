use clap::{Parser, Subcommand};

/// Command-line interface definition for rAttendance
/// Work/break attendance ledger backed by SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Attendance ledger: record start/end of work and breaks, one status per user, using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(
            long = "check",
            help = "Check database integrity and the one-open-row invariants"
        )]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log or the attendance action log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "actions", help = "Print the attendance action log (newest first)")]
        actions: bool,

        #[arg(long = "user", help = "Only actions of this user (with --actions)")]
        user: Option<String>,

        #[arg(long = "limit", default_value_t = 50, help = "Maximum rows (with --actions)")]
        limit: usize,
    },

    /// Record an attendance action for a user
    Act {
        /// External user key (e.g. a chat user id)
        user: String,

        /// start | end | break | back, a button id or START_WORK/END_WORK/START_BREAK/END_BREAK
        action: String,

        #[arg(long = "channel", help = "Channel the action came from")]
        channel: Option<String>,

        #[arg(long = "note", help = "Free text stored with the action")]
        note: Option<String>,

        #[arg(long = "source", default_value = "cli", help = "Event source label")]
        source: String,

        #[arg(long = "json", help = "Print the outcome as JSON")]
        json: bool,
    },

    /// Show the current status of a user
    Status {
        user: String,

        #[arg(long = "json", help = "Print the status as JSON")]
        json: bool,
    },

    /// List work sessions with their breaks and worked time
    List {
        #[arg(long = "user", help = "Only sessions of this user")]
        user: Option<String>,

        #[arg(long = "month", short = 'm', help = "Only sessions started in this month (YYYY-MM)")]
        month: Option<String>,

        #[arg(long = "json", help = "Print the report as JSON")]
        json: bool,
    },

    /// Delete a work session and its breaks (operator correction)
    Del {
        #[arg(long = "session", help = "Work session id to delete")]
        session: i64,

        #[arg(long = "yes", short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}
