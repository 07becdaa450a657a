use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rPunch
/// Offline-tolerant punch client and single-session punch server
#[derive(Parser)]
#[command(
    name = "rpunch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record time-in/time-out punches, online or queued offline, and run the punch server",
    long_about = None
)]
pub struct Cli {
    /// Override the server database path
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the device-local queue database path
    #[arg(global = true, long = "queue-db")]
    pub queue_db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by `in` and `out`.
#[derive(Args, Debug, Clone)]
pub struct PunchArgs {
    /// Worker to punch for (default: worker_id from the config)
    #[arg(long)]
    pub worker: Option<String>,

    /// Treat the network as unreachable (queue instead of sending)
    #[arg(long)]
    pub offline: bool,

    /// Device latitude (overrides the config)
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Device longitude (overrides the config)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and both databases
    Init,

    /// Manage the configuration file (view, check, migrate or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,

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

    /// Manage the server database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the server's internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run the punch server
    Serve {
        /// Address to listen on (default: `bind` from the config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Punch in (queued punches are sent first when the server is reachable)
    In {
        #[command(flatten)]
        args: PunchArgs,
    },

    /// Punch out (queued punches are sent first when the server is reachable)
    Out {
        #[command(flatten)]
        args: PunchArgs,
    },

    /// Send queued punches to the server now
    Sync,

    /// Watch connectivity and sync queued punches whenever the server becomes reachable
    Watch {
        /// Seconds between reachability checks
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Inspect or clear the offline punch queue
    Queue {
        #[arg(long = "list", help = "List queued punches")]
        list: bool,

        #[arg(long = "clear", help = "Discard every queued punch")]
        clear: bool,
    },

    /// Show whether you are on the clock (re-read from the server when reachable)
    Status {
        #[arg(long)]
        worker: Option<String>,

        #[arg(long, help = "Do not contact the server")]
        offline: bool,
    },

    /// Show or set presence (active, away, offline)
    Presence {
        #[arg(long)]
        worker: Option<String>,

        #[arg(long = "set", value_name = "STATUS")]
        set: Option<String>,
    },
}
