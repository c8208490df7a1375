//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lince - Back office for a vehicle tracking business
#[derive(Parser)]
#[command(name = "lince")]
#[command(about = "Customers, monthly invoices, expenses and proposals for Lince Track", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "lince.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set LINCE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Company profile (TOML) used on documents and reminders
    ///
    /// Falls back to LINCE_COMPANY_CONFIG, then the data directory, then built-in defaults.
    #[arg(long, global = true)]
    pub company: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires the access-proxy header or an API key
        /// from LINCE_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origins (comma-separated)
        #[arg(long, value_delimiter = ',')]
        allowed_origins: Vec<String>,
    },

    /// Show the month overview
    Dashboard {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: Option<CustomersAction>,
    },

    /// Manage monthly invoices
    Invoices {
        #[command(subcommand)]
        action: Option<InvoicesAction>,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Manage commercial proposals
    Proposals {
        #[command(subcommand)]
        action: Option<ProposalsAction>,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Export data to CSV
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum CustomersAction {
    /// List customers
    List {
        /// Filter by name, tax id or phone
        #[arg(short, long)]
        search: Option<String>,

        /// Include inactive customers
        #[arg(short, long)]
        all: bool,
    },

    /// Show a customer with its vehicles
    Show {
        /// Customer ID
        id: i64,
    },

    /// Toggle a customer between active and inactive
    Toggle {
        /// Customer ID
        id: i64,
    },

    /// Delete a customer and its vehicles
    Delete {
        /// Customer ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List birthdays with greeting links
    Birthdays {
        /// Month number (1-12), defaults to the current month
        #[arg(short, long)]
        month: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum InvoicesAction {
    /// List invoices
    List {
        /// Due month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Filter by status: pending, paid
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Generate missing invoices for every active customer
    Generate {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Toggle an invoice between pending and paid
    Toggle {
        /// Invoice ID
        id: i64,
    },

    /// Print the WhatsApp payment reminder link and mark it sent
    Whatsapp {
        /// Invoice ID
        id: i64,
    },

    /// Write the printable invoice to an HTML file
    Render {
        /// Invoice ID
        id: i64,

        /// Output file (defaults to fatura-NNNN.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses
    List {
        /// Due month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Filter by category label
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by status: pending, paid, overdue
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Add an expense
    Add {
        /// Description
        #[arg(short, long)]
        description: String,

        /// Category label (e.g. "Telecomunicações")
        #[arg(short, long)]
        category: String,

        /// Amount in BRL
        #[arg(short, long)]
        amount: f64,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Vendor
        #[arg(long)]
        vendor: Option<String>,
    },

    /// Toggle an expense between paid (today) and pending
    Toggle {
        /// Expense ID
        id: i64,
    },

    /// Mark unpaid expenses past their due date as overdue
    RefreshOverdue,

    /// Write the printable expense list for a month to an HTML file
    Render {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Output file (defaults to despesas-YYYY-MM.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProposalsAction {
    /// List proposals
    List,

    /// Set a proposal status: pending, sent, approved, rejected
    Status {
        /// Proposal ID
        id: i64,

        /// New status
        status: String,
    },

    /// Write the printable proposal to an HTML file
    Render {
        /// Proposal ID
        id: i64,

        /// Output file (defaults to proposta-comercial-NNNN.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Invoice totals for a period
    Invoices {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Expense totals for a period, by status and category
    Expenses {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Paid revenue against paid expenses
    Financial {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Customer base snapshot
    Customers,
}

#[derive(Subcommand)]
pub enum ExportType {
    /// Export invoices to CSV
    Invoices {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Due month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Export expenses to CSV
    Expenses {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Due month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
}
