//! Lince CLI - Back office for a vehicle tracking business
//!
//! Usage:
//!   lince init                          Initialize database
//!   lince invoices generate -m 2025-03  Create the month's invoices
//!   lince report financial -m 2025-03   Paid revenue against paid expenses
//!   lince serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                allowed_origins,
                cli.company.as_deref(),
            )
            .await
        }
        Commands::Dashboard { month } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, month.as_deref(), today)
        }
        Commands::Customers { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_customers_list(&db, None, false),
                Some(CustomersAction::List { search, all }) => {
                    commands::cmd_customers_list(&db, search.as_deref(), all)
                }
                Some(CustomersAction::Show { id }) => commands::cmd_customers_show(&db, id),
                Some(CustomersAction::Toggle { id }) => commands::cmd_customers_toggle(&db, id),
                Some(CustomersAction::Delete { id, yes }) => {
                    commands::cmd_customers_delete(&db, id, yes)
                }
                Some(CustomersAction::Birthdays { month }) => {
                    let company = commands::load_company(cli.company.as_deref())?;
                    commands::cmd_customers_birthdays(&db, &company, month, today)
                }
            }
        }
        Commands::Invoices { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_invoices_list(&db, None, None),
                Some(InvoicesAction::List { month, status }) => {
                    commands::cmd_invoices_list(&db, month.as_deref(), status.as_deref())
                }
                Some(InvoicesAction::Generate { month }) => {
                    commands::cmd_invoices_generate(&db, month.as_deref(), today)
                }
                Some(InvoicesAction::Toggle { id }) => commands::cmd_invoices_toggle(&db, id),
                Some(InvoicesAction::Whatsapp { id }) => {
                    let company = commands::load_company(cli.company.as_deref())?;
                    commands::cmd_invoices_whatsapp(&db, &company, id)
                }
                Some(InvoicesAction::Render { id, output }) => {
                    let company = commands::load_company(cli.company.as_deref())?;
                    commands::cmd_invoices_render(&db, &company, id, output, today)
                }
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_expenses_list(&db, None, None, None, today),
                Some(ExpensesAction::List {
                    month,
                    category,
                    status,
                }) => commands::cmd_expenses_list(
                    &db,
                    month.as_deref(),
                    category.as_deref(),
                    status.as_deref(),
                    today,
                ),
                Some(ExpensesAction::Add {
                    description,
                    category,
                    amount,
                    due,
                    vendor,
                }) => commands::cmd_expenses_add(
                    &db,
                    &description,
                    &category,
                    amount,
                    &due,
                    vendor.as_deref(),
                ),
                Some(ExpensesAction::Toggle { id }) => {
                    commands::cmd_expenses_toggle(&db, id, today)
                }
                Some(ExpensesAction::RefreshOverdue) => {
                    commands::cmd_expenses_refresh_overdue(&db, today)
                }
                Some(ExpensesAction::Render { month, output }) => {
                    let company = commands::load_company(cli.company.as_deref())?;
                    commands::cmd_expenses_render(&db, &company, month.as_deref(), output, today)
                }
            }
        }
        Commands::Proposals { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(ProposalsAction::List) => commands::cmd_proposals_list(&db),
                Some(ProposalsAction::Status { id, status }) => {
                    commands::cmd_proposals_status(&db, id, &status)
                }
                Some(ProposalsAction::Render { id, output }) => {
                    let company = commands::load_company(cli.company.as_deref())?;
                    commands::cmd_proposals_render(&db, &company, id, output, today)
                }
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match report_type {
                ReportType::Invoices { month, from, to } => {
                    let period = commands::resolve_period(
                        month.as_deref(),
                        from.as_deref(),
                        to.as_deref(),
                        today,
                    )?;
                    commands::cmd_report_invoices(&db, &period)
                }
                ReportType::Expenses { month, from, to } => {
                    let period = commands::resolve_period(
                        month.as_deref(),
                        from.as_deref(),
                        to.as_deref(),
                        today,
                    )?;
                    commands::cmd_report_expenses(&db, &period, today)
                }
                ReportType::Financial { month, from, to } => {
                    let period = commands::resolve_period(
                        month.as_deref(),
                        from.as_deref(),
                        to.as_deref(),
                        today,
                    )?;
                    commands::cmd_report_financial(&db, &period)
                }
                ReportType::Customers => commands::cmd_report_customers(&db),
            }
        }
        Commands::Export { export_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match export_type {
                ExportType::Invoices { output, month } => {
                    commands::cmd_export_invoices(&db, output, month.as_deref())
                }
                ExportType::Expenses { output, month } => {
                    commands::cmd_export_expenses(&db, output, month.as_deref())
                }
            }
        }
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
    }
}
