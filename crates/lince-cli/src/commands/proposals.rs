//! Commercial proposal command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lince_core::{
    db::Database,
    documents::{proposal_pdf_filename, render_proposal},
    format::{format_currency, format_naive_date},
    models::ProposalStatus,
    reports, CompanyProfile,
};

use super::truncate;

pub fn cmd_proposals_list(db: &Database) -> Result<()> {
    let proposals = db.list_proposals()?;

    if proposals.is_empty() {
        println!("No proposals yet.");
        return Ok(());
    }

    println!();
    println!("📑 Proposals");
    println!("   ─────────────────────────────────────────────────────────────");

    for proposal in &proposals {
        let icon = match proposal.status {
            ProposalStatus::Pending => "⏳",
            ProposalStatus::Sent => "📤",
            ProposalStatus::Approved => "✅",
            ProposalStatus::Rejected => "❌",
        };
        println!(
            "   {} {} [{:>4}] {:28} │ {:>3} veículo(s) │ {:>12}/mês │ válida até {}",
            icon,
            proposal.display_number(),
            proposal.id,
            truncate(&proposal.prospect_name, 28),
            proposal.vehicle_count,
            format_currency(proposal.monthly_total()),
            format_naive_date(proposal.valid_until)
        );
    }

    let stats = reports::proposal_stats(&proposals);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} total: {} pending, {} sent, {} approved, {} rejected",
        stats.total, stats.pending, stats.sent, stats.approved, stats.rejected
    );

    Ok(())
}

pub fn cmd_proposals_status(db: &Database, id: i64, status: &str) -> Result<()> {
    let status: ProposalStatus = status.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    db.set_proposal_status(id, status)
        .with_context(|| format!("Failed to update proposal {}", id))?;

    println!("✅ Proposal {} is now {}", id, status.label());
    Ok(())
}

pub fn cmd_proposals_render(
    db: &Database,
    company: &CompanyProfile,
    id: i64,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    let proposal = db
        .get_proposal(id)?
        .with_context(|| format!("Proposal not found: {}", id))?;

    let html = render_proposal(&proposal, company, today);
    let path = output.unwrap_or_else(|| {
        PathBuf::from(proposal_pdf_filename(proposal.number)).with_extension("html")
    });
    fs::write(&path, html)
        .with_context(|| format!("Failed to write proposal: {}", path.display()))?;

    println!("📄 Proposal {} written to {}", proposal.display_number(), path.display());
    println!("   Print it to PDF as {}", proposal_pdf_filename(proposal.number));
    Ok(())
}
