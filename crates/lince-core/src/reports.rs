//! Aggregations over invoices, expenses, customers and proposals
//!
//! Everything here works on records already loaded from the database and is
//! recomputed on each request. Month filters match the `YYYY-MM` prefix of the
//! due date; ranges are inclusive on both ends.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::billing::{first_day, last_day};
use crate::error::{Error, Result};
use crate::format::{month_key, month_label, parse_month};
use crate::models::{
    Birthday, Customer, CustomerSummary, DashboardStats, Expense, ExpenseStatus, ExpenseSummary,
    FinancialSummary, Invoice, InvoiceStatus, InvoiceSummary, Proposal, ProposalStats,
    ProposalStatus, ReportPeriod,
};

/// Number of recent records listed on the dashboard
pub const DASHBOARD_RECENT_LIMIT: usize = 3;

/// A reporting window over due dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month { year: i32, month: u32 },
    Range { from: NaiveDate, to: NaiveDate },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Self {
        Self::Month { year, month }
    }

    /// Month of the given date
    pub fn month_of(date: NaiveDate) -> Self {
        Self::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Resolve query parameters: `month` wins, then `from`/`to`, then the current month
    pub fn resolve(
        month: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        if let Some(month) = month.filter(|m| !m.trim().is_empty()) {
            let (year, month) = parse_month(month).ok_or_else(|| {
                Error::InvalidData(format!("Invalid month: {} (use YYYY-MM)", month))
            })?;
            return Ok(Self::month(year, month));
        }

        let parse = |s: &str, name: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                Error::InvalidData(format!("Invalid '{}' date format (use YYYY-MM-DD)", name))
            })
        };

        match (from, to) {
            (Some(from), Some(to)) => {
                let from = parse(from, "from")?;
                let to = parse(to, "to")?;
                if from > to {
                    return Err(Error::InvalidData(
                        "'from' must not be after 'to'".to_string(),
                    ));
                }
                Ok(Self::Range { from, to })
            }
            (None, None) => Ok(Self::month_of(today)),
            _ => Err(Error::InvalidData(
                "Both 'from' and 'to' are required for a date range".to_string(),
            )),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Month { year, month } => date.year() == year && date.month() == month,
            Self::Range { from, to } => date >= from && date <= to,
        }
    }

    /// First and last day covered
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            Self::Month { year, month } => Ok((first_day(year, month)?, last_day(year, month)?)),
            Self::Range { from, to } => Ok((from, to)),
        }
    }

    pub fn report_period(&self) -> Result<ReportPeriod> {
        let (from, to) = self.bounds()?;
        Ok(ReportPeriod {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Human label: "março de 2025" or "01/03/2025 a 31/03/2025"
    pub fn label(&self) -> String {
        match *self {
            Self::Month { year, month } => month_label(year, month),
            Self::Range { from, to } => format!(
                "{} a {}",
                from.format("%d/%m/%Y"),
                to.format("%d/%m/%Y")
            ),
        }
    }
}

pub fn invoices_in<'a>(invoices: &'a [Invoice], period: &Period) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|i| period.contains(i.due_date))
        .collect()
}

pub fn expenses_in<'a>(expenses: &'a [Expense], period: &Period) -> Vec<&'a Expense> {
    expenses
        .iter()
        .filter(|e| period.contains(e.due_date))
        .collect()
}

/// Count and sum invoices due in the period
pub fn summarize_invoices(invoices: &[Invoice], period: &Period) -> InvoiceSummary {
    invoices_in(invoices, period)
        .into_iter()
        .fold(InvoiceSummary::default(), |mut acc, invoice| {
            acc.count += 1;
            acc.total += invoice.amount;
            match invoice.status {
                InvoiceStatus::Paid => acc.paid += invoice.amount,
                InvoiceStatus::Pending => acc.pending += invoice.amount,
            }
            acc
        })
}

/// Count and sum expenses due in the period, with a per-category breakdown
pub fn summarize_expenses(expenses: &[Expense], period: &Period) -> ExpenseSummary {
    let mut summary = ExpenseSummary::default();
    for expense in expenses_in(expenses, period) {
        summary.count += 1;
        summary.total += expense.amount;
        match expense.status {
            ExpenseStatus::Paid => summary.paid += expense.amount,
            ExpenseStatus::Pending => summary.pending += expense.amount,
            ExpenseStatus::Overdue => summary.overdue += expense.amount,
        }
        *summary
            .by_category
            .entry(expense.category.as_str().to_string())
            .or_insert(0.0) += expense.amount;
    }
    summary
}

/// Customer base snapshot: counts, recurring revenue, tracked vehicles
pub fn summarize_customers(customers: &[Customer]) -> CustomerSummary {
    let active: Vec<&Customer> = customers.iter().filter(|c| c.active).collect();
    CustomerSummary {
        total: customers.len(),
        active: active.len(),
        inactive: customers.len() - active.len(),
        monthly_revenue: active.iter().map(|c| c.monthly_fee).sum(),
        vehicle_count: active.iter().map(|c| c.vehicle_count()).sum(),
    }
}

/// Paid invoices against paid expenses for the period
pub fn financial_summary(
    invoices: &[Invoice],
    expenses: &[Expense],
    period: &Period,
) -> Result<FinancialSummary> {
    let paid_invoices: Vec<Invoice> = invoices_in(invoices, period)
        .into_iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .cloned()
        .collect();
    let paid_expenses: Vec<Expense> = expenses_in(expenses, period)
        .into_iter()
        .filter(|e| e.status == ExpenseStatus::Paid)
        .cloned()
        .collect();

    let revenue: f64 = paid_invoices.iter().map(|i| i.amount).sum();
    let spent: f64 = paid_expenses.iter().map(|e| e.amount).sum();
    let result = revenue - spent;
    let margin_percent = if revenue > 0.0 {
        result / revenue * 100.0
    } else {
        0.0
    };

    Ok(FinancialSummary {
        period: period.report_period()?,
        revenue,
        expenses: spent,
        result,
        margin_percent,
        paid_invoices,
        paid_expenses,
    })
}

/// Month overview for the dashboard
pub fn dashboard(invoices: &[Invoice], expenses: &[Expense], year: i32, month: u32) -> DashboardStats {
    let period = Period::month(year, month);
    let mut month_invoices = invoices_in(invoices, &period);
    let mut month_expenses = expenses_in(expenses, &period);

    let customers: HashSet<i64> = month_invoices.iter().filter_map(|i| i.customer_id).collect();
    let revenue: f64 = month_invoices.iter().map(|i| i.amount).sum();
    let pending_revenue: f64 = month_invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Pending)
        .map(|i| i.amount)
        .sum();
    let paid_revenue: f64 = month_invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum();
    let spent: f64 = month_expenses.iter().map(|e| e.amount).sum();
    let paid_spent: f64 = month_expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Paid)
        .map(|e| e.amount)
        .sum();
    let vehicle_count: i64 = month_invoices.iter().map(|i| i.vehicle_count).sum();

    month_invoices.sort_by(|a, b| b.due_date.cmp(&a.due_date).then(b.id.cmp(&a.id)));
    month_expenses.sort_by(|a, b| b.due_date.cmp(&a.due_date).then(b.id.cmp(&a.id)));

    DashboardStats {
        month: month_key(year, month),
        month_label: month_label(year, month),
        active_customers: customers.len(),
        revenue,
        pending_revenue,
        expenses: spent,
        result: paid_revenue - paid_spent,
        vehicle_count,
        recent_invoices: month_invoices
            .into_iter()
            .take(DASHBOARD_RECENT_LIMIT)
            .cloned()
            .collect(),
        recent_expenses: month_expenses
            .into_iter()
            .take(DASHBOARD_RECENT_LIMIT)
            .cloned()
            .collect(),
    }
}

pub fn proposal_stats(proposals: &[Proposal]) -> ProposalStats {
    let count = |status: ProposalStatus| proposals.iter().filter(|p| p.status == status).count();
    ProposalStats {
        total: proposals.len(),
        pending: count(ProposalStatus::Pending),
        sent: count(ProposalStatus::Sent),
        approved: count(ProposalStatus::Approved),
        rejected: count(ProposalStatus::Rejected),
    }
}

/// Customers born in `month`, ordered by day of month
pub fn birthdays(customers: &[Customer], month: u32, today: NaiveDate) -> Vec<Birthday> {
    let mut list: Vec<Birthday> = customers
        .iter()
        .filter_map(|c| {
            let birth_date = c.birth_date?;
            (birth_date.month() == month).then(|| Birthday {
                customer_id: c.id,
                name: c.name.clone(),
                phone: c.phone.clone(),
                birth_date,
                day: birth_date.day(),
                age: today.year() - birth_date.year(),
            })
        })
        .collect();
    list.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.name.cmp(&b.name)));
    list
}

/// Case-insensitive match on name, or substring match on tax id or phone
pub fn search_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    let term = term.trim();
    if term.is_empty() {
        return customers.iter().collect();
    }
    let lowered = term.to_lowercase();
    customers
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&lowered)
                || c.tax_id.contains(term)
                || c.phone.contains(term)
        })
        .collect()
}
