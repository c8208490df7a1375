//! Domain models for Lince

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed description used for generated monthly invoices
pub const MONTHLY_INVOICE_DESCRIPTION: &str =
    "Loc. Equipamento e Software para Rastreamento Veicular";

/// Default monthly fee for new customers (BRL)
pub const DEFAULT_MONTHLY_FEE: f64 = 79.90;

/// Default due day for new customers
pub const DEFAULT_DUE_DAY: &str = "10";

/// Default state (UF) for customers and prospects
pub const DEFAULT_STATE: &str = "PR";

/// Days a commercial proposal stays valid after creation
pub const PROPOSAL_VALIDITY_DAYS: i64 = 30;

/// Equipment choices offered in commercial proposals
pub const EQUIPMENT_OPTIONS: [&str; 3] = [
    "Rastreador 4G Convencional",
    "Rastreador 4G com Bloqueio",
    "Rastreador 5G Premium",
];

/// Plan choices offered in commercial proposals
pub const PLAN_OPTIONS: [&str; 3] = ["Plano Básico", "Plano Intermediário", "Plano Premium"];

fn default_state() -> String {
    DEFAULT_STATE.to_string()
}

fn default_monthly_fee() -> f64 {
    DEFAULT_MONTHLY_FEE
}

fn default_due_day() -> String {
    DEFAULT_DUE_DAY.to_string()
}

fn default_true() -> bool {
    true
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidData(format!("{} is required", field)));
    }
    Ok(())
}

fn require_amount(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidData(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

/// Parse a due day string ("1" through "31")
pub fn parse_due_day(due_day: &str) -> Result<u32> {
    match due_day.trim().parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => Ok(day),
        _ => Err(Error::InvalidData(format!(
            "Invalid due day: {} (expected 1-31)",
            due_day
        ))),
    }
}

// ============================================================================
// Customers and vehicles
// ============================================================================

/// A tracked vehicle owned by a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub customer_id: i64,
    pub description: String,
    pub plate: String,
    pub tracker_model: String,
    /// Tracker IMEI
    pub device_id: String,
    /// Whether the tracker can block the engine
    pub has_lock: bool,
    pub chip_number: String,
}

/// Vehicle data submitted with a customer or on its own
///
/// When saved together with a customer, entries carrying an `id` update the
/// existing vehicle and entries without one are inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub tracker_model: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub has_lock: bool,
    #[serde(default)]
    pub chip_number: String,
}

impl VehicleInput {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() && self.plate.trim().is_empty() {
            return Err(Error::InvalidData(
                "Vehicle needs a description or a plate".to_string(),
            ));
        }
        Ok(())
    }
}

/// A customer of the tracking service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// CNPJ or CPF
    pub tax_id: String,
    pub state_registration: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub monthly_fee: f64,
    /// Day of month the invoice is due, "1" through "31"
    pub due_day: String,
    pub active: bool,
    /// Login on the tracking platform
    pub platform_login: Option<String>,
    pub vehicles: Vec<Vehicle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}

/// Customer data for create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub tax_id: String,
    #[serde(default)]
    pub state_registration: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default = "default_monthly_fee")]
    pub monthly_fee: f64,
    #[serde(default = "default_due_day")]
    pub due_day: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub platform_login: Option<String>,
    #[serde(default)]
    pub vehicles: Vec<VehicleInput>,
}

impl NewCustomer {
    /// Minimal customer with the form defaults applied
    pub fn new(name: &str, tax_id: &str, phone: &str) -> Self {
        Self {
            name: name.to_string(),
            tax_id: tax_id.to_string(),
            state_registration: None,
            birth_date: None,
            phone: phone.to_string(),
            email: None,
            address: String::new(),
            district: String::new(),
            city: String::new(),
            state: default_state(),
            zip_code: None,
            monthly_fee: DEFAULT_MONTHLY_FEE,
            due_day: default_due_day(),
            active: true,
            platform_login: None,
            vehicles: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.name, "name")?;
        require(&self.tax_id, "tax_id")?;
        require(&self.phone, "phone")?;
        require_amount(self.monthly_fee, "monthly_fee")?;
        parse_due_day(&self.due_day)?;
        for vehicle in &self.vehicles {
            vehicle.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Invoices
// ============================================================================

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Portuguese label shown on documents and in the CLI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Pending => Self::Paid,
            Self::Paid => Self::Pending,
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendente" => Ok(Self::Pending),
            "paid" | "pago" => Ok(Self::Paid),
            _ => Err(format!("Unknown invoice status: {}", s)),
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monthly invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    /// None once the customer has been deleted
    pub customer_id: Option<i64>,
    /// Customer name at the time the invoice was issued
    pub customer_name: String,
    pub description: String,
    pub amount: f64,
    pub vehicle_count: i64,
    pub due_date: NaiveDate,
    pub issue_date: NaiveDate,
    pub status: InvoiceStatus,
    pub whatsapp_sent: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Invoice number as printed on the document (last four digits of the id)
    pub fn display_number(&self) -> String {
        let padded = format!("{:04}", self.id);
        padded[padded.len() - 4..].to_string()
    }
}

/// Invoice data for manual create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub customer_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub vehicle_count: Option<i64>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewInvoice {
    pub fn validate(&self) -> Result<()> {
        require_amount(self.amount, "amount")?;
        if let Some(count) = self.vehicle_count {
            if count < 0 {
                return Err(Error::InvalidData(
                    "vehicle_count cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of a monthly invoice generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub year: i32,
    pub month: u32,
    /// Invoices inserted by this run
    pub created: usize,
    /// Active customers that already had an invoice for the month
    pub skipped: usize,
    /// Active customers left out because their due day is unusable
    pub invalid_due_day: usize,
    pub message: String,
}

impl GenerationResult {
    pub fn new(
        year: i32,
        month: u32,
        created: usize,
        skipped: usize,
        invalid_due_day: usize,
    ) -> Self {
        let mut message = if created > 0 {
            format!("{} fatura(s) gerada(s) com sucesso!", created)
        } else if skipped == 0 && invalid_due_day > 0 {
            "Nenhuma fatura gerada.".to_string()
        } else {
            "Todas as faturas deste mês já foram geradas.".to_string()
        };
        if invalid_due_day > 0 {
            message.push_str(&format!(
                " {} cliente(s) com dia de vencimento inválido.",
                invalid_due_day
            ));
        }
        Self {
            year,
            month,
            created,
            skipped,
            invalid_due_day,
            message,
        }
    }
}

// ============================================================================
// Expenses
// ============================================================================

/// Expense payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
            Self::Overdue => "Atrasado",
        }
    }
}

impl std::str::FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendente" => Ok(Self::Pending),
            "paid" | "pago" => Ok(Self::Paid),
            "overdue" | "atrasado" => Ok(Self::Overdue),
            _ => Err(format!("Unknown expense status: {}", s)),
        }
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense categories (stored by their Portuguese label)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Infraestrutura")]
    Infrastructure,
    #[serde(rename = "Telecomunicações")]
    Telecom,
    #[serde(rename = "Equipamentos")]
    Equipment,
    #[serde(rename = "Manutenção")]
    Maintenance,
    #[serde(rename = "Marketing")]
    Marketing,
    #[serde(rename = "Pessoal")]
    Staff,
    #[serde(rename = "Impostos")]
    Taxes,
    #[serde(rename = "Escritório")]
    Office,
    #[serde(rename = "Combustível")]
    Fuel,
    #[serde(rename = "Instalações de Rastreador")]
    TrackerInstallation,
    #[serde(rename = "Outros")]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 11] = [
        Self::Infrastructure,
        Self::Telecom,
        Self::Equipment,
        Self::Maintenance,
        Self::Marketing,
        Self::Staff,
        Self::Taxes,
        Self::Office,
        Self::Fuel,
        Self::TrackerInstallation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infraestrutura",
            Self::Telecom => "Telecomunicações",
            Self::Equipment => "Equipamentos",
            Self::Maintenance => "Manutenção",
            Self::Marketing => "Marketing",
            Self::Staff => "Pessoal",
            Self::Taxes => "Impostos",
            Self::Office => "Escritório",
            Self::Fuel => "Combustível",
            Self::TrackerInstallation => "Instalações de Rastreador",
            Self::Other => "Outros",
        }
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown expense category: {}", s))
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A business expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: ExpenseStatus,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expense data for create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        require(&self.description, "description")?;
        if !self.amount.is_finite() || self.amount == 0.0 {
            return Err(Error::InvalidData(
                "amount must be a non-zero number".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Commercial proposals
// ============================================================================

/// Whether the prospect is an individual (CPF) or a company (CNPJ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
    #[default]
    Individual,
    Company,
}

impl PersonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Individual => "PESSOA FÍSICA",
            Self::Company => "PESSOA JURÍDICA",
        }
    }

    /// Name of the tax document for this person type
    pub fn document_label(&self) -> &'static str {
        match self {
            Self::Individual => "CPF",
            Self::Company => "CNPJ",
        }
    }
}

impl std::str::FromStr for PersonType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" | "fisica" | "física" => Ok(Self::Individual),
            "company" | "juridica" | "jurídica" => Ok(Self::Company),
            _ => Err(format!("Unknown person type: {}", s)),
        }
    }
}

impl std::fmt::Display for PersonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Proposal negotiation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Pending,
    Sent,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Sent => "Enviada",
            Self::Approved => "Aprovada",
            Self::Rejected => "Recusada",
        }
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendente" => Ok(Self::Pending),
            "sent" | "enviada" => Ok(Self::Sent),
            "approved" | "aprovada" => Ok(Self::Approved),
            "rejected" | "recusada" => Ok(Self::Rejected),
            _ => Err(format!("Unknown proposal status: {}", s)),
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A commercial proposal sent to a prospect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    pub number: i64,
    pub person_type: PersonType,
    pub prospect_name: String,
    pub prospect_contact: String,
    pub prospect_email: String,
    pub prospect_phone: String,
    /// CPF or CNPJ depending on `person_type`
    pub prospect_document: String,
    pub prospect_city: String,
    pub prospect_state: String,
    pub equipment_type: String,
    pub plan: String,
    /// Monthly price per vehicle
    pub monthly_price: f64,
    pub vehicle_count: i64,
    pub free_installation: bool,
    pub installation_price: Option<f64>,
    pub permanence_months: i64,
    pub notes: Option<String>,
    pub status: ProposalStatus,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    pub fn monthly_total(&self) -> f64 {
        self.monthly_price * self.vehicle_count as f64
    }

    /// Number as shown in listings, e.g. `#0001`
    pub fn display_number(&self) -> String {
        format!("#{:04}", self.number)
    }
}

fn default_equipment() -> String {
    EQUIPMENT_OPTIONS[0].to_string()
}

fn default_plan() -> String {
    PLAN_OPTIONS[0].to_string()
}

fn default_monthly_price() -> f64 {
    39.90
}

fn default_vehicle_count() -> i64 {
    1
}

fn default_permanence() -> i64 {
    12
}

/// Proposal data for create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProposal {
    #[serde(default)]
    pub person_type: PersonType,
    pub prospect_name: String,
    #[serde(default)]
    pub prospect_contact: String,
    #[serde(default)]
    pub prospect_email: String,
    pub prospect_phone: String,
    pub prospect_document: String,
    #[serde(default)]
    pub prospect_city: String,
    #[serde(default = "default_state")]
    pub prospect_state: String,
    #[serde(default = "default_equipment")]
    pub equipment_type: String,
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default = "default_monthly_price")]
    pub monthly_price: f64,
    #[serde(default = "default_vehicle_count")]
    pub vehicle_count: i64,
    #[serde(default = "default_true")]
    pub free_installation: bool,
    #[serde(default)]
    pub installation_price: Option<f64>,
    #[serde(default = "default_permanence")]
    pub permanence_months: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ProposalStatus,
}

impl NewProposal {
    /// Proposal with the form defaults applied
    pub fn new(prospect_name: &str, prospect_phone: &str, prospect_document: &str) -> Self {
        Self {
            person_type: PersonType::default(),
            prospect_name: prospect_name.to_string(),
            prospect_contact: String::new(),
            prospect_email: String::new(),
            prospect_phone: prospect_phone.to_string(),
            prospect_document: prospect_document.to_string(),
            prospect_city: String::new(),
            prospect_state: default_state(),
            equipment_type: default_equipment(),
            plan: default_plan(),
            monthly_price: default_monthly_price(),
            vehicle_count: default_vehicle_count(),
            free_installation: true,
            installation_price: None,
            permanence_months: default_permanence(),
            notes: None,
            status: ProposalStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.prospect_name, "prospect_name")?;
        require(&self.prospect_phone, "prospect_phone")?;
        require(&self.prospect_document, "prospect_document")?;
        require_amount(self.monthly_price, "monthly_price")?;
        if self.vehicle_count < 1 {
            return Err(Error::InvalidData(
                "vehicle_count must be at least 1".to_string(),
            ));
        }
        if self.permanence_months < 1 {
            return Err(Error::InvalidData(
                "permanence_months must be at least 1".to_string(),
            ));
        }
        if !self.free_installation {
            match self.installation_price {
                Some(price) => require_amount(price, "installation_price")?,
                None => {
                    return Err(Error::InvalidData(
                        "installation_price is required when installation is not free"
                            .to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Report period (inclusive dates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub from: String,
    pub to: String,
}

/// Invoice totals for a period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub count: usize,
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
}

/// Expense totals for a period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    pub overdue: f64,
    /// Category label -> total amount
    pub by_category: BTreeMap<String, f64>,
}

/// Customer base snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Sum of monthly fees of active customers
    pub monthly_revenue: f64,
    /// Vehicles owned by active customers
    pub vehicle_count: usize,
}

/// Cash result for a period: paid invoices against paid expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub period: ReportPeriod,
    pub revenue: f64,
    pub expenses: f64,
    pub result: f64,
    /// Result as a percentage of revenue (0 when there is no revenue)
    pub margin_percent: f64,
    pub paid_invoices: Vec<Invoice>,
    pub paid_expenses: Vec<Expense>,
}

/// Month overview shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// `YYYY-MM`
    pub month: String,
    pub month_label: String,
    /// Distinct customers invoiced in the month
    pub active_customers: usize,
    pub revenue: f64,
    pub pending_revenue: f64,
    pub expenses: f64,
    /// Paid invoices minus paid expenses
    pub result: f64,
    pub vehicle_count: i64,
    pub recent_invoices: Vec<Invoice>,
    pub recent_expenses: Vec<Expense>,
}

/// Counters by proposal status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalStats {
    pub total: usize,
    pub pending: usize,
    pub sent: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// A customer with a birthday in the selected month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Birthday {
    pub customer_id: i64,
    pub name: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub day: u32,
    /// Age completed this year
    pub age: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_day() {
        assert_eq!(parse_due_day("10").unwrap(), 10);
        assert_eq!(parse_due_day(" 1 ").unwrap(), 1);
        assert_eq!(parse_due_day("31").unwrap(), 31);
        assert!(parse_due_day("0").is_err());
        assert!(parse_due_day("32").is_err());
        assert!(parse_due_day("dez").is_err());
    }

    #[test]
    fn test_invoice_status_toggle() {
        assert_eq!(InvoiceStatus::Pending.toggled(), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::Paid.toggled(), InvoiceStatus::Pending);
        assert_eq!("pago".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_expense_category_labels() {
        for category in ExpenseCategory::ALL {
            let parsed: ExpenseCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!(
            "combustível".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::Fuel
        );
        assert!("Viagens".parse::<ExpenseCategory>().is_err());

        let json = serde_json::to_string(&ExpenseCategory::Telecom).unwrap();
        assert_eq!(json, "\"Telecomunicações\"");
    }

    #[test]
    fn test_new_customer_defaults_from_json() {
        let customer: NewCustomer = serde_json::from_str(
            r#"{"name": "Transportes Silva", "tax_id": "63061943000144", "phone": "44999999999"}"#,
        )
        .unwrap();
        assert_eq!(customer.monthly_fee, DEFAULT_MONTHLY_FEE);
        assert_eq!(customer.due_day, "10");
        assert_eq!(customer.state, "PR");
        assert!(customer.active);
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn test_new_customer_validation() {
        let mut customer = NewCustomer::new("", "123", "44999999999");
        assert!(customer.validate().is_err());

        customer.name = "Maria".to_string();
        customer.due_day = "40".to_string();
        assert!(customer.validate().is_err());

        customer.due_day = "5".to_string();
        customer.vehicles.push(VehicleInput::default());
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_new_expense_rejects_zero_amount() {
        let expense = NewExpense {
            description: "Chips M2M".to_string(),
            category: ExpenseCategory::Telecom,
            amount: 0.0,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            payment_date: None,
            status: ExpenseStatus::Pending,
            vendor: None,
            notes: None,
        };
        assert!(expense.validate().is_err());
    }

    #[test]
    fn test_new_proposal_defaults_and_validation() {
        let proposal: NewProposal = serde_json::from_str(
            r#"{"prospect_name": "João", "prospect_phone": "44988887777", "prospect_document": "12345678901"}"#,
        )
        .unwrap();
        assert_eq!(proposal.equipment_type, "Rastreador 4G Convencional");
        assert_eq!(proposal.plan, "Plano Básico");
        assert_eq!(proposal.monthly_price, 39.90);
        assert_eq!(proposal.vehicle_count, 1);
        assert_eq!(proposal.permanence_months, 12);
        assert!(proposal.free_installation);
        assert!(proposal.validate().is_ok());

        let mut paid_install = proposal.clone();
        paid_install.free_installation = false;
        assert!(paid_install.validate().is_err());
        paid_install.installation_price = Some(150.0);
        assert!(paid_install.validate().is_ok());
    }

    #[test]
    fn test_generation_result_message() {
        assert_eq!(
            GenerationResult::new(2025, 3, 2, 0, 0).message,
            "2 fatura(s) gerada(s) com sucesso!"
        );
        assert_eq!(
            GenerationResult::new(2025, 3, 0, 5, 0).message,
            "Todas as faturas deste mês já foram geradas."
        );
        assert_eq!(
            GenerationResult::new(2025, 3, 0, 0, 1).message,
            "Nenhuma fatura gerada. 1 cliente(s) com dia de vencimento inválido."
        );
        assert_eq!(
            GenerationResult::new(2025, 3, 2, 0, 1).message,
            "2 fatura(s) gerada(s) com sucesso! 1 cliente(s) com dia de vencimento inválido."
        );
    }
}
