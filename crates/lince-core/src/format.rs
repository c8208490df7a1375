//! Brazilian display formatting and WhatsApp message links
//!
//! Everything here is a pure function over strings and numbers.

use chrono::{Datelike, NaiveDate};

use crate::config::CompanyProfile;

/// Portuguese month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Country code prefixed to WhatsApp numbers
const WHATSAPP_COUNTRY_CODE: &str = "55";

/// Keep only ASCII digits
pub fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format an amount as Brazilian reais, e.g. `R$ 1.234,50`
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Convert an ISO date (`YYYY-MM-DD`) to `DD/MM/YYYY`
///
/// Empty input yields an empty string; anything that is not an ISO date is
/// returned unchanged.
pub fn format_date(iso: &str) -> String {
    let iso = iso.trim();
    if iso.is_empty() {
        return String::new();
    }
    iso.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(format_naive_date)
        .unwrap_or_else(|| iso.to_string())
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Mask an 11-digit mobile number as `(44) 99999-9999`
pub fn format_phone(phone: &str) -> String {
    let d = digits(phone);
    if d.len() == 11 {
        format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..])
    } else {
        phone.to_string()
    }
}

/// Mask a 14-digit CNPJ as `63.061.943/0001-44`
pub fn format_cnpj(cnpj: &str) -> String {
    let d = digits(cnpj);
    if d.len() == 14 {
        format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        )
    } else {
        cnpj.to_string()
    }
}

/// Mask an 11-digit CPF as `123.456.789-01`
pub fn format_cpf(cpf: &str) -> String {
    let d = digits(cpf);
    if d.len() == 11 {
        format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
    } else {
        cpf.to_string()
    }
}

/// Mask a tax document as CNPJ or CPF depending on its length
pub fn format_tax_id(document: &str) -> String {
    match digits(document).len() {
        14 => format_cnpj(document),
        11 => format_cpf(document),
        _ => document.to_string(),
    }
}

/// Mask an 8-digit CEP as `87020-025`
pub fn format_zip(zip: &str) -> String {
    let d = digits(zip);
    if d.len() == 8 {
        format!("{}-{}", &d[..5], &d[5..])
    } else {
        zip.to_string()
    }
}

/// Billing period shown in reminders, `MM/YYYY`
pub fn billing_period(due_date: NaiveDate) -> String {
    due_date.format("%m/%Y").to_string()
}

/// "março de 2025"
pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?");
    format!("{} de {}", name, year)
}

/// Build a `wa.me` deep link with a pre-filled message
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}{}?text={}",
        WHATSAPP_COUNTRY_CODE,
        digits(phone),
        urlencoding::encode(message)
    )
}

/// Monthly payment reminder text
pub fn payment_reminder_message(
    company: &CompanyProfile,
    customer_name: &str,
    due_date: NaiveDate,
    amount: f64,
) -> String {
    format!(
        "Olá, {name}! Tudo bem? 😊\n\n\
         Passando para lembrar, que a mensalidade do serviço de rastreamento veicular da {company} \
         referente ao período [{period}] está disponível para pagamento.\n\n\
         *Valor: {amount}*\n\n\
         Para facilitar, estou enviando o nosso pix.\n\n\
         *CHAVE PIX CNPJ: {pix}*\n\n\
         Caso necessite de boleto por gentileza nos solicitar o envio.\n\n\
         Se o pagamento já foi realizado, pedimos a gentileza de nos encaminhar o comprovante.\n\n\
         Se precisar de qualquer ajuda ou tiver alguma dúvida, estamos à disposição!\n\n\
         Agradecemos pela parceria e confiança em nossos serviços.\n\
         Atenciosamente,\n\
         *Equipe {company}*",
        name = customer_name,
        company = company.name,
        period = billing_period(due_date),
        amount = format_currency(amount),
        pix = company.pix_key,
    )
}

/// Birthday greeting text
pub fn birthday_message(company: &CompanyProfile, customer_name: &str) -> String {
    format!(
        "Olá {name}! 🎉🎂\n\n\
         A equipe da {company} deseja um Feliz Aniversário! 🎈\n\n\
         Que este novo ciclo seja repleto de saúde, paz e realizações!\n\n\
         Obrigado por confiar em nossos serviços!\n\n\
         Abraços,\n\
         Equipe {company}",
        name = customer_name,
        company = company.name,
    )
}

/// Reminder link for an invoice
pub fn payment_reminder_link(
    company: &CompanyProfile,
    phone: &str,
    customer_name: &str,
    due_date: NaiveDate,
    amount: f64,
) -> String {
    whatsapp_link(
        phone,
        &payment_reminder_message(company, customer_name, due_date, amount),
    )
}

/// Birthday greeting link
pub fn birthday_link(company: &CompanyProfile, phone: &str, customer_name: &str) -> String {
    whatsapp_link(phone, &birthday_message(company, customer_name))
}

/// `YYYY-MM` key used to match dates to a month
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parse a `YYYY-MM` month string
pub fn parse_month(s: &str) -> Option<(i32, u32)> {
    let (year, month) = s.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if year < 1 || !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Year and month of a date
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "R$ 1.234,50");
        assert_eq!(format_currency(79.9), "R$ 79,90");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_currency(999.999), "R$ 1.000,00");
        assert_eq!(format_currency(-45.1), "-R$ 45,10");
        assert_eq!(format_currency(f64::NAN), "R$ 0,00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-07"), "07/03/2025");
        assert_eq!(format_date("2025-03-07T10:00:00Z"), "07/03/2025");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("ontem"), "ontem");
        assert_eq!(format_naive_date(date(2024, 12, 1)), "01/12/2024");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("44999999999"), "(44) 99999-9999");
        assert_eq!(format_phone("(44) 99999-9999"), "(44) 99999-9999");
        assert_eq!(format_phone("4433334444"), "4433334444");
    }

    #[test]
    fn test_format_documents() {
        assert_eq!(format_cnpj("63061943000144"), "63.061.943/0001-44");
        assert_eq!(format_cnpj("123"), "123");
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_tax_id("63061943000144"), "63.061.943/0001-44");
        assert_eq!(format_tax_id("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_zip("87020025"), "87020-025");
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(month_label(2025, 3), "março de 2025");
        assert_eq!(month_key(2025, 3), "2025-03");
        assert_eq!(parse_month("2025-03"), Some((2025, 3)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("março"), None);
        assert_eq!(billing_period(date(2025, 3, 10)), "03/2025");
    }

    #[test]
    fn test_whatsapp_link() {
        let link = whatsapp_link("(44) 99999-9999", "Olá, Ana!");
        assert_eq!(link, "https://wa.me/5544999999999?text=Ol%C3%A1%2C%20Ana%21");
    }

    #[test]
    fn test_payment_reminder_message() {
        let company = CompanyProfile::default();
        let msg = payment_reminder_message(&company, "Carlos", date(2025, 3, 10), 79.9);
        assert!(msg.starts_with("Olá, Carlos! Tudo bem? 😊\n\n"));
        assert!(msg.contains("da Lince Track referente ao período [03/2025] está disponível"));
        assert!(msg.contains("*Valor: R$ 79,90*"));
        assert!(msg.contains("*CHAVE PIX CNPJ: 63061943000144*"));
        assert!(msg.ends_with("Atenciosamente,\n*Equipe Lince Track*"));

        let link = payment_reminder_link(&company, "44999999999", "Carlos", date(2025, 3, 10), 79.9);
        assert!(link.starts_with("https://wa.me/5544999999999?text=Ol%C3%A1%2C%20Carlos"));
        assert!(!link.contains('\n'));
    }

    #[test]
    fn test_birthday_message() {
        let company = CompanyProfile::default();
        let msg = birthday_message(&company, "Ana");
        assert!(msg.starts_with("Olá Ana! 🎉🎂"));
        assert!(msg.contains("A equipe da Lince Track deseja um Feliz Aniversário! 🎈"));
        assert!(msg.ends_with("Abraços,\nEquipe Lince Track"));
    }
}
