//! Printable HTML documents: invoice, commercial proposal and expense list
//!
//! Each renderer returns a complete standalone HTML page meant to be printed
//! or saved as PDF from the browser. Every interpolated value goes through
//! [`escape_html`].

use chrono::NaiveDate;

use crate::config::CompanyProfile;
use crate::format::{format_currency, format_naive_date, format_phone, format_tax_id, format_zip};
use crate::models::{Customer, Expense, ExpenseStatus, Invoice, PersonType, Proposal};

/// Features listed on every commercial proposal
pub const PROPOSAL_FEATURES: [&str; 12] = [
    "Acesso ilimitado ao portal de rastreamento, via Internet, 24hs dia/7dias semana",
    "Plataforma com acesso exclusivo e restrito para sua Empresa através de um link enviado com login e senha, e também pelo nosso aplicativo para celular",
    "Central 24 Horas, 7 dias por semana, para atendimento em caso de Roubo ou Furto",
    "Gestão de manutenção preventiva",
    "Opções de Mapas detalhado",
    "Relatórios das ruas percorridas pelo veículo com velocidade",
    "Relatórios com históricos dos veículos por data ou período",
    "Criação de Cercas Eletrônicas",
    "Relatório de deslocamento e Paradas",
    "Cobertura via GPS em todo território nacional",
    "Mapas com sobreposição de camadas",
    "Envio de alertas via Aplicativo",
];

const PROPOSAL_INFO: [(&str, &str); 5] = [
    (
        "Comodato",
        "Equipamento em regime de comodato durante o período de contrato",
    ),
    (
        "Cobertura Nacional",
        "Sistema funciona em todo território nacional via GPS/GPRS",
    ),
    (
        "Suporte 24/7",
        "Central de atendimento disponível 24 horas por dia, 7 dias por semana",
    ),
    (
        "Aplicativo Mobile",
        "Acesso via aplicativo iOS e Android incluído",
    ),
    (
        "Garantia",
        "Equipamento com garantia contra defeitos de fabricação",
    ),
];

const INSTALLATION_TEXT: &str = "Trabalhamos com as melhores práticas do mercado para garantir a eficiência e discrição do sistema. \
     Utilizamos materiais de alta qualidade e técnicas avançadas de instalação. O equipamento é \
     estrategicamente posicionado em locais ocultos do veículo, como parte interna dos bancos, \
     porta-malas, painéis ou outros compartimentos seguros, fugindo do padrão convencional. \
     Essa abordagem maximiza a proteção contra tentativas de remoção e garante o funcionamento \
     contínuo do rastreador.";

const SIGNAL_TEXT: &str = "Utilizamos a infraestrutura da Algar Telecom com tecnologia multi-operadora, contando com \
     conexão simultânea de até 5 operadoras diferentes. Isso significa que seu veículo estará \
     sempre conectado, mesmo em áreas remotas ou de difícil cobertura. Essa redundância elimina \
     praticamente todos os pontos cegos e áreas sem cobertura, proporcionando rastreamento \
     ininterrupto em todo o território nacional com a máxima confiabilidade.";

const BASE_CSS: &str = r#"
    * { box-sizing: border-box; -webkit-print-color-adjust: exact; print-color-adjust: exact; }
    body { font-family: Arial, Helvetica, sans-serif; color: #1f2937; font-size: 13px; margin: 0; padding: 24px; }
    h1 { font-size: 22px; margin: 0; }
    h3 { font-size: 15px; background: #f3f4f6; padding: 6px 8px; margin: 18px 0 8px; }
    table { width: 100%; border-collapse: collapse; }
    th, td { border: 1px solid #1f2937; padding: 6px 8px; }
    th { background: #e5e7eb; }
    .right { text-align: right; }
    .center { text-align: center; }
    .muted { color: #6b7280; font-size: 11px; }
    .header { display: flex; justify-content: space-between; border-bottom: 2px solid #1f2937; padding-bottom: 12px; margin-bottom: 12px; }
    .box { border: 1px solid #9ca3af; padding: 12px; margin-bottom: 16px; background: #f9fafb; }
    .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 8px 24px; }
    .avoid-break { page-break-inside: avoid; break-inside: avoid; }
    .page-break { page-break-before: always; break-before: page; }
"#;

/// Escape text for safe interpolation into HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Suggested filename when saving a proposal as PDF
pub fn proposal_pdf_filename(number: i64) -> String {
    format!("proposta-comercial-{:04}.pdf", number)
}

/// Suggested filename for a printed invoice
pub fn invoice_filename(invoice: &Invoice) -> String {
    format!("fatura-{}.html", invoice.display_number())
}

fn page(title: &str, extra_css: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        BASE_CSS,
        extra_css,
        body
    )
}

fn company_header(company: &CompanyProfile, show_cnpj: bool) -> String {
    let mut html = format!(
        "<div><h1>{}</h1><p class=\"muted\">{}</p>",
        escape_html(&company.name.to_uppercase()),
        escape_html(&company.tagline)
    );
    if show_cnpj {
        html.push_str(&format!(
            "<p class=\"muted\">CNPJ: {}</p>",
            escape_html(&format_tax_id(&company.cnpj))
        ));
    }
    html.push_str("</div>");
    html
}

/// Render the printable invoice for one customer
pub fn render_invoice(
    invoice: &Invoice,
    customer: &Customer,
    company: &CompanyProfile,
    today: NaiveDate,
) -> String {
    let e = escape_html;
    let amount = e(&format_currency(invoice.amount));
    let mut body = String::new();

    body.push_str("<div class=\"header\">");
    body.push_str(&company_header(company, false));
    body.push_str(&format!(
        "<div class=\"right\">\
         <div style=\"border: 1px solid #1f2937; padding: 6px 12px; display: inline-block; text-align: center;\">\
         <p style=\"margin: 0; font-size: 11px; font-weight: bold;\">NOTA Nº FATURA</p>\
         <p style=\"margin: 0; font-size: 18px; font-weight: bold;\">{}</p></div>\
         <p><strong>VENCIMENTO:</strong> {}</p>\
         <p>Data de emissão: {}</p></div>",
        e(&invoice.display_number()),
        e(&format_naive_date(invoice.due_date)),
        e(&format_naive_date(invoice.issue_date)),
    ));
    body.push_str("</div>\n");

    // Issuer
    body.push_str(&format!(
        "<div style=\"font-size: 11px; margin-bottom: 16px;\">\
         <p><strong>{}</strong></p>\
         <p>{}, {}</p>\
         <p>CEP: {} | CONTATO: {} | e-mail: {}</p>\
         <p><strong>CNPJ: {}</strong> | Inscrição Estadual: {}</p></div>\n",
        e(&company.name.to_uppercase()),
        e(&company.address),
        e(&company.locality()),
        e(&format_zip(&company.zip_code)),
        e(&company.phone),
        e(&company.email),
        e(&format_tax_id(&company.cnpj)),
        e(&company.state_registration),
    ));

    // Recipient
    body.push_str(&format!(
        "<div class=\"box\"><h3 style=\"margin-top: 0;\">DESTINATÁRIO</h3><div class=\"grid\">\
         <p><strong>Nome/Razão Social:</strong> {}</p>\
         <p><strong>CNPJ:</strong> {}</p>\
         <p><strong>Endereço:</strong> {}</p>\
         <p><strong>Bairro:</strong> {}</p>\
         <p><strong>Cidade:</strong> {}</p>\
         <p><strong>UF:</strong> {}</p></div></div>\n",
        e(&customer.name),
        e(&format_tax_id(&customer.tax_id)),
        e(&customer.address),
        e(&customer.district),
        e(&customer.city),
        e(&customer.state),
    ));

    body.push_str(
        "<div style=\"margin-bottom: 16px;\"><p><strong>Referente a solicitação de fornecimento</strong></p>\
         <p>Fornecimento de equipamento e software para rastreamento veicular.</p></div>\n",
    );

    body.push_str(&format!(
        "<div style=\"background: #f3f4f6; padding: 10px; margin-bottom: 16px;\">\
         <p><strong>Dados Bancários:</strong></p>\
         <p style=\"font-size: 16px;\">PIX CNPJ: {}</p>\
         <p>Banco {}</p><p class=\"muted\">Ou Boleto.</p></div>\n",
        e(&format_tax_id(&company.pix_key)),
        e(&company.bank),
    ));

    body.push_str(&format!(
        "<table><thead><tr><th style=\"text-align: left;\">Descrição</th><th class=\"center\">Qtde.</th>\
         <th class=\"right\">Vlr Unit.</th><th class=\"right\">TOTAL</th></tr></thead>\
         <tbody><tr><td>{}</td><td class=\"center\">1</td><td class=\"right\">{}</td>\
         <td class=\"right\"><strong>{}</strong></td></tr></tbody></table>\n",
        e(&invoice.description),
        amount,
        amount,
    ));

    body.push_str(&format!(
        "<table style=\"width: 50%; margin: 24px 0 24px auto;\">\
         <tr><td>Retenção de ISSQN:</td><td class=\"right\">NÃO</td></tr>\
         <tr><td>Valor da Retenção:</td><td class=\"right\">R$ 0,00</td></tr>\
         <tr><th style=\"text-align: left;\">TOTAL GERAL:</th><th class=\"right\">{}</th></tr></table>\n",
        amount,
    ));

    body.push_str(&format!(
        "<div class=\"center muted\" style=\"border-top: 1px solid #d1d5db; padding-top: 12px;\">\
         <p>Operação não sujeita a emissão de nota fiscal de serviço - Vetada a cobrança de ISSQN conforme lei complementar 116/2003</p>\
         <p>Documento emitido por ME ou EPP Optante pelo Simples Nacional</p>\
         <p><strong>{} - {}, {}</strong></p></div>\n",
        e(&customer.city),
        e(&customer.state),
        e(&format_naive_date(today)),
    ));

    page(&format!("Fatura {}", invoice.display_number()), "", &body)
}

/// Render the commercial proposal sent to a prospect
pub fn render_proposal(proposal: &Proposal, company: &CompanyProfile, today: NaiveDate) -> String {
    let e = escape_html;
    let mut body = String::new();

    body.push_str("<div class=\"header\">");
    body.push_str(&company_header(company, true));
    body.push_str(&format!(
        "<div class=\"right\"><p>Proposta Comercial</p>\
         <p style=\"font-size: 22px; font-weight: bold; margin: 0;\">{}</p>\
         <p class=\"muted\">Data: {}</p><p class=\"muted\">Validade: {}</p></div>",
        e(&proposal.display_number()),
        e(&format_naive_date(proposal.created_at.date_naive())),
        e(&format_naive_date(proposal.valid_until)),
    ));
    body.push_str("</div>\n");

    let name_label = match proposal.person_type {
        PersonType::Individual => "Nome Completo",
        PersonType::Company => "Empresa",
    };
    body.push_str(&format!(
        "<div class=\"avoid-break\"><h3>DADOS DO CLIENTE - {}</h3><div class=\"grid\">\
         <p><span class=\"muted\">{}</span><br><strong>{}</strong></p>\
         <p><span class=\"muted\">Contato</span><br><strong>{}</strong></p>\
         <p><span class=\"muted\">Email</span><br><strong>{}</strong></p>\
         <p><span class=\"muted\">Telefone</span><br><strong>{}</strong></p>\
         <p><span class=\"muted\">{}</span><br><strong>{}</strong></p>\
         <p><span class=\"muted\">Localização</span><br><strong>{}/{}</strong></p>\
         </div></div>\n",
        proposal.person_type.label(),
        name_label,
        e(&proposal.prospect_name),
        e(&proposal.prospect_contact),
        e(&proposal.prospect_email),
        e(&format_phone(&proposal.prospect_phone)),
        proposal.person_type.document_label(),
        e(&format_tax_id(&proposal.prospect_document)),
        e(&proposal.prospect_city),
        e(&proposal.prospect_state),
    ));

    let installation = if proposal.free_installation {
        "GRATUITA".to_string()
    } else {
        format_currency(proposal.installation_price.unwrap_or(0.0))
    };
    body.push_str(&format!(
        "<div class=\"avoid-break\"><h3>DETALHES DA PROPOSTA</h3><table>\
         <tr><td>Equipamento</td><td><strong>{}</strong></td></tr>\
         <tr><td>Plano</td><td><strong>{}</strong></td></tr>\
         <tr><td>Valor Unitário</td><td><strong>{}/mês</strong></td></tr>\
         <tr><td>Quantidade de Veículos</td><td><strong>{} veículo(s)</strong></td></tr>\
         <tr><td>Valor Mensal Total</td><td><strong style=\"font-size: 18px;\">{}</strong></td></tr>\
         <tr><td>Instalação</td><td><strong>{}</strong></td></tr>\
         <tr><td>Prazo de Permanência</td><td><strong>{} meses</strong></td></tr>\
         <tr><td>Validade da Proposta</td><td><strong>{}</strong></td></tr>\
         </table></div>\n",
        e(&proposal.equipment_type),
        e(&proposal.plan),
        e(&format_currency(proposal.monthly_price)),
        proposal.vehicle_count,
        e(&format_currency(proposal.monthly_total())),
        e(&installation),
        proposal.permanence_months,
        e(&format_naive_date(proposal.valid_until)),
    ));

    body.push_str(&format!(
        "<div class=\"avoid-break\"><h3>INSTALAÇÃO E SINAL GPS/GPRS</h3>\
         <h4>🔧 Instalação Profissional</h4><p>{}</p>\
         <h4>📡 Cobertura de Sinal Premium</h4><p>{}</p></div>\n",
        e(INSTALLATION_TEXT),
        e(SIGNAL_TEXT),
    ));

    body.push_str("<div class=\"page-break\"><h3>RECURSOS INCLUÍDOS</h3><ul style=\"list-style: none; padding: 0;\">");
    for feature in PROPOSAL_FEATURES {
        body.push_str(&format!("<li>✓ {}</li>", e(feature)));
    }
    body.push_str("</ul></div>\n");

    body.push_str("<div class=\"avoid-break\"><h3>INFORMAÇÕES IMPORTANTES</h3>");
    for (title, text) in PROPOSAL_INFO {
        body.push_str(&format!("<p>• <strong>{}:</strong> {}</p>", e(title), e(text)));
    }
    body.push_str("</div>\n");

    if let Some(notes) = proposal.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!(
            "<div class=\"avoid-break\"><h3>OBSERVAÇÕES</h3><p style=\"white-space: pre-wrap;\">{}</p></div>\n",
            e(notes)
        ));
    }

    body.push_str(&format!(
        "<div class=\"center avoid-break\" style=\"border-top: 2px solid #d1d5db; margin-top: 32px; padding-top: 16px;\">\
         <p>Estamos à disposição para esclarecer quaisquer dúvidas sobre nossa proposta.</p>\
         <p><strong>Aguardamos ansiosamente seu retorno para iniciarmos nossa parceria!</strong></p>\
         <p><strong>{} RASTREAMENTO</strong></p><p>CNPJ: {}</p><p>Email: {}</p><p>Telefone: {}</p>\
         <p class=\"muted\">{}, {}</p></div>\n",
        e(&company.name.to_uppercase()),
        e(&format_tax_id(&company.cnpj)),
        e(&company.commercial_email),
        e(&company.phone),
        e(&company.locality()),
        e(&format_naive_date(today)),
    ));

    page(
        &format!("Proposta Comercial {}", proposal.display_number()),
        "@page { size: A4; margin: 1.5cm; }",
        &body,
    )
}

/// Render the printable expense list for a period
pub fn render_expense_list(expenses: &[Expense], period_label: &str, company: &CompanyProfile) -> String {
    let e = escape_html;
    let mut body = String::new();

    body.push_str("<div class=\"header\">");
    body.push_str(&company_header(company, true));
    body.push_str(&format!(
        "<div class=\"right\"><p><strong>Relatório de Despesas</strong></p><p>{}</p></div>",
        e(period_label)
    ));
    body.push_str("</div>\n");

    body.push_str(
        "<table><thead><tr><th>Vencimento</th><th style=\"text-align: left;\">Descrição</th>\
         <th>Categoria</th><th>Fornecedor</th><th>Status</th><th class=\"right\">Valor</th></tr></thead><tbody>",
    );
    for expense in expenses {
        body.push_str(&format!(
            "<tr><td class=\"center\">{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td></tr>",
            e(&format_naive_date(expense.due_date)),
            e(&expense.description),
            e(expense.category.as_str()),
            e(expense.vendor.as_deref().unwrap_or("-")),
            expense.status.label(),
            e(&format_currency(expense.amount)),
        ));
    }
    if expenses.is_empty() {
        body.push_str("<tr><td colspan=\"6\" class=\"center muted\">Nenhuma despesa no período</td></tr>");
    }
    body.push_str("</tbody></table>\n");

    let sum = |status: Option<ExpenseStatus>| -> f64 {
        expenses
            .iter()
            .filter(|x| status.map_or(true, |s| x.status == s))
            .map(|x| x.amount)
            .sum()
    };
    body.push_str(&format!(
        "<table style=\"width: 50%; margin: 24px 0 0 auto;\">\
         <tr><td>Pago:</td><td class=\"right\">{}</td></tr>\
         <tr><td>Pendente:</td><td class=\"right\">{}</td></tr>\
         <tr><td>Atrasado:</td><td class=\"right\">{}</td></tr>\
         <tr><th style=\"text-align: left;\">TOTAL ({} despesa(s)):</th><th class=\"right\">{}</th></tr></table>\n",
        e(&format_currency(sum(Some(ExpenseStatus::Paid)))),
        e(&format_currency(sum(Some(ExpenseStatus::Pending)))),
        e(&format_currency(sum(Some(ExpenseStatus::Overdue)))),
        expenses.len(),
        e(&format_currency(sum(None))),
    ));

    page(&format!("Despesas - {}", period_label), "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, InvoiceStatus, ProposalStatus};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_customer() -> Customer {
        Customer {
            id: 7,
            name: "Transportes <Silva> & Filhos".to_string(),
            tax_id: "63061943000144".to_string(),
            state_registration: None,
            birth_date: None,
            phone: "44999999999".to_string(),
            email: None,
            address: "Rua das Flores, 100".to_string(),
            district: "Centro".to_string(),
            city: "Maringá".to_string(),
            state: "PR".to_string(),
            zip_code: None,
            monthly_fee: 79.9,
            due_day: "10".to_string(),
            active: true,
            platform_login: None,
            vehicles: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_invoice(id: i64) -> Invoice {
        Invoice {
            id,
            customer_id: Some(7),
            customer_name: "Transportes <Silva> & Filhos".to_string(),
            description: "Loc. Equipamento e Software para Rastreamento Veicular".to_string(),
            amount: 1234.5,
            vehicle_count: 2,
            due_date: date(2025, 3, 10),
            issue_date: date(2025, 3, 1),
            status: InvoiceStatus::Pending,
            whatsapp_sent: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_proposal() -> Proposal {
        Proposal {
            id: 1,
            number: 1,
            person_type: PersonType::Company,
            prospect_name: "Frota Norte".to_string(),
            prospect_contact: "Paulo".to_string(),
            prospect_email: "paulo@frotanorte.com.br".to_string(),
            prospect_phone: "44988887777".to_string(),
            prospect_document: "63061943000144".to_string(),
            prospect_city: "Sarandi".to_string(),
            prospect_state: "PR".to_string(),
            equipment_type: "Rastreador 4G com Bloqueio".to_string(),
            plan: "Plano Premium".to_string(),
            monthly_price: 39.9,
            vehicle_count: 10,
            free_installation: false,
            installation_price: Some(150.0),
            permanence_months: 12,
            notes: Some("Desconto para <frota>".to_string()),
            status: ProposalStatus::Pending,
            valid_until: date(2025, 4, 9),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Maringá"), "Maringá");
    }

    #[test]
    fn test_render_invoice() {
        let company = CompanyProfile::default();
        let html = render_invoice(&sample_invoice(12345), &sample_customer(), &company, date(2025, 3, 2));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(">2345</p>"));
        assert!(html.contains("<strong>VENCIMENTO:</strong> 10/03/2025"));
        assert!(html.contains("Data de emissão: 01/03/2025"));
        assert!(html.contains("Transportes &lt;Silva&gt; &amp; Filhos"));
        assert!(!html.contains("<Silva>"));
        assert!(html.contains("63.061.943/0001-44"));
        assert!(html.contains("R$ 1.234,50"));
        assert!(html.contains("Retenção de ISSQN:"));
        assert!(html.contains("TOTAL GERAL:"));
        assert!(html.contains("Banco Nubank"));
        assert!(html.contains("Maringá - PR, 02/03/2025"));
    }

    #[test]
    fn test_invoice_number_is_zero_padded() {
        let company = CompanyProfile::default();
        let html = render_invoice(&sample_invoice(7), &sample_customer(), &company, date(2025, 3, 2));
        assert!(html.contains(">0007</p>"));
        assert_eq!(invoice_filename(&sample_invoice(7)), "fatura-0007.html");
    }

    #[test]
    fn test_render_proposal() {
        let company = CompanyProfile::default();
        let html = render_proposal(&sample_proposal(), &company, date(2025, 3, 10));

        assert!(html.contains("@page { size: A4; margin: 1.5cm; }"));
        assert!(html.contains("#0001"));
        assert!(html.contains("DADOS DO CLIENTE - PESSOA JURÍDICA"));
        assert!(html.contains(">Empresa<"));
        assert!(html.contains(">CNPJ<"));
        assert!(html.contains("R$ 399,00"));
        assert!(html.contains("R$ 150,00"));
        assert!(!html.contains("GRATUITA"));
        assert!(html.contains("12 meses"));
        assert!(html.contains("09/04/2025"));
        assert!(html.contains("INSTALAÇÃO E SINAL GPS/GPRS"));
        assert_eq!(html.matches("<li>✓ ").count(), 12);
        assert!(html.contains("OBSERVAÇÕES"));
        assert!(html.contains("Desconto para &lt;frota&gt;"));
        assert!(html.contains("comercial@lincetrack.com.br"));
    }

    #[test]
    fn test_render_proposal_free_installation_without_notes() {
        let mut proposal = sample_proposal();
        proposal.person_type = PersonType::Individual;
        proposal.free_installation = true;
        proposal.installation_price = None;
        proposal.notes = None;

        let html = render_proposal(&proposal, &CompanyProfile::default(), date(2025, 3, 10));
        assert!(html.contains("GRATUITA"));
        assert!(html.contains("PESSOA FÍSICA"));
        assert!(html.contains(">Nome Completo<"));
        assert!(html.contains(">CPF<"));
        assert!(!html.contains("OBSERVAÇÕES"));
    }

    #[test]
    fn test_proposal_pdf_filename() {
        assert_eq!(proposal_pdf_filename(1), "proposta-comercial-0001.pdf");
        assert_eq!(proposal_pdf_filename(12345), "proposta-comercial-12345.pdf");
    }

    #[test]
    fn test_render_expense_list() {
        let expense = |id: i64, amount: f64, status: ExpenseStatus| Expense {
            id,
            description: format!("Despesa {}", id),
            category: ExpenseCategory::Telecom,
            amount,
            due_date: date(2025, 3, 5),
            payment_date: None,
            status,
            vendor: Some("Algar".to_string()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let expenses = vec![
            expense(1, 100.0, ExpenseStatus::Paid),
            expense(2, 50.0, ExpenseStatus::Overdue),
        ];
        let html = render_expense_list(&expenses, "março de 2025", &CompanyProfile::default());
        assert!(html.contains("março de 2025"));
        assert!(html.contains("Telecomunicações"));
        assert!(html.contains("Atrasado"));
        assert!(html.contains("TOTAL (2 despesa(s)):"));
        assert!(html.contains("R$ 150,00"));

        let empty = render_expense_list(&[], "abril de 2025", &CompanyProfile::default());
        assert!(empty.contains("Nenhuma despesa no período"));
    }
}
