//! Company profile configuration
//!
//! The issuer details printed on invoices and proposals, and the PIX key used in
//! payment reminders, come from a TOML file. Any field left out of the file keeps
//! its built-in value.
//!
//! Lookup order:
//! 1. Explicit path passed by the caller
//! 2. `LINCE_COMPANY_CONFIG` environment variable
//! 3. `~/.local/share/lince/company.toml`
//! 4. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable pointing at a company profile file
pub const COMPANY_CONFIG_ENV: &str = "LINCE_COMPANY_CONFIG";

/// Issuer details for documents and messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: String,
    pub tagline: String,
    /// Street address line as printed in the issuer block
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub email: String,
    /// Contact printed on commercial proposals
    pub commercial_email: String,
    pub cnpj: String,
    pub state_registration: String,
    /// PIX key quoted in payment reminders (digits only)
    pub pix_key: String,
    pub bank: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Lince Track".to_string(),
            tagline: "RASTREAMENTO VEICULAR".to_string(),
            address: "Av. Duque de Caxias nº 882, SL 107, Zona 01".to_string(),
            zip_code: "87020-025".to_string(),
            city: "MARINGÁ".to_string(),
            state: "PARANÁ".to_string(),
            phone: "(44) 99700-3426".to_string(),
            email: "lincetrack@gmail.com".to_string(),
            commercial_email: "comercial@lincetrack.com.br".to_string(),
            cnpj: "63.061.943/0001-44".to_string(),
            state_registration: "ISENTO".to_string(),
            pix_key: "63061943000144".to_string(),
            bank: "Nubank".to_string(),
        }
    }
}

/// Default profile location in the platform data directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("lince").join("company.toml"))
}

impl CompanyProfile {
    /// Load the profile, falling back to the built-in defaults when no file exists
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(COMPANY_CONFIG_ENV).ok().map(PathBuf::from))
            .or_else(default_config_path);

        match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading company profile");
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parse a profile from TOML
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid company profile: {}", e)))
    }

    /// "MARINGÁ-PARANÁ" style locality used in the issuer block
    pub fn locality(&self) -> String {
        format!("{}-{}", self.city, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let profile = CompanyProfile::default();
        assert_eq!(profile.name, "Lince Track");
        assert_eq!(profile.pix_key, "63061943000144");
        assert_eq!(profile.locality(), "MARINGÁ-PARANÁ");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let profile = CompanyProfile::parse(
            r#"
            name = "Lince Track Sul"
            phone = "(41) 98888-7777"
            "#,
        )
        .unwrap();
        assert_eq!(profile.name, "Lince Track Sul");
        assert_eq!(profile.phone, "(41) 98888-7777");
        assert_eq!(profile.cnpj, "63.061.943/0001-44");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(CompanyProfile::parse("name = ").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bank = \"Banco do Brasil\"").unwrap();

        let profile = CompanyProfile::load(Some(file.path())).unwrap();
        assert_eq!(profile.bank, "Banco do Brasil");
        assert_eq!(profile.name, "Lince Track");
    }

    #[test]
    fn test_load_missing_path_uses_defaults() {
        let profile = CompanyProfile::load(Some(Path::new("/nonexistent/company.toml"))).unwrap();
        assert_eq!(profile, CompanyProfile::default());
    }
}
