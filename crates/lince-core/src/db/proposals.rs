//! Commercial proposal operations

use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{date_column, date_param, enum_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewProposal, Proposal, ProposalStatus, PROPOSAL_VALIDITY_DAYS};

const PROPOSAL_COLUMNS: &str = "id, number, person_type, prospect_name, prospect_contact, \
     prospect_email, prospect_phone, prospect_document, prospect_city, prospect_state, \
     equipment_type, plan, monthly_price, vehicle_count, free_installation, installation_price, \
     permanence_months, notes, status, valid_until, created_at, updated_at";

fn row_to_proposal(row: &rusqlite::Row) -> rusqlite::Result<Proposal> {
    let created_at: String = row.get(20)?;
    let updated_at: String = row.get(21)?;
    Ok(Proposal {
        id: row.get(0)?,
        number: row.get(1)?,
        person_type: enum_column(row, 2)?,
        prospect_name: row.get(3)?,
        prospect_contact: row.get(4)?,
        prospect_email: row.get(5)?,
        prospect_phone: row.get(6)?,
        prospect_document: row.get(7)?,
        prospect_city: row.get(8)?,
        prospect_state: row.get(9)?,
        equipment_type: row.get(10)?,
        plan: row.get(11)?,
        monthly_price: row.get(12)?,
        vehicle_count: row.get(13)?,
        free_installation: row.get(14)?,
        installation_price: row.get(15)?,
        permanence_months: row.get(16)?,
        notes: row.get(17)?,
        status: enum_column(row, 18)?,
        valid_until: date_column(row, 19)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    /// Create a proposal numbered after the highest existing one
    ///
    /// The number is computed inside the INSERT, so two creations cannot pick the
    /// same value. Validity runs 30 days from `today`.
    pub fn create_proposal(&self, proposal: &NewProposal, today: NaiveDate) -> Result<i64> {
        proposal.validate()?;
        let valid_until = today + Duration::days(PROPOSAL_VALIDITY_DAYS);
        let installation_price = if proposal.free_installation {
            None
        } else {
            proposal.installation_price
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO proposals (number, person_type, prospect_name, prospect_contact, prospect_email,
                                   prospect_phone, prospect_document, prospect_city, prospect_state,
                                   equipment_type, plan, monthly_price, vehicle_count, free_installation,
                                   installation_price, permanence_months, notes, status, valid_until)
            VALUES ((SELECT COALESCE(MAX(number), 0) + 1 FROM proposals),
                    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                proposal.person_type.as_str(),
                proposal.prospect_name.trim(),
                proposal.prospect_contact,
                proposal.prospect_email,
                proposal.prospect_phone.trim(),
                proposal.prospect_document.trim(),
                proposal.prospect_city,
                proposal.prospect_state,
                proposal.equipment_type,
                proposal.plan,
                proposal.monthly_price,
                proposal.vehicle_count,
                proposal.free_installation,
                installation_price,
                proposal.permanence_months,
                proposal.notes,
                proposal.status.as_str(),
                date_param(valid_until),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!(proposal_id = id, prospect = %proposal.prospect_name, "Created proposal");
        Ok(id)
    }

    /// Update a proposal; its number and validity date are kept
    pub fn update_proposal(&self, id: i64, proposal: &NewProposal) -> Result<()> {
        proposal.validate()?;
        let installation_price = if proposal.free_installation {
            None
        } else {
            proposal.installation_price
        };

        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE proposals
            SET person_type = ?, prospect_name = ?, prospect_contact = ?, prospect_email = ?,
                prospect_phone = ?, prospect_document = ?, prospect_city = ?, prospect_state = ?,
                equipment_type = ?, plan = ?, monthly_price = ?, vehicle_count = ?,
                free_installation = ?, installation_price = ?, permanence_months = ?, notes = ?,
                status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                proposal.person_type.as_str(),
                proposal.prospect_name.trim(),
                proposal.prospect_contact,
                proposal.prospect_email,
                proposal.prospect_phone.trim(),
                proposal.prospect_document.trim(),
                proposal.prospect_city,
                proposal.prospect_state,
                proposal.equipment_type,
                proposal.plan,
                proposal.monthly_price,
                proposal.vehicle_count,
                proposal.free_installation,
                installation_price,
                proposal.permanence_months,
                proposal.notes,
                proposal.status.as_str(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Proposal {}", id)));
        }
        Ok(())
    }

    pub fn get_proposal(&self, id: i64) -> Result<Option<Proposal>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM proposals WHERE id = ?", PROPOSAL_COLUMNS),
            params![id],
            row_to_proposal,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List proposals, newest number first
    pub fn list_proposals(&self) -> Result<Vec<Proposal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM proposals ORDER BY number DESC",
            PROPOSAL_COLUMNS
        ))?;
        let proposals = stmt
            .query_map([], row_to_proposal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(proposals)
    }

    pub fn set_proposal_status(&self, id: i64, status: ProposalStatus) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE proposals SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Proposal {}", id)));
        }
        Ok(())
    }

    pub fn delete_proposal(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM proposals WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
