//! Lookups used when preparing imports.

use serde_json::{Value, json};
use std::collections::HashMap;

use super::client::OdooClient;
use super::error::Result;
use crate::domain::FilterExpression;
use crate::utils::model_name;

// Lookup names come from callers and data files, so they are sent as wire
// values instead of going through `FilterTerm`.
fn name_is(name: &str) -> Value {
    json!([["name", "=", name]])
}

impl OdooClient {
    /// Map every record's `field` value to its id.
    ///
    /// Records whose `field` is not a string are skipped.
    pub fn model_map(&self, model: &str, field: &str) -> Result<HashMap<String, i64>> {
        let records = self.search_read(
            &model_name(model),
            &FilterExpression::default(),
            0,
            0,
            &[field.to_string()],
        )?;

        Ok(records
            .iter()
            .filter_map(|record| {
                let key = record.get(field)?.as_str()?;
                let id = record.get("id")?.as_i64()?;
                Some((key.to_string(), id))
            })
            .collect())
    }

    pub fn company_id(&self, name: &str) -> Result<Option<i64>> {
        self.get_id_where("res.company", name_is(name))
    }

    pub fn partner_id(&self, name: &str) -> Result<Option<i64>> {
        self.get_id_where("res.partner", name_is(name))
    }

    pub fn country_id(&self, name: &str) -> Result<Option<i64>> {
        self.get_id_where("res.country", name_is(name))
    }

    /// State `name` within the country with id `country_id`.
    pub fn state_id(&self, country_id: i64, name: &str) -> Result<Option<i64>> {
        self.get_id_where(
            "res.country.state",
            json!([["name", "=", name], ["country_id", "=", country_id]]),
        )
    }

    /// Fiscal position of a country whose name is `like` the given one.
    pub fn fiscal_position_id(&self, country_id: i64, name: &str) -> Result<Option<i64>> {
        self.get_id_where(
            "account.fiscal.position",
            json!([["country_id", "=", country_id], ["name", "like", name]]),
        )
    }
}
