//! Odoo client on top of the JSON-RPC `common` and `object` services.

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::envelope::{RpcRequest, decode_response};
use super::error::{Result, RpcError};
use super::transport::{DEFAULT_TIMEOUT, HttpTransport, Transport};
use crate::config::ConnectionConfig;
use crate::domain::{Comparator, FilterExpression, FilterTerm};

/// One record as returned by `read`/`search_read`, keyed by field name.
pub type Record = Map<String, Value>;

pub struct OdooClient {
    config: ConnectionConfig,
    url: String,
    uid: Option<i64>,
    transport: Box<dyn Transport>,
}

impl OdooClient {
    /// Client over blocking HTTP.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT)?;
        Self::with_transport(config, Box::new(transport))
    }

    pub fn with_transport(config: ConnectionConfig, transport: Box<dyn Transport>) -> Result<Self> {
        let url = config.endpoint()?;
        Ok(Self {
            config,
            url,
            uid: None,
            transport,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn uid(&self) -> Option<i64> {
        self.uid
    }

    /// Send one `call` envelope and return its `result`.
    pub fn call(&self, service: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        let request = RpcRequest::new(service, method, args);
        debug!(service, method, id = request.id, "rpc call");
        let body = serde_json::to_value(&request)?;
        let response = self.transport.post(&self.url, &body)?;
        decode_response(response)
    }

    pub fn login(&mut self) -> Result<i64> {
        let result = self.call(
            "common",
            "login",
            vec![
                json!(self.config.database),
                json!(self.config.username),
                json!(self.config.password),
            ],
        )?;

        let uid = result.as_i64().ok_or(RpcError::LoginFailed)?;
        self.uid = Some(uid);
        info!(
            url = %self.url,
            database = %self.config.database,
            username = %self.config.username,
            uid,
            "logged in"
        );
        Ok(uid)
    }

    /// `object.execute(db, uid, password, model, method, *args)`
    fn execute(&self, model: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        let uid = self.uid.ok_or(RpcError::NotLoggedIn)?;
        let mut full = Vec::with_capacity(args.len() + 5);
        full.push(json!(self.config.database));
        full.push(json!(uid));
        full.push(json!(self.config.password));
        full.push(json!(model));
        full.push(json!(method));
        full.extend(args);
        self.call("object", "execute", full)
    }

    /// Returns the new record id, or `-1` if the server answered with
    /// something other than a number.
    pub fn create(&self, model: &str, record: &Record) -> Result<i64> {
        let result = self.execute(model, "create", vec![json!(record)])?;
        Ok(result.as_i64().unwrap_or(-1))
    }

    /// Bulk `load` of rows under a header; the raw server report is returned.
    pub fn load(&self, model: &str, header: &[String], rows: &[Vec<String>]) -> Result<Value> {
        self.execute(model, "load", vec![json!(header), json!(rows)])
    }

    pub fn search_read(
        &self,
        model: &str,
        filter: &FilterExpression,
        offset: usize,
        limit: usize,
        fields: &[String],
    ) -> Result<Vec<Record>> {
        let result = self.execute(
            model,
            "search_read",
            vec![
                serde_json::to_value(filter)?,
                json!(fields),
                json!(offset),
                json!(limit),
            ],
        )?;
        records_from(result)
    }

    pub fn search(&self, model: &str, filter: &FilterExpression) -> Result<Vec<i64>> {
        self.search_where(model, serde_json::to_value(filter)?)
    }

    /// `search` with a domain given directly in wire form, for conditions the
    /// textual filter cannot express (integer values, arbitrary names).
    pub fn search_where(&self, model: &str, domain: Value) -> Result<Vec<i64>> {
        let result = self.execute(model, "search", vec![domain])?;
        ids_from(result)
    }

    /// First id matching `filter`.
    pub fn get_id(&self, model: &str, filter: &FilterExpression) -> Result<Option<i64>> {
        Ok(self.search(model, filter)?.first().copied())
    }

    pub fn get_id_where(&self, model: &str, domain: Value) -> Result<Option<i64>> {
        Ok(self.search_where(model, domain)?.first().copied())
    }

    pub fn read(&self, model: &str, ids: &[i64], fields: &[String]) -> Result<Vec<Record>> {
        let result = self.execute(model, "read", vec![json!(ids), json!(fields)])?;
        records_from(result)
    }

    pub fn update(&self, model: &str, id: i64, record: &Record) -> Result<bool> {
        let result = self.execute(model, "write", vec![json!(id), json!(record)])?;
        Ok(result.as_bool().unwrap_or(false))
    }

    pub fn unlink(&self, model: &str, ids: &[i64]) -> Result<bool> {
        let result = self.execute(model, "unlink", vec![json!(ids)])?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// `search_count`; an empty filter counts every record.
    pub fn count(&self, model: &str, filter: &FilterExpression) -> Result<i64> {
        let everything;
        let filter = if filter.is_empty() {
            everything = FilterExpression::term(FilterTerm::new("id", Comparator::Ne, "-1"));
            &everything
        } else {
            filter
        };
        let result = self.execute(model, "search_count", vec![serde_json::to_value(filter)?])?;
        Ok(result.as_i64().unwrap_or(-1))
    }
}

fn records_from(value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect()),
        other => Err(RpcError::UnexpectedResponse(format!(
            "expected a list of records, got {other}"
        ))),
    }
}

fn ids_from(value: Value) -> Result<Vec<i64>> {
    match value {
        Value::Array(items) => Ok(items.iter().filter_map(Value::as_i64).collect()),
        other => Err(RpcError::UnexpectedResponse(format!(
            "expected a list of ids, got {other}"
        ))),
    }
}
