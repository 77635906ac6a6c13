//! JSON-RPC 2.0 request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{Result, RpcError};

/// Upper bound (exclusive) of generated request ids.
const MAX_REQUEST_ID: u32 = 100_000_000;

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub id: u32,
    pub params: RpcParams<'a>,
}

#[derive(Debug, Serialize)]
pub struct RpcParams<'a> {
    pub service: &'a str,
    pub method: &'a str,
    pub args: Vec<Value>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(service: &'a str, method: &'a str, args: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            id: fastrand::u32(0..MAX_REQUEST_ID),
            params: RpcParams {
                service,
                method,
                args,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RemoteErrorData>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteErrorData {
    #[serde(default)]
    message: Option<String>,
}

impl RemoteError {
    fn describe(&self) -> String {
        let mut text = self.message.clone().unwrap_or_default();
        if let Some(detail) = self.data.as_ref().and_then(|d| d.message.as_deref()) {
            text.push_str(": ");
            text.push_str(detail);
        }
        text
    }
}

/// Extract `result` from a response body, or turn `error` into
/// [`RpcError::Remote`].
pub fn decode_response(body: Value) -> Result<Value> {
    let mut body = match body {
        Value::Object(map) => map,
        other => return Err(RpcError::UnexpectedResponse(other.to_string())),
    };

    if let Some(error) = body.remove("error") {
        let error: RemoteError = serde_json::from_value(error).unwrap_or_default();
        return Err(RpcError::Remote(error.describe()));
    }

    body.remove("result")
        .ok_or_else(|| RpcError::UnexpectedResponse("missing 'result' member".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_shape() {
        let request = RpcRequest::new("common", "login", vec![json!("db"), json!("user")]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "call");
        assert!(value["id"].as_u64().unwrap() < u64::from(MAX_REQUEST_ID));
        assert_eq!(
            value["params"],
            json!({"service": "common", "method": "login", "args": ["db", "user"]})
        );
    }

    #[test]
    fn result_is_returned() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": [1, 2]});
        assert_eq!(decode_response(body).unwrap(), json!([1, 2]));
    }

    #[test]
    fn null_result_is_a_value() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": null});
        assert_eq!(decode_response(body).unwrap(), Value::Null);
    }

    #[test]
    fn remote_error_joins_messages() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {"name": "builtins.ValueError", "message": "Invalid field 'nam'"}
            }
        });
        let err = decode_response(body).unwrap_err();
        assert_eq!(err.to_string(), "Odoo Server Error: Invalid field 'nam'");
    }

    #[test]
    fn remote_error_without_data() {
        let body = json!({"error": {"message": "Access Denied"}});
        let err = decode_response(body).unwrap_err();
        assert!(matches!(err, RpcError::Remote(ref text) if text == "Access Denied"));
    }

    #[test]
    fn missing_result_is_unexpected() {
        assert!(matches!(
            decode_response(json!({"id": 1})),
            Err(RpcError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            decode_response(json!([1])),
            Err(RpcError::UnexpectedResponse(_))
        ));
    }
}
