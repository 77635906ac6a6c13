use odooq::config::ConnectionConfig;
use odooq::domain::parse_domain;
use odooq::rpc::{OdooClient, RpcError, Transport};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Answers every call with the next canned result and remembers the bodies.
#[derive(Clone, Default)]
struct Scripted {
    results: Arc<Mutex<Vec<Value>>>,
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Scripted {
    fn new(results: Vec<Value>) -> Self {
        let mut results = results;
        results.reverse();
        Self {
            results: Arc::new(Mutex::new(results)),
            seen: Arc::default(),
        }
    }
}

impl Transport for Scripted {
    fn post(&self, url: &str, body: &Value) -> Result<Value, RpcError> {
        self.seen
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        let result = self.results.lock().unwrap().pop().unwrap_or(Value::Null);
        Ok(json!({"jsonrpc": "2.0", "id": body["id"], "result": result}))
    }
}

#[test]
fn query_round_trip_over_custom_transport() {
    let transport = Scripted::new(vec![json!(6), json!([{"id": 3, "name": "Azure Interior"}])]);
    let config = ConnectionConfig {
        hostname: "erp.example.com".to_string(),
        port: 443,
        schema: "https".to_string(),
        database: "prod".to_string(),
        ..ConnectionConfig::default()
    };

    let mut client = OdooClient::with_transport(config, Box::new(transport.clone())).unwrap();
    assert_eq!(client.login().unwrap(), 6);

    let filter = parse_domain(
        "[('name','ilike','azure'),'|',('is_company','=','True'),('customer_rank','>','0')]",
    )
    .unwrap();
    let records = client.search_read("res.partner", &filter, 0, 0, &[]).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Azure Interior");

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(url, _)| url == "https://erp.example.com:443/jsonrpc"));

    let (_, login) = &seen[0];
    assert_eq!(login["jsonrpc"], "2.0");
    assert_eq!(login["method"], "call");
    assert_eq!(login["params"]["service"], "common");

    let (_, query) = &seen[1];
    assert_eq!(query["params"]["service"], "object");
    assert_eq!(query["params"]["method"], "execute");
    assert_eq!(
        query["params"]["args"][5],
        json!([
            ["name", "ilike", "azure"],
            ["|", ["is_company", "=", "True"], ["customer_rank", ">", "0"]]
        ])
    );
}

#[test]
fn lookups_by_name() {
    let transport = Scripted::new(vec![json!(2), json!([21]), json!([])]);
    let mut client =
        OdooClient::with_transport(ConnectionConfig::default(), Box::new(transport.clone()))
            .unwrap();
    client.login().unwrap();

    assert_eq!(client.country_id("Belgium").unwrap(), Some(21));
    assert_eq!(client.partner_id("Nobody").unwrap(), None);

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen[1].1["params"]["args"][3], "res.country");
    assert_eq!(
        seen[1].1["params"]["args"][5],
        json!([["name", "=", "Belgium"]])
    );
    assert_eq!(seen[2].1["params"]["args"][3], "res.partner");
}
