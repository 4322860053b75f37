use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// JSON-RPC 2.0 call as expected by the Odoo web controllers.
#[derive(Serialize, Debug)]
pub struct Request<P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: u32,
}

impl<P: Serialize> Request<P> {
    pub fn call(params: P) -> Self {
        Request {
            jsonrpc: "2.0",
            method: "call",
            params,
            id: rand::random(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Response<T> {
    pub result: T,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Unwraps a raw JSON-RPC body into its `result`, turning an `error` member
/// into [`Error::Rpc`].
pub fn parse_response<T>(body: &str) -> Result<Response<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: Envelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.error {
        let detail = err
            .data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(Error::Rpc {
            message: err.message,
            detail,
        });
    }
    let result = serde_json::from_value(envelope.result.unwrap_or(Value::Null))?;
    Ok(Response { result })
}

/// Odoo sends `false` for unset values of any type.
pub fn deserialize_odoo_nullable<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        other => serde_json::from_value(other).map(Some).map_err(de::Error::custom),
    }
}

#[derive(Deserialize, Debug)]
pub struct Session {
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub uid: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub username: Option<String>,
}

/// One page of a `web_search_read` call.
#[derive(Deserialize, Debug, Default)]
pub struct Page {
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub records: Vec<serde_json::Map<String, Value>>,
}
