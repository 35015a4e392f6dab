//! `isfinalblock` request/response types and verdict interpretation.

use crate::error::{FinalityError, FinalityResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RPC method name, also used as the request id.
pub const IS_FINAL_BLOCK_METHOD: &str = "isfinalblock";

/// JSON-RPC request asking whether `params[0]` is finalized.
#[derive(Debug, Clone, Serialize)]
pub struct FinalityRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: [&'a str; 1],
}

impl<'a> FinalityRequest<'a> {
    pub fn new(block_hash: &'a str) -> Self {
        Self {
            jsonrpc: "1.0",
            id: IS_FINAL_BLOCK_METHOD,
            method: IS_FINAL_BLOCK_METHOD,
            params: [block_hash],
        }
    }
}

/// Structured error object returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{{code: {}, message: {}}}", self.code, self.message),
        }
    }
}

/// Response envelope: exactly one of `result` / `error` is expected.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalityResponse {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
    #[serde(default)]
    pub id: Option<String>,
}

impl FinalityResponse {
    /// Interpret the response.
    ///
    /// `Ok(true)` only for `{result: true, error: null}`. An error object wins
    /// over any result value.
    pub fn verdict(self) -> FinalityResult<bool> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(FinalityError::Node(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(FinalityError::MalformedResponse {
                reason: "response carries neither result nor error".to_string(),
            }),
        }
    }
}
