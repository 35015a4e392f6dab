//! Wire model of the `isfinalblock` exchange

pub mod rpc;

pub use rpc::{FinalityRequest, FinalityResponse, RpcErrorObject, IS_FINAL_BLOCK_METHOD};
