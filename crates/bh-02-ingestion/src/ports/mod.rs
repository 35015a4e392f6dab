//! Ports (hexagonal architecture)
//!
//! Every collaborator outside this subsystem is reached through a driven
//! port in [`outbound`]. The finality oracle port is owned by
//! `bh-01-finality` and re-exported here.

pub mod outbound;

pub use bh_01_finality::FinalityOracle;
pub use outbound::{
    AddressDecoder, EventTransport, IndexerClient, MessageCallback, Notifier, ServerStateStore,
    TransportConnection,
};
