//! Broadcast identity baked in at build time (see `build.rs`)

use alloc::string::String;

use bau_core::PayloadError;
use bau_core::config::BroadcastConfig;
use bau_core::identity::BroadcastIdentity;

/// Broadcast settings from `BAU_*` build variables.
pub fn configured_broadcast() -> BroadcastConfig {
    BroadcastConfig {
        address: String::from(env!("BAU_ADDRESS")),
        // build.rs already validated and normalized this to decimal
        broadcast_id: env!("BAU_BROADCAST_ID").parse().unwrap_or(u32::MAX),
        name: String::from(env!("BAU_BROADCAST_NAME")),
    }
}

pub fn configured_identity() -> Result<BroadcastIdentity, PayloadError> {
    configured_broadcast().identity()
}
