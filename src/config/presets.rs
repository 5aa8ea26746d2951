//! Built-in endpoint lists for the named networks
//!
//! Snapshots of the public TON global configs, embedded at compile time and
//! decoded once per process.

use crate::config::document::parse_document;
use crate::models::EndpointDescriptor;
use crate::types::NetworkPreset;
use std::sync::OnceLock;

const MAINNET_DOCUMENT: &str = include_str!("../../presets/mainnet.json");
const TESTNET_DOCUMENT: &str = include_str!("../../presets/testnet.json");

/// Snapshot date of the embedded global configs
pub const PRESET_VERSION: &str = "2025-06-01";

static MAINNET: OnceLock<Vec<EndpointDescriptor>> = OnceLock::new();
static TESTNET: OnceLock<Vec<EndpointDescriptor>> = OnceLock::new();

/// Endpoints of a preset, in the order of the embedded document
pub fn endpoints(network: NetworkPreset) -> &'static [EndpointDescriptor] {
    let (cell, document) = match network {
        NetworkPreset::Mainnet => (&MAINNET, MAINNET_DOCUMENT),
        NetworkPreset::Testnet => (&TESTNET, TESTNET_DOCUMENT),
    };
    cell.get_or_init(|| parse_document(document).unwrap_or_default())
}
