use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use zone_core::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_PACKETVER, DEFAULT_PING_INTERVAL_MS,
};

use crate::network::framing::PacketLengths;

/// Client configuration relevant to the zone session.
///
/// Keys follow the client's `config.js` naming so existing configuration files load as-is.
/// Keys the session does not know about are kept in `extra` and remain visible through
/// [`Settings::flag`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Protocol build date, e.g. `20180307`.
    #[serde(rename = "packetver")]
    pub packet_version: u32,
    /// Send `CZ_HBT` before every ping.
    #[serde(rename = "sec_HBT")]
    pub sec_hbt: bool,
    #[serde(rename = "enableMapName")]
    pub enable_map_name: bool,
    #[serde(rename = "enableCashShop")]
    pub enable_cash_shop: bool,
    #[serde(rename = "enableBank")]
    pub enable_bank: bool,
    #[serde(rename = "enableCheckAttendance")]
    pub enable_check_attendance: bool,
    pub ping_interval_ms: u64,
    pub connect_timeout_ms: u64,
    /// Lengths of inbound packets this client does not decode, keyed by opcode
    /// (`"0x008D"` or decimal). `-1` marks a variable-length packet.
    pub packet_lengths: HashMap<String, i32>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packet_version: DEFAULT_PACKETVER,
            sec_hbt: false,
            enable_map_name: false,
            enable_cash_shop: false,
            enable_bank: false,
            enable_check_attendance: false,
            ping_interval_ms: DEFAULT_PING_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            packet_lengths: HashMap::new(),
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Settings> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {:?}, using defaults", path);
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read settings {:?}", path))
            }
        };

        serde_json::from_slice::<Settings>(&bytes)
            .with_context(|| format!("failed to parse settings {:?}", path))
    }

    /// Like [`Settings::load`], but logs the error and falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Settings {
        match Self::load(path) {
            Ok(s) => s,
            Err(e) => {
                log::error!("{e:#}");
                Settings::default()
            }
        }
    }

    /// Flat boolean lookup by configuration key.
    ///
    /// Unknown keys are truthy when they hold `true` or a non-zero number.
    pub fn flag(&self, key: &str) -> bool {
        match key {
            "sec_HBT" => self.sec_hbt,
            "enableMapName" => self.enable_map_name,
            "enableCashShop" => self.enable_cash_shop,
            "enableBank" => self.enable_bank,
            "enableCheckAttendance" => self.enable_check_attendance,
            _ => match self.extra.get(key) {
                Some(serde_json::Value::Bool(b)) => *b,
                Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
                _ => false,
            },
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Inbound length table with the configured extras. Unparseable opcodes are skipped.
    pub fn packet_length_table(&self) -> PacketLengths {
        let mut extras = HashMap::new();
        for (key, &len) in &self.packet_lengths {
            match parse_opcode(key) {
                Some(opcode) => {
                    extras.insert(opcode, len);
                }
                None => log::warn!("Ignoring packet length for unparseable opcode {key:?}"),
            }
        }
        PacketLengths::with_extras(&extras)
    }
}

fn parse_opcode(key: &str) -> Option<u16> {
    let key = key.trim();
    match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => key.parse().ok(),
    }
}
