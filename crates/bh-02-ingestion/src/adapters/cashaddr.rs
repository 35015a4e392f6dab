//! CashAddr decoding.
//!
//! `prefix:payload`, payload base32 over `version || hash || checksum(40 bits)`.
//! The prefix is optional and defaults to the decoder's configured one.

use crate::domain::{ScriptType, SubscriptionTarget};
use crate::error::{IngestionError, IngestionResult};
use crate::ports::AddressDecoder;

pub const DEFAULT_PREFIX: &str = "ecash";

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;
const GENERATORS: [u64; 5] = [
    0x98_f2bc_8e61,
    0x79_b76d_99e2,
    0xf3_3e5f_b3c4,
    0xae_2eab_e2a8,
    0x1e_4f43_e470,
];

#[derive(Debug, Clone)]
pub struct CashAddrDecoder {
    default_prefix: String,
}

impl Default for CashAddrDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl CashAddrDecoder {
    pub fn new(default_prefix: impl Into<String>) -> Self {
        Self {
            default_prefix: default_prefix.into().to_ascii_lowercase(),
        }
    }

    fn decode_inner(&self, address: &str) -> Result<SubscriptionTarget, String> {
        let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err("mixed case".to_string());
        }

        let address = address.to_ascii_lowercase();
        let (prefix, payload) = match address.split_once(':') {
            Some((prefix, payload)) => (prefix, payload),
            None => (self.default_prefix.as_str(), address.as_str()),
        };
        if prefix.is_empty() {
            return Err("empty prefix".to_string());
        }
        if payload.len() <= CHECKSUM_LEN {
            return Err("payload too short".to_string());
        }

        let values = payload
            .bytes()
            .map(|c| {
                CHARSET
                    .iter()
                    .position(|&x| x == c)
                    .map(|i| i as u8)
                    .ok_or_else(|| format!("invalid character {:?}", c as char))
            })
            .collect::<Result<Vec<u8>, String>>()?;

        let checked = prefix
            .bytes()
            .map(|c| c & 0x1f)
            .chain(std::iter::once(0))
            .chain(values.iter().copied());
        if polymod(checked) != 0 {
            return Err("checksum mismatch".to_string());
        }

        let data = convert_bits(&values[..values.len() - CHECKSUM_LEN], 5, 8)?;
        let (version, hash) = data.split_first().ok_or("empty payload")?;

        if version & 0x80 != 0 {
            return Err(format!("reserved version bit set ({:#04x})", version));
        }
        let expected_len = hash_size(version & 0x07);
        if hash.len() != expected_len {
            return Err(format!(
                "hash is {} bytes, version says {}",
                hash.len(),
                expected_len
            ));
        }
        let script_type = match (version >> 3) & 0x0f {
            0 => ScriptType::P2pkh,
            1 => ScriptType::P2sh,
            other => return Err(format!("unsupported address type {}", other)),
        };

        Ok(SubscriptionTarget {
            script_type,
            script_hash: hex::encode(hash),
        })
    }
}

impl AddressDecoder for CashAddrDecoder {
    fn decode(&self, address: &str) -> IngestionResult<SubscriptionTarget> {
        self.decode_inner(address)
            .map_err(|reason| IngestionError::AddressDecode {
                address: address.to_string(),
                reason,
            })
    }
}

fn polymod(values: impl IntoIterator<Item = u8>) -> u64 {
    let mut c: u64 = 1;
    for d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (bit, generator) in GENERATORS.iter().enumerate() {
            if c0 & (1 << bit) != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Regroup `from`-bit values into `to`-bit values without padding.
fn convert_bits(data: &[u8], from: u32, to: u32) -> Result<Vec<u8>, String> {
    let max_value: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return Err("value out of range".to_string());
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if bits >= from || (acc << (to - bits)) & max_value != 0 {
        return Err("non-zero padding".to_string());
    }
    Ok(out)
}

fn hash_size(size_bits: u8) -> usize {
    match size_bits {
        0 => 20,
        1 => 24,
        2 => 28,
        3 => 32,
        4 => 40,
        5 => 48,
        6 => 56,
        _ => 64,
    }
}
