use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::cmp::Ordering;

use crate::models::Direction;

const FNV_64_INIT: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_64_PRIME: u64 = 0x0000_0100_0000_01b3;

static TTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^DEG\d+-TTP-").unwrap());
static PP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^SRG\d+-PP\d+-").unwrap());
static NETWORK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^XPDR\d+-NETWORK\d+$").unwrap());
static CLIENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^XPDR\d+-CLIENT\d+$").unwrap());

/// Family a logical connection point name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcpKind {
    Ttp,
    Pp,
    Network,
    Client,
    Other,
}

impl LcpKind {
    pub fn of(lcp: &str) -> Self {
        if TTP_RE.is_match(lcp) {
            LcpKind::Ttp
        } else if PP_RE.is_match(lcp) {
            LcpKind::Pp
        } else if NETWORK_RE.is_match(lcp) {
            LcpKind::Network
        } else if CLIENT_RE.is_match(lcp) {
            LcpKind::Client
        } else {
            LcpKind::Other
        }
    }

    /// TTP and network LCPs carry supporting transport-layer interfaces
    pub fn has_supporting_interfaces(self) -> bool {
        matches!(self, LcpKind::Ttp | LcpKind::Network)
    }
}

pub fn ttp(degree_number: u16, direction: Direction) -> String {
    format!("DEG{}-TTP-{}", degree_number, direction.lcp_suffix())
}

pub fn pp(srg_number: u16, index: u32, direction: Direction) -> String {
    format!("SRG{}-PP{}-{}", srg_number, index, direction.lcp_suffix())
}

pub fn network(xpdr_number: u16, index: u32) -> String {
    format!("XPDR{}-NETWORK{}", xpdr_number, index)
}

pub fn client(xpdr_number: u16, index: u32) -> String {
    format!("XPDR{}-CLIENT{}", xpdr_number, index)
}

/// Media-channel capability key of a degree
pub fn degree_mc_node(degree_number: u16) -> String {
    format!("DEG{}-TTP", degree_number)
}

/// Media-channel capability key of a shared-risk-group
pub fn srg_mc_node(srg_number: u16) -> String {
    format!("SRG{}-PP", srg_number)
}

/// 64-bit FNV-1: multiply, then xor each byte
pub fn fnv1_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_64_INIT, |hash, b| {
        hash.wrapping_mul(FNV_64_PRIME) ^ u64::from(*b)
    })
}

/// Identity hash of an LCP, stored as base64 text.
///
/// The value is encoded as the minimal big-endian two's-complement form of
/// the unsigned hash, so values with the top bit set gain a leading zero
/// byte. Distinct inputs may collide; callers only rely on "very likely
/// distinct".
pub fn lcp_hash(node_id: &str, lcp: &str) -> String {
    encode_hash(fnv1_64(format!("{}-{}", node_id, lcp).as_bytes()))
}

fn encode_hash(hash: u64) -> String {
    let raw = hash.to_be_bytes();
    let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len() - 1);
    let mut bytes = Vec::with_capacity(9);
    if raw[first] & 0x80 != 0 {
        bytes.push(0);
    }
    bytes.extend_from_slice(&raw[first..]);
    STANDARD.encode(bytes)
}

/// Order names by their embedded number, then lexicographically.
///
/// All digits of a name are read as one number, so `C2` sorts before `C10`
/// and `1/0/2` before `1/0/10`.
pub fn numeric_aware_cmp(a: &str, b: &str) -> Ordering {
    let na = embedded_number(a);
    let nb = embedded_number(b);
    na.len()
        .cmp(&nb.len())
        .then_with(|| na.cmp(&nb))
        .then_with(|| a.cmp(b))
}

fn embedded_number(name: &str) -> String {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').to_string()
}
