//! DID URL parsing and formatting (§4.2).
//!
//! Parses `did:<method>:<method-specific-id>[/path][?query][#fragment]` into a
//! typed structure and enforces the method-specific constraints from §4.2.
//! This module owns syntax only; the semantics of *resolving* a parsed DID
//! live in `originals-did`'s drivers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SATOSHI;
use crate::error::OriginalsError;

/// The three DID methods this protocol understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Peer,
    Webvh,
    Btco,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Peer => "peer",
            Method::Webvh => "webvh",
            Method::Btco => "btco",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Method {
    type Err = OriginalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "peer" => Ok(Method::Peer),
            "webvh" => Ok(Method::Webvh),
            "btco" => Ok(Method::Btco),
            other => Err(OriginalsError::InvalidDid(format!("unknown method: {other}"))),
        }
    }
}

/// The layer an asset currently lives at. Distinct from `Method` only in that
/// it names the lifecycle position rather than the DID syntax; in this
/// protocol the two are in 1:1 correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Peer,
    Webvh,
    Btco,
}

impl From<Method> for Layer {
    fn from(m: Method) -> Self {
        match m {
            Method::Peer => Layer::Peer,
            Method::Webvh => Layer::Webvh,
            Method::Btco => Layer::Btco,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Layer::Peer => "peer",
            Layer::Webvh => "webvh",
            Layer::Btco => "btco",
        };
        write!(f, "{s}")
    }
}

/// `allowed forward transitions: peer->webvh, peer->btco, webvh->btco` (§3).
pub fn is_allowed_transition(from: Layer, to: Layer) -> bool {
    matches!(
        (from, to),
        (Layer::Peer, Layer::Webvh) | (Layer::Peer, Layer::Btco) | (Layer::Webvh, Layer::Btco)
    )
}

/// `did:btco` network discriminant (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcoNetwork {
    Mainnet,
    Test,
    Sig,
}

impl fmt::Display for BtcoNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BtcoNetwork::Mainnet => "mainnet",
            BtcoNetwork::Test => "test",
            BtcoNetwork::Sig => "sig",
        };
        write!(f, "{s}")
    }
}

/// Method-specific identifier payload, already validated against §4.2's
/// per-method constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum MethodId {
    /// `did:peer:4z...` — numalgo-4 long form, self-contained.
    Peer { numalgo4: String },
    /// `did:webvh:<domain>[:<path-segments>...]`.
    Webvh { domain: String, path_segments: Vec<String> },
    /// `did:btco:[<network>:]<satoshi>`.
    Btco { network: BtcoNetwork, satoshi: u64 },
}

/// A fully parsed `did:<method>:...[/path][?query][#fragment]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidUrl {
    pub method: Method,
    pub method_id: MethodId,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl DidUrl {
    /// The bare DID (method + method-specific-id), with no path/query/fragment.
    pub fn did(&self) -> String {
        match &self.method_id {
            MethodId::Peer { numalgo4 } => format!("did:peer:{numalgo4}"),
            MethodId::Webvh { domain, path_segments } => {
                let mut s = format!("did:webvh:{domain}");
                for seg in path_segments {
                    s.push(':');
                    s.push_str(seg);
                }
                s
            }
            MethodId::Btco { network, satoshi } => match network {
                BtcoNetwork::Mainnet => format!("did:btco:{satoshi}"),
                other => format!("did:btco:{other}:{satoshi}"),
            },
        }
    }

    pub fn layer(&self) -> Layer {
        self.method.into()
    }

    /// The full DID URL string, including path/query/fragment if present.
    pub fn to_url_string(&self) -> String {
        let mut s = self.did();
        if let Some(p) = &self.path {
            s.push('/');
            s.push_str(p.trim_start_matches('/'));
        }
        if let Some(q) = &self.query {
            s.push('?');
            s.push_str(q);
        }
        if let Some(f) = &self.fragment {
            s.push('#');
            s.push_str(f);
        }
        s
    }
}

impl fmt::Display for DidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_url_string())
    }
}

fn is_valid_fqdn(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    }) && domain.contains('.')
        || domain == "localhost"
}

fn is_percent_safe(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%'))
}

impl FromStr for DidUrl {
    type Err = OriginalsError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rest = input
            .strip_prefix("did:")
            .ok_or_else(|| OriginalsError::InvalidDid(format!("missing 'did:' prefix: {input}")))?;

        // Split off fragment, then query, then path — in that precedence order
        // so a '#' inside a query string is still treated as the fragment
        // delimiter, matching standard URL parsing.
        let (before_fragment, fragment) = match rest.split_once('#') {
            Some((a, b)) => (a, Some(b.to_string())),
            None => (rest, None),
        };
        let (before_query, query) = match before_fragment.split_once('?') {
            Some((a, b)) => (a, Some(b.to_string())),
            None => (before_fragment, None),
        };
        let (method_and_id, path) = match before_query.split_once('/') {
            Some((a, b)) => (a, Some(b.to_string())),
            None => (before_query, None),
        };

        let mut parts = method_and_id.splitn(2, ':');
        let method_str = parts
            .next()
            .ok_or_else(|| OriginalsError::InvalidDid(input.to_string()))?;
        let method_specific = parts
            .next()
            .ok_or_else(|| OriginalsError::InvalidDid(format!("missing method-specific-id: {input}")))?;
        let method: Method = method_str.parse()?;

        let method_id = match method {
            Method::Peer => {
                if !method_specific.starts_with("4z") {
                    return Err(OriginalsError::InvalidDid(
                        "did:peer requires numalgo-4 long form ('4z...')".into(),
                    ));
                }
                if path.is_some() || query.is_some() {
                    return Err(OriginalsError::RepresentationNotSupported(
                        "did:peer does not support path or query components".into(),
                    ));
                }
                MethodId::Peer { numalgo4: method_specific.to_string() }
            }
            Method::Webvh => {
                let mut segs = method_specific.split(':');
                let domain = segs
                    .next()
                    .ok_or_else(|| OriginalsError::InvalidDid("did:webvh missing domain".into()))?
                    .to_string();
                if !is_valid_fqdn(&domain) {
                    return Err(OriginalsError::InvalidDid(format!("not a valid FQDN: {domain}")));
                }
                let path_segments: Vec<String> = segs.map(|s| s.to_string()).collect();
                for seg in &path_segments {
                    if !is_percent_safe(seg) {
                        return Err(OriginalsError::InvalidDid(format!(
                            "path segment is not percent-safe: {seg}"
                        )));
                    }
                }
                MethodId::Webvh { domain, path_segments }
            }
            Method::Btco => {
                if path.is_some() {
                    return Err(OriginalsError::RepresentationNotSupported(
                        "did:btco does not support path components".into(),
                    ));
                }
                let mut segs: Vec<&str> = method_specific.split(':').collect();
                let network = if segs.len() == 2 {
                    let net = segs.remove(0);
                    match net {
                        "test" => BtcoNetwork::Test,
                        "sig" => BtcoNetwork::Sig,
                        other => {
                            return Err(OriginalsError::InvalidDid(format!(
                                "unknown btco network: {other}"
                            )))
                        }
                    }
                } else if segs.len() == 1 {
                    BtcoNetwork::Mainnet
                } else {
                    return Err(OriginalsError::InvalidDid(format!(
                        "malformed did:btco identifier: {method_specific}"
                    )));
                };
                let satoshi: u128 = segs[0]
                    .parse()
                    .map_err(|_| OriginalsError::InvalidDid(format!("satoshi is not numeric: {}", segs[0])))?;
                if satoshi >= MAX_SATOSHI {
                    return Err(OriginalsError::InvalidSatoshi(satoshi));
                }
                MethodId::Btco { network, satoshi: satoshi as u64 }
            }
        };

        Ok(DidUrl { method, method_id, path, query, fragment })
    }
}
