//! Core types for the Perimeter SDK

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const PORT_RANGE_SEPARATOR: char = '-';

/// Port access policy applied to a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortPolicy {
    AllowAll,
    Restricted,
    DenyAll,
}

impl Default for PortPolicy {
    fn default() -> Self {
        Self::AllowAll
    }
}

impl fmt::Display for PortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortPolicy::AllowAll => write!(f, "ALLOW_ALL"),
            PortPolicy::Restricted => write!(f, "RESTRICTED"),
            PortPolicy::DenyAll => write!(f, "DENY_ALL"),
        }
    }
}

impl FromStr for PortPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ALLOW_ALL" => Ok(PortPolicy::AllowAll),
            "RESTRICTED" => Ok(PortPolicy::Restricted),
            "DENY_ALL" => Ok(PortPolicy::DenyAll),
            other => Err(Error::InvalidPolicy(other.to_string())),
        }
    }
}

/// Inclusive port range. A single port is a range with start == end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPortRange {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("empty"));
        }

        if let Some((start, end)) = s.split_once(PORT_RANGE_SEPARATOR) {
            let start = parse_port(start).map_err(|e| invalid(&e))?;
            let end = parse_port(end).map_err(|e| invalid(&e))?;
            if end < start {
                return Err(invalid("end port is lower than start port"));
            }
            Ok(Self { start, end })
        } else {
            let port = parse_port(s).map_err(|e| invalid(&e))?;
            Ok(Self::single(port))
        }
    }
}

fn parse_port(s: &str) -> std::result::Result<u16, String> {
    let port: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("\"{}\" is not a valid port number", s))?;
    if port == 0 {
        return Err("port 0 is not allowed".to_string());
    }
    Ok(port)
}

/// Per-protocol access rule: a policy plus the port ranges it opens.
///
/// An ALLOW_ALL policy carries no ports. DENY_ALL is stored as RESTRICTED
/// with an empty port list, matching the provider's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub policy: PortPolicy,
    #[serde(default)]
    pub ports: Vec<PortRange>,
}

impl Protocol {
    pub fn new(policy: PortPolicy, ports: Vec<PortRange>) -> Self {
        match policy {
            PortPolicy::AllowAll => Self {
                policy,
                ports: Vec::new(),
            },
            PortPolicy::DenyAll => Self {
                policy: PortPolicy::Restricted,
                ports: Vec::new(),
            },
            PortPolicy::Restricted => Self { policy, ports },
        }
    }

    pub fn allow_all() -> Self {
        Self {
            policy: PortPolicy::AllowAll,
            ports: Vec::new(),
        }
    }

    /// Parse a RESTRICTED protocol from port strings ("443", "8000-8080").
    pub fn restricted<S: AsRef<str>>(ports: &[S]) -> Result<Self> {
        let ports = ports
            .iter()
            .map(|p| p.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            policy: PortPolicy::Restricted,
            ports,
        })
    }

    pub fn ports_to_strings(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.to_string()).collect()
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Protocol rules attached to a protected resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocols {
    pub allow_icmp: bool,
    pub tcp: Protocol,
    pub udp: Protocol,
}

impl Default for Protocols {
    fn default() -> Self {
        Self {
            allow_icmp: true,
            tcp: Protocol::allow_all(),
            udp: Protocol::allow_all(),
        }
    }
}

/// Remote network a connector is deployed into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNetwork {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

/// Connector deployed in a remote network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub remote_network_id: String,
    #[serde(default)]
    pub status_updates_enabled: bool,
}

/// Registration tokens issued for a connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorTokens {
    pub id: String,
    pub connector_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Protected resource reachable through a remote network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetResource {
    pub id: String,
    pub name: String,
    pub address: String,
    pub remote_network_id: String,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub protocols: Protocols,
    #[serde(default)]
    pub is_active: bool,
}

/// Group membership origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    Manual,
    Synced,
    System,
}

impl Default for GroupType {
    fn default() -> Self {
        Self::Manual
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::Manual => write!(f, "MANUAL"),
            GroupType::Synced => write!(f, "SYNCED"),
            GroupType::System => write!(f, "SYSTEM"),
        }
    }
}

impl FromStr for GroupType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MANUAL" => Ok(GroupType::Manual),
            "SYNCED" => Ok(GroupType::Synced),
            "SYSTEM" => Ok(GroupType::System),
            other => Err(Error::InvalidConfig(format!(
                "unknown group type: {other}"
            ))),
        }
    }
}

/// Access group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub group_type: GroupType,
    pub security_policy_id: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// User role within the provider tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Devops,
    Support,
    Member,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Member
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Devops => write!(f, "DEVOPS"),
            UserRole::Support => write!(f, "SUPPORT"),
            UserRole::Member => write!(f, "MEMBER"),
        }
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "DEVOPS" => Ok(UserRole::Devops),
            "SUPPORT" => Ok(UserRole::Support),
            "MEMBER" => Ok(UserRole::Member),
            other => Err(Error::InvalidConfig(format!("unknown user role: {other}"))),
        }
    }
}

/// Tenant user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub is_active: bool,
}

/// Service account for programmatic resource access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub id: String,
    pub name: String,
}

/// API key attached to a service account.
///
/// The token value is only returned by the provider at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub id: String,
    pub name: String,
    pub service_account_id: String,
    pub token: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Security policy defined in the provider admin console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_port_parses_and_prints() {
        let range: PortRange = "443".parse().unwrap();
        assert_eq!(range, PortRange::single(443));
        assert_eq!(range.to_string(), "443");
    }

    #[test]
    fn port_range_parses_and_prints() {
        let range: PortRange = "8000-8080".parse().unwrap();
        assert_eq!(range.start, 8000);
        assert_eq!(range.end, 8080);
        assert_eq!(range.to_string(), "8000-8080");
    }

    #[test]
    fn bad_port_ranges_are_rejected() {
        for input in ["", "abc", "0", "70000", "443-80", "1-2-3"] {
            let result: Result<PortRange> = input.parse();
            assert!(result.is_err(), "expected {input:?} to be rejected");
        }
    }

    #[test]
    fn deny_all_normalizes_to_restricted() {
        let proto = Protocol::new(PortPolicy::DenyAll, vec![PortRange::single(22)]);
        assert_eq!(proto.policy, PortPolicy::Restricted);
        assert!(proto.ports.is_empty());
    }

    #[test]
    fn allow_all_discards_ports() {
        let proto = Protocol::new(PortPolicy::AllowAll, vec![PortRange::single(22)]);
        assert_eq!(proto.policy, PortPolicy::AllowAll);
        assert!(proto.ports.is_empty());
    }

    #[test]
    fn restricted_parses_port_strings() {
        let proto = Protocol::restricted(&["443", "8000-8080"]).unwrap();
        assert_eq!(proto.ports_to_strings(), vec!["443", "8000-8080"]);
    }

    #[test]
    fn default_protocols_allow_everything() {
        let protocols = Protocols::default();
        assert!(protocols.allow_icmp);
        assert_eq!(protocols.tcp.policy, PortPolicy::AllowAll);
        assert_eq!(protocols.udp.policy, PortPolicy::AllowAll);
    }

    #[test]
    fn policy_round_trips_through_strings() {
        for policy in [
            PortPolicy::AllowAll,
            PortPolicy::Restricted,
            PortPolicy::DenyAll,
        ] {
            let parsed: PortPolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
        assert!("ALLOW_SOME".parse::<PortPolicy>().is_err());
    }
}
