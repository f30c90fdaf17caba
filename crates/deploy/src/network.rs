//! Network profiles for the supported deployment environments.

/// The deployment environments with dedicated provisioning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Mainnet,
    Rinkeby,
    Mumbai,
    Development,
}

impl Network {
    /// Resolve an environment name to a known network.
    ///
    /// Matching is exact on the lowercase network name. Any unrecognized name
    /// resolves to [`Network::Development`] instead of failing, so runs
    /// against networks without dedicated parameters use the local defaults.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Development)
    }
}

/// Parameter bundle for provisioning the ballot artifacts on one network.
///
/// Resolved once per run and discarded afterwards; every resolution returns
/// an independent owned copy, leaving the canonical values untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// Display name of the badge collection.
    pub name: String,
    /// Short token symbol.
    pub symbol: String,
    /// Metadata URI template for the badge collection.
    pub uri: String,
    /// Badge token ids to mint at construction.
    pub token_ids: Vec<u64>,
    /// Supply per badge token id, index-aligned with `token_ids`.
    pub token_supplies: Vec<u64>,
}

impl NetworkProfile {
    /// The statically configured profile for a network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self {
                name: "Ballot Badge".to_string(),
                symbol: "BALLOT".to_string(),
                uri: "https://meta.ballotbox.dev/badge/{id}.json".to_string(),
                token_ids: vec![1, 2, 3, 4],
                token_supplies: vec![250, 250, 250, 100],
            },
            Network::Rinkeby => Self {
                name: "Ballot Badge".to_string(),
                symbol: "BALLOT".to_string(),
                uri: "https://meta.ballotbox.dev/rinkeby/badge/{id}.json".to_string(),
                token_ids: vec![1, 2, 3],
                token_supplies: vec![50, 50, 50],
            },
            Network::Mumbai => Self {
                name: "Ballot Badge".to_string(),
                symbol: "BALLOT".to_string(),
                uri: "https://meta.ballotbox.dev/mumbai/badge/{id}.json".to_string(),
                token_ids: vec![1, 2, 3],
                token_supplies: vec![50, 50, 50],
            },
            Network::Development => Self {
                name: "Ballot Badge".to_string(),
                symbol: "BALLOT".to_string(),
                uri: "http://127.0.0.1:3000/api/badge/{id}.json".to_string(),
                token_ids: vec![1, 2, 3],
                token_supplies: vec![10, 10, 10],
            },
        }
    }

    /// Resolve a profile directly from an environment name, falling back to
    /// the development profile for unrecognized names.
    pub fn resolve(name: &str) -> Self {
        Self::for_network(Network::from_name(name))
    }
}
