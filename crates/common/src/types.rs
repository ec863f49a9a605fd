use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One address the external monitor should watch.
///
/// Field order matches the stanza layout the monitor reads:
/// `address`, `rpc_url`, `chain`, `alert_balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRecord {
    /// `0x`-prefixed, 40 hex digit account address
    pub address: String,
    /// Absolute RPC endpoint URL used for balance queries
    pub rpc_url: String,
    /// Network name, always a key of the [`NetworkRegistry`]
    pub chain: String,
    /// Balance below which an alert fires (strictly positive)
    pub alert_balance: u64,
}

/// Top-level shape of `AddressAndChain.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    #[serde(default)]
    pub addresses: Vec<MonitorRecord>,
}

/// A fully validated form submission.
///
/// The webhook URL travels with the record but is persisted separately,
/// in the environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub record: MonitorRecord,
    pub webhook_url: String,
}

/// Raw, unvalidated intake form fields.
///
/// A missing field stays empty and surfaces as a validation failure.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub webhook_url: String,
    pub network: String,
    pub rpc_url: String,
    pub address: String,
    pub alert_balance: String,
}

impl RawSubmission {
    /// Build from decoded form pairs. When a field repeats, the first
    /// occurrence is kept; unknown fields are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::default();
        let mut seen = [false; 5];

        for (key, value) in pairs {
            let (slot, field) = match key.as_ref() {
                "webhook_url" => (0, &mut raw.webhook_url),
                "network" => (1, &mut raw.network),
                "rpc_url" => (2, &mut raw.rpc_url),
                "address" => (3, &mut raw.address),
                "alert_balance" => (4, &mut raw.alert_balance),
                _ => continue,
            };
            if !seen[slot] {
                seen[slot] = true;
                *field = value.into();
            }
        }

        raw
    }
}

/// A supported network and the endpoint (or identifier) it defaults to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    pub name: String,
    pub default_endpoint: String,
}

/// Immutable set of networks accepted by the intake form.
///
/// Built once at startup and shared read-only with every handler.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, Network>,
}

impl NetworkRegistry {
    /// The networks the monitor knows how to query.
    pub fn builtin() -> Self {
        Self::from_entries([
            ("Bitcoin", "Bitcoin"),
            (
                "Sepolia",
                "https://sepolia.infura.io/v3/YOUR_INFURA_PROJECT_ID",
            ),
            (
                "Arbitrum",
                "https://arbitrum-mainnet.infura.io/v3/YOUR_INFURA_PROJECT_ID",
            ),
        ])
    }

    pub fn from_entries<I, N, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<String>,
    {
        let networks = entries
            .into_iter()
            .map(|(name, endpoint)| {
                let name = name.into();
                let network = Network {
                    name: name.clone(),
                    default_endpoint: endpoint.into(),
                };
                (name, network)
            })
            .collect();
        Self { networks }
    }

    /// Whether `name` is supported (exact, case-sensitive match).
    pub fn contains(&self, name: &str) -> bool {
        self.networks.contains_key(name)
    }

    /// Networks in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
