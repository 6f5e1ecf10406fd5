//! Wire-only response models.
//!
//! Board and issue-detail responses serialize straight from the core types;
//! the health payload and the town list envelopes are assembled here.

use derrick::store::StoreHealth;
use derrick::town::{Agent, Convoy, Message, Rig};
use serde::{Deserialize, Serialize};

/// Response from `GET /api/v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when the store is initialized and probe-able, `"degraded"`
    /// otherwise.
    pub status: String,

    /// Whether the underlying issue store is initialized.
    pub store_initialized: bool,

    /// Daemon version.
    pub version: String,

    /// The store's reported version, if it could be queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_version: Option<String>,

    /// Error encountered while probing the store, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    /// Assemble the health payload from the store's pass-through report.
    pub fn new(version: &str, health: StoreHealth) -> Self {
        let status = if health.initialized && health.error.is_none() {
            "ok"
        } else {
            "degraded"
        };

        Self {
            status: status.to_string(),
            store_initialized: health.initialized,
            version: version.to_string(),
            store_version: health.version,
            error: health.error,
        }
    }
}

/// Response from `GET /api/v1/town/rigs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigsResponse {
    /// All rigs in the town
    pub rigs: Vec<Rig>,

    /// Number of rigs
    pub total: usize,
}

impl RigsResponse {
    pub fn new(rigs: Vec<Rig>) -> Self {
        let total = rigs.len();
        Self { rigs, total }
    }
}

/// Response from `GET /api/v1/town/agents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsResponse {
    /// Every agent in the town
    pub agents: Vec<Agent>,

    /// Number of agents
    pub total: usize,

    /// Agents with a live session
    pub active: usize,

    /// Agents without one
    pub offline: usize,
}

impl AgentsResponse {
    pub fn new(agents: Vec<Agent>) -> Self {
        let total = agents.len();
        let active = agents.iter().filter(|a| a.is_active()).count();
        Self {
            agents,
            total,
            active,
            offline: total - active,
        }
    }
}

/// Response from `GET /api/v1/town/convoys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvoysResponse {
    /// Convoys currently in flight
    pub convoys: Vec<Convoy>,

    /// Number of convoys
    pub total: usize,
}

impl ConvoysResponse {
    pub fn new(convoys: Vec<Convoy>) -> Self {
        let total = convoys.len();
        Self { convoys, total }
    }
}

/// Response from `GET /api/v1/town/mail/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailResponse {
    /// Inbox messages for the address
    pub messages: Vec<Message>,

    /// Number of messages
    pub total: usize,
}

impl MailResponse {
    pub fn new(messages: Vec<Message>) -> Self {
        let total = messages.len();
        Self { messages, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derrick::town::{AgentRole, AgentStatus};

    #[test]
    fn agents_envelope_splits_by_liveness() {
        let agent = |status| Agent {
            role: AgentRole::Polecat,
            name: "nux".to_string(),
            rig: Some("alpha".to_string()),
            status,
        };

        let response = AgentsResponse::new(vec![
            agent(AgentStatus::Active),
            agent(AgentStatus::Offline),
            agent(AgentStatus::Offline),
        ]);

        assert_eq!(response.total, 3);
        assert_eq!(response.active, 1);
        assert_eq!(response.offline, 2);
    }

    #[test]
    fn healthy_store_is_ok() {
        let response = HealthResponse::new(
            "0.1.0",
            StoreHealth {
                initialized: true,
                version: Some("bd 0.9.2".to_string()),
                error: None,
            },
        );

        assert_eq!(response.status, "ok");
        assert!(response.store_initialized);
        assert_eq!(response.store_version.as_deref(), Some("bd 0.9.2"));
    }

    #[test]
    fn uninitialized_store_is_degraded() {
        let response = HealthResponse::new(
            "0.1.0",
            StoreHealth {
                initialized: false,
                version: None,
                error: Some("no database".to_string()),
            },
        );

        assert_eq!(response.status, "degraded");
        assert_eq!(response.error.as_deref(), Some("no database"));
    }
}
