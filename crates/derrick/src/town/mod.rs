//! Town model: the agent workspace surrounding the issue tracker.
//!
//! A town is a workspace root holding one directory per rig (a managed
//! repository) plus a `mayor/` directory for the coordinating agent. Each
//! rig hosts a fixed cast of agents: a witness, a refinery, and any number
//! of polecats and crew members. The town also tracks convoys (batches of
//! work in flight) and per-agent mail.
//!
//! Everything here is a read-only projection, like the board: the town
//! tooling owns the data, this crate only observes it. [`TownStore`] is the
//! seam; [`FsTownStore`] is the production adapter.

mod fs;

pub use fs::FsTownStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Role an agent plays in the town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Town-level coordinator
    Mayor,

    /// Background daemon watching the whole town
    Deacon,

    /// Per-rig observer
    Witness,

    /// Per-rig merge worker
    Refinery,

    /// Per-rig task worker
    Polecat,

    /// Per-rig long-lived named worker
    Crew,
}

/// Liveness of an agent, derived from its multiplexer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// A session for this agent exists
    Active,

    /// No session found
    Offline,
}

/// A single agent observed in the town.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Role within the town
    pub role: AgentRole,

    /// Agent name (`"mayor"`, `"witness"`, or the worker's directory name)
    pub name: String,

    /// Rig the agent belongs to; absent for town-level agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,

    /// Whether the agent currently has a live session
    pub status: AgentStatus,
}

impl Agent {
    /// True when the agent has a live session.
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

/// A managed repository inside the town.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rig {
    /// Directory name under the town root
    pub name: String,

    /// Absolute path of the rig directory
    pub path: String,

    /// The rig's witness agent, if its workspace exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<Agent>,

    /// The rig's refinery agent, if its workspace exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinery: Option<Agent>,

    /// Task workers, in directory order
    #[serde(default)]
    pub polecats: Vec<Agent>,

    /// Named long-lived workers, in directory order
    #[serde(default)]
    pub crew: Vec<Agent>,
}

impl Rig {
    /// All agents stationed on this rig: witness, refinery, polecats, crew.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.witness
            .iter()
            .chain(self.refinery.iter())
            .chain(self.polecats.iter())
            .chain(self.crew.iter())
    }
}

/// A batch of work moving through the town.
///
/// Convoys come from the town CLI as JSON; every field is optional on the
/// wire because the CLI's schema is not ours to pin down.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Convoy {
    /// Convoy identifier
    #[serde(default)]
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Convoy state as reported by the CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Ids of issues riding in the convoy
    #[serde(default)]
    pub issues: Vec<String>,
}

/// A mail message addressed to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Sending address
    #[serde(default)]
    pub from: String,

    /// Receiving address
    #[serde(default)]
    pub to: String,

    /// Subject line
    #[serde(default)]
    pub subject: String,

    /// Message body, if the CLI includes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Timestamp string as reported by the CLI, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// The full observed town structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Town {
    /// Town root directory
    pub root: String,

    /// Town name from the mayor's config, when present
    #[serde(default)]
    pub name: String,

    /// The mayor, if its workspace exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mayor: Option<Agent>,

    /// The deacon, present only while its daemon runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deacon: Option<Agent>,

    /// Rigs in directory order
    #[serde(default)]
    pub rigs: Vec<Rig>,

    /// Convoys currently in flight
    #[serde(default)]
    pub convoys: Vec<Convoy>,
}

impl Town {
    /// Every agent in the town, town-level agents first, then each rig's
    /// cast in rig order.
    pub fn agents(&self) -> Vec<Agent> {
        let mut agents = Vec::new();
        agents.extend(self.mayor.iter().cloned());
        agents.extend(self.deacon.iter().cloned());
        for rig in &self.rigs {
            agents.extend(rig.agents().cloned());
        }
        agents
    }

    /// Look up a rig by directory name.
    pub fn rig(&self, name: &str) -> Option<&Rig> {
        self.rigs.iter().find(|rig| rig.name == name)
    }
}

/// Aggregate health report for the town.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownStatus {
    /// Town root directory
    pub town_root: String,

    /// False when the town is missing or could not be read
    pub healthy: bool,

    /// What went wrong, when unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Number of rigs found
    pub active_rigs: usize,

    /// Agents observed across the whole town
    pub total_agents: usize,

    /// Agents with a live session
    pub active_agents: usize,

    /// Convoys currently in flight
    pub open_convoys: usize,
}

impl TownStatus {
    /// Summarize a successfully observed town.
    pub fn of(town: &Town) -> Self {
        let agents = town.agents();
        Self {
            town_root: town.root.clone(),
            healthy: true,
            error: None,
            active_rigs: town.rigs.len(),
            total_agents: agents.len(),
            active_agents: agents.iter().filter(|a| a.is_active()).count(),
            open_convoys: town.convoys.len(),
        }
    }

    /// Report a town that could not be observed.
    pub fn unhealthy(town_root: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            town_root: town_root.into(),
            healthy: false,
            error: Some(error.into()),
            active_rigs: 0,
            total_agents: 0,
            active_agents: 0,
            open_convoys: 0,
        }
    }
}

/// Mayor-side town configuration file (`mayor/town.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TownConfig {
    /// Town name
    #[serde(default)]
    pub name: String,
}

/// Seam to the town workspace.
///
/// Same shape as the issue-store seam: async, object-safe, and owned by
/// the daemon state. The mock lives behind the `test-util` feature.
#[async_trait]
pub trait TownStore: Send + Sync {
    /// The town root this store observes.
    fn root(&self) -> &Path;

    /// Observe the full town structure.
    async fn town(&self) -> Result<Town>;

    /// Fetch inbox messages for an agent address.
    async fn mail(&self, address: &str) -> Result<Vec<Message>>;
}

/// In-memory town store for tests.
#[cfg(any(test, feature = "test-util"))]
pub struct MockTownStore {
    root: std::path::PathBuf,
    town: std::result::Result<Town, String>,
    mail: std::collections::HashMap<String, Vec<Message>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockTownStore {
    /// A store that hands out the given town.
    pub fn new(town: Town) -> Self {
        Self {
            root: std::path::PathBuf::from(&town.root),
            town: Ok(town),
            mail: std::collections::HashMap::new(),
        }
    }

    /// A store whose observations always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            root: std::path::PathBuf::from("/mock/town"),
            town: Err(message.into()),
            mail: std::collections::HashMap::new(),
        }
    }

    /// Stock the inbox for an address.
    #[must_use]
    pub fn with_mail(mut self, address: impl Into<String>, messages: Vec<Message>) -> Self {
        self.mail.insert(address.into(), messages);
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl TownStore for MockTownStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn town(&self) -> Result<Town> {
        self.town.clone().map_err(crate::error::Error::Store)
    }

    async fn mail(&self, address: &str) -> Result<Vec<Message>> {
        Ok(self.mail.get(address).cloned().unwrap_or_default())
    }
}
