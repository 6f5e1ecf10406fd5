//! Filesystem-backed town store.
//!
//! Observes the town by scanning the workspace root and shelling out to the
//! town CLI (`gt`) and the terminal multiplexer (`tmux`). A directory under
//! the root counts as a rig when it carries a `polecats/`, `witness/`, or
//! `.beads/` marker; agent liveness is read off the multiplexer's session
//! list, where sessions are named `gt-mayor`, `gt-<rig>-witness`,
//! `gt-<rig>-refinery`, `gt-<rig>-<polecat>`, and `gt-<rig>-crew-<name>`.

use super::{Agent, AgentRole, AgentStatus, Convoy, Message, Rig, Town, TownConfig, TownStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Default town CLI program name.
const DEFAULT_TOWN_PROGRAM: &str = "gt";

/// Default terminal multiplexer program name.
const DEFAULT_MUX_PROGRAM: &str = "tmux";

/// Directory whose presence marks an initialized town.
const MAYOR_DIR: &str = "mayor";

/// Town store that observes a workspace on the local filesystem.
pub struct FsTownStore {
    root: PathBuf,
    town_program: String,
    mux_program: String,
}

impl FsTownStore {
    /// Create a store observing the town at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            town_program: DEFAULT_TOWN_PROGRAM.to_string(),
            mux_program: DEFAULT_MUX_PROGRAM.to_string(),
        }
    }

    /// The conventional town location, `$HOME/gt`.
    pub fn default_root() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gt")
    }

    /// Override the town CLI program.
    #[must_use]
    pub fn with_town_program(mut self, program: impl Into<String>) -> Self {
        self.town_program = program.into();
        self
    }

    /// Override the multiplexer program.
    #[must_use]
    pub fn with_mux_program(mut self, program: impl Into<String>) -> Self {
        self.mux_program = program.into();
        self
    }

    fn town_exists(&self) -> bool {
        self.root.join(MAYOR_DIR).is_dir()
    }

    /// Live multiplexer session names. A missing or failing multiplexer
    /// means no live sessions, not an error.
    async fn sessions(&self) -> HashSet<String> {
        let output = Command::new(&self.mux_program)
            .args(["list-sessions", "-F", "#{session_name}"])
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            _ => HashSet::new(),
        }
    }

    fn agent_status(session: &str, sessions: &HashSet<String>) -> AgentStatus {
        if sessions.contains(session) {
            AgentStatus::Active
        } else {
            AgentStatus::Offline
        }
    }

    /// Workers under a rig subdirectory (`polecats/` or `crew/`), in name
    /// order. Dot-directories are skipped.
    fn scan_workers(
        &self,
        rig: &str,
        subdir: &str,
        role: AgentRole,
        sessions: &HashSet<String>,
    ) -> Vec<Agent> {
        let dir = self.root.join(rig).join(subdir);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let session = match role {
                    AgentRole::Crew => format!("gt-{rig}-crew-{name}"),
                    _ => format!("gt-{rig}-{name}"),
                };
                Agent {
                    role,
                    name,
                    rig: Some(rig.to_string()),
                    status: Self::agent_status(&session, sessions),
                }
            })
            .collect()
    }

    fn scan_rigs(&self, sessions: &HashSet<String>) -> Result<Vec<Rig>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)?
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != MAYOR_DIR && !name.starts_with('.'))
            .collect();
        names.sort();

        let mut rigs = Vec::new();
        for name in names {
            let path = self.root.join(&name);
            let is_rig = path.join("polecats").is_dir()
                || path.join("witness").is_dir()
                || path.join(".beads").is_dir();
            if !is_rig {
                continue;
            }

            let witness = path.join("witness").is_dir().then(|| Agent {
                role: AgentRole::Witness,
                name: "witness".to_string(),
                rig: Some(name.clone()),
                status: Self::agent_status(&format!("gt-{name}-witness"), sessions),
            });
            let refinery = path.join("refinery").is_dir().then(|| Agent {
                role: AgentRole::Refinery,
                name: "refinery".to_string(),
                rig: Some(name.clone()),
                status: Self::agent_status(&format!("gt-{name}-refinery"), sessions),
            });

            rigs.push(Rig {
                path: path.to_string_lossy().into_owned(),
                witness,
                refinery,
                polecats: self.scan_workers(&name, "polecats", AgentRole::Polecat, sessions),
                crew: self.scan_workers(&name, "crew", AgentRole::Crew, sessions),
                name,
            });
        }

        Ok(rigs)
    }

    fn read_config(&self) -> Option<TownConfig> {
        let data = std::fs::read(self.root.join(MAYOR_DIR).join("town.json")).ok()?;
        serde_json::from_slice(&data).ok()
    }

    /// The deacon counts as running when the daemon pid file exists or the
    /// town CLI reports a live daemon.
    async fn daemon_running(&self) -> bool {
        if self.root.join(MAYOR_DIR).join("daemon.pid").is_file() {
            return true;
        }

        matches!(
            Command::new(&self.town_program)
                .args(["daemon", "status"])
                .current_dir(&self.root)
                .output()
                .await,
            Ok(output) if output.status.success()
        )
    }

    /// Convoys from `gt convoy list --json`. The CLI may be absent or the
    /// command may fail; both mean no convoys, matching how the rest of the
    /// town is observed best-effort.
    async fn convoys(&self) -> Vec<Convoy> {
        let output = Command::new(&self.town_program)
            .args(["convoy", "list", "--json"])
            .current_dir(&self.root)
            .output()
            .await;

        let Ok(output) = output else {
            return Vec::new();
        };
        if !output.status.success() {
            return Vec::new();
        }

        if let Ok(convoys) = serde_json::from_slice::<Vec<Convoy>>(&output.stdout) {
            return convoys;
        }
        // A single object is also accepted, the CLI emits one when only one
        // convoy is open.
        match serde_json::from_slice::<Convoy>(&output.stdout) {
            Ok(convoy) => vec![convoy],
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl TownStore for FsTownStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn town(&self) -> Result<Town> {
        if !self.town_exists() {
            return Err(Error::Store(format!(
                "town not found at {}",
                self.root.display()
            )));
        }

        let sessions = self.sessions().await;

        let mayor = Some(Agent {
            role: AgentRole::Mayor,
            name: "mayor".to_string(),
            rig: None,
            status: Self::agent_status("gt-mayor", &sessions),
        });

        let deacon = self.daemon_running().await.then(|| Agent {
            role: AgentRole::Deacon,
            name: "deacon".to_string(),
            rig: None,
            status: AgentStatus::Active,
        });

        let rigs = self.scan_rigs(&sessions)?;
        let convoys = self.convoys().await;

        let town = Town {
            root: self.root.to_string_lossy().into_owned(),
            name: self.read_config().map(|c| c.name).unwrap_or_default(),
            mayor,
            deacon,
            rigs,
            convoys,
        };
        tracing::debug!(
            rigs = town.rigs.len(),
            convoys = town.convoys.len(),
            "observed town"
        );
        Ok(town)
    }

    async fn mail(&self, address: &str) -> Result<Vec<Message>> {
        let output = Command::new(&self.town_program)
            .args(["mail", "inbox", "--json"])
            .env("GT_ROLE", address)
            .current_dir(&self.root)
            .output()
            .await;

        let Ok(output) = output else {
            return Ok(Vec::new());
        };
        if !output.status.success() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&output.stdout).unwrap_or_default())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Drop a fake CLI script into `dir` and return its path.
    fn write_fake_cli(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Minimal town skeleton: a mayor directory plus one rig with a
    /// witness and one polecat.
    fn scaffold_town(root: &Path) {
        std::fs::create_dir_all(root.join("mayor")).unwrap();
        std::fs::write(
            root.join("mayor/town.json"),
            r#"{"name":"testville"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(root.join("alpha/witness")).unwrap();
        std::fs::create_dir_all(root.join("alpha/polecats/nux")).unwrap();
    }

    /// A store wired to CLIs that always fail, so observation falls back
    /// to filesystem evidence only.
    fn offline_store(root: &Path) -> FsTownStore {
        let gt = write_fake_cli(root, "fake-gt", "exit 1");
        let mux = write_fake_cli(root, "fake-mux", "exit 1");
        FsTownStore::new(root)
            .with_town_program(gt)
            .with_mux_program(mux)
    }

    #[tokio::test]
    async fn missing_town_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = offline_store(dir.path());
        // No mayor/ directory yet.
        std::fs::remove_dir_all(dir.path().join("mayor")).ok();

        let err = store.town().await.unwrap_err();
        assert!(err.to_string().contains("town not found"));
    }

    #[tokio::test]
    async fn scans_rigs_and_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());
        // A directory without rig markers is not a rig.
        std::fs::create_dir_all(dir.path().join("scratch")).unwrap();

        let town = offline_store(dir.path()).town().await.unwrap();

        assert_eq!(town.name, "testville");
        assert_eq!(town.rigs.len(), 1);
        let rig = &town.rigs[0];
        assert_eq!(rig.name, "alpha");
        assert!(rig.witness.is_some());
        assert!(rig.refinery.is_none());
        assert_eq!(rig.polecats.len(), 1);
        assert_eq!(rig.polecats[0].name, "nux");
        assert_eq!(rig.polecats[0].rig.as_deref(), Some("alpha"));
    }

    #[tokio::test]
    async fn agent_status_follows_mux_sessions() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());
        std::fs::create_dir_all(dir.path().join("alpha/refinery")).unwrap();

        let gt = write_fake_cli(dir.path(), "fake-gt", "exit 1");
        let mux = write_fake_cli(
            dir.path(),
            "fake-mux",
            "printf 'gt-mayor\\ngt-alpha-witness\\n'",
        );
        let store = FsTownStore::new(dir.path())
            .with_town_program(gt)
            .with_mux_program(mux);

        let town = store.town().await.unwrap();

        assert_eq!(town.mayor.unwrap().status, AgentStatus::Active);
        let rig = &town.rigs[0];
        assert_eq!(rig.witness.as_ref().unwrap().status, AgentStatus::Active);
        assert_eq!(rig.refinery.as_ref().unwrap().status, AgentStatus::Offline);
        assert_eq!(rig.polecats[0].status, AgentStatus::Offline);
    }

    #[tokio::test]
    async fn crew_sessions_use_the_crew_prefix() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());
        std::fs::create_dir_all(dir.path().join("alpha/crew/ace")).unwrap();

        let gt = write_fake_cli(dir.path(), "fake-gt", "exit 1");
        let mux = write_fake_cli(dir.path(), "fake-mux", "printf 'gt-alpha-crew-ace\\n'");
        let store = FsTownStore::new(dir.path())
            .with_town_program(gt)
            .with_mux_program(mux);

        let town = store.town().await.unwrap();
        let rig = &town.rigs[0];

        assert_eq!(rig.crew.len(), 1);
        assert_eq!(rig.crew[0].status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn pid_file_marks_deacon_active() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());
        std::fs::write(dir.path().join("mayor/daemon.pid"), "12345").unwrap();

        let town = offline_store(dir.path()).town().await.unwrap();

        let deacon = town.deacon.unwrap();
        assert_eq!(deacon.role, AgentRole::Deacon);
        assert_eq!(deacon.status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn no_daemon_means_no_deacon() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());

        let town = offline_store(dir.path()).town().await.unwrap();
        assert!(town.deacon.is_none());
    }

    #[tokio::test]
    async fn convoys_come_from_the_town_cli() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());

        let gt = write_fake_cli(
            dir.path(),
            "fake-gt",
            r#"case "$1" in
convoy) echo '[{"id":"hq-cv-1","title":"ship it"}]' ;;
*) exit 1 ;;
esac"#,
        );
        let mux = write_fake_cli(dir.path(), "fake-mux", "exit 1");
        let store = FsTownStore::new(dir.path())
            .with_town_program(gt)
            .with_mux_program(mux);

        let town = store.town().await.unwrap();

        assert_eq!(town.convoys.len(), 1);
        assert_eq!(town.convoys[0].id, "hq-cv-1");
    }

    #[tokio::test]
    async fn convoy_failure_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());

        let town = offline_store(dir.path()).town().await.unwrap();
        assert!(town.convoys.is_empty());
    }

    #[tokio::test]
    async fn mail_runs_as_the_addressed_role() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());

        // Echo the role back so the test can see the env wiring.
        let gt = write_fake_cli(
            dir.path(),
            "fake-gt",
            r#"echo "[{\"from\":\"mayor\",\"to\":\"$GT_ROLE\",\"subject\":\"hi\"}]""#,
        );
        let store = FsTownStore::new(dir.path()).with_town_program(gt);

        let inbox = store.mail("alpha/witness").await.unwrap();

        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].to, "alpha/witness");
        assert_eq!(inbox[0].subject, "hi");
    }

    #[tokio::test]
    async fn mail_failure_is_an_empty_inbox() {
        let dir = tempfile::tempdir().unwrap();
        scaffold_town(dir.path());

        let inbox = offline_store(dir.path()).mail("mayor").await.unwrap();
        assert!(inbox.is_empty());
    }
}
