//! Daemon configuration.
//!
//! Values are layered: serde defaults, then an optional TOML/YAML/JSON file,
//! then `PMS_SYNC__`-prefixed environment variables using `__` as the section
//! separator (for example `PMS_SYNC__SYNC__BRANCH_POLICY=completion_gated`).

use crate::push_sync::{
    adapters::memory::{InMemoryProjectDirectory, InMemoryWorkItemStore},
    domain::{
        BranchPolicyKind, Project, ProjectId, PushSyncDomainError, StatusTable, WorkItem,
        WorkItemId, WorkItemStatus,
    },
    services::SyncSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PMS_SYNC";

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialised.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The synchronisation section is unusable.
    #[error("invalid synchronisation settings: {0}")]
    Sync(#[from] PushSyncDomainError),

    /// A seeded work item names a project that is not seeded.
    #[error("seeded work item {work_item} references unknown project {project}")]
    UnknownSeedProject {
        /// Work item identifier.
        work_item: u64,
        /// Missing project identifier.
        project: u64,
    },
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Synchronisation engine settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Records preloaded when state is kept in memory.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Persistence settings. Without a URL the daemon keeps state in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Synchronisation engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Which branch policy gates status changes.
    #[serde(default)]
    pub branch_policy: BranchPolicyKind,
    /// Append an activity entry for pushes without commits.
    #[serde(default)]
    pub log_empty_pushes: bool,
    /// Append an activity entry for pushes that reference no work item.
    #[serde(default = "default_true")]
    pub log_unmatched_pushes: bool,
    /// Replacement keyword table; the built-in table is used when absent.
    #[serde(default)]
    pub keywords: Option<BTreeMap<String, WorkItemStatus>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            branch_policy: BranchPolicyKind::default(),
            log_empty_pushes: false,
            log_unmatched_pushes: true,
            keywords: None,
        }
    }
}

impl SyncConfig {
    /// Builds the engine settings, compiling the commit grammar.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError`] when the keyword table is empty or
    /// invalid, or the grammar fails to compile.
    pub fn to_settings(&self) -> Result<SyncSettings, PushSyncDomainError> {
        let table = match &self.keywords {
            Some(keywords) => StatusTable::new(keywords.iter().map(|(k, v)| (k.as_str(), *v)))?,
            None => StatusTable::default(),
        };
        Ok(SyncSettings::new(table, self.branch_policy)?
            .with_empty_push_logging(self.log_empty_pushes)
            .with_unmatched_push_logging(self.log_unmatched_pushes))
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Records preloaded into the in-memory adapters.
///
/// Without a database the daemon knows only these projects and work items;
/// pushes for any other project are answered with `404`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Projects accepting pushes.
    #[serde(default)]
    pub projects: Vec<SeedProject>,
    /// Work items addressable from commit messages.
    #[serde(default)]
    pub work_items: Vec<SeedWorkItem>,
}

/// One seeded project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProject {
    /// Project identifier used in webhook URLs.
    pub id: u64,
    /// Display name.
    pub name: String,
}

/// One seeded work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedWorkItem {
    /// Identifier written in `TASK-<id>` references.
    pub id: u64,
    /// Owning project.
    pub project_id: u64,
    /// Work item title.
    pub title: String,
    /// Initial status.
    #[serde(default = "default_seed_status")]
    pub status: WorkItemStatus,
}

impl SeedConfig {
    /// Builds in-memory adapters holding the seeded records.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Sync`] for non-positive identifiers and
    /// [`ConfigError::UnknownSeedProject`] when a work item names a project
    /// missing from the seed.
    pub fn memory_adapters(
        &self,
    ) -> Result<(InMemoryProjectDirectory, InMemoryWorkItemStore), ConfigError> {
        let projects = self
            .projects
            .iter()
            .map(|seed| -> Result<Project, ConfigError> {
                Ok(Project::new(ProjectId::new(seed.id)?, seed.name.clone()))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let work_items = self
            .work_items
            .iter()
            .map(|seed| -> Result<WorkItem, ConfigError> {
                if !self
                    .projects
                    .iter()
                    .any(|project| project.id == seed.project_id)
                {
                    return Err(ConfigError::UnknownSeedProject {
                        work_item: seed.id,
                        project: seed.project_id,
                    });
                }
                Ok(WorkItem::new(
                    WorkItemId::new(seed.id)?,
                    ProjectId::new(seed.project_id)?,
                    seed.title.clone(),
                    seed.status,
                ))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok((
            InMemoryProjectDirectory::with_projects(projects),
            InMemoryWorkItemStore::with_items(work_items),
        ))
    }
}

const fn default_seed_status() -> WorkItemStatus {
    WorkItemStatus::Pending
}

const fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 8080)
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl AppConfig {
    /// Loads configuration from an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the file is missing or any source
    /// fails to deserialise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(file) = path {
            builder = builder.add_source(config::File::from(file).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
