// Manifest loader for the xmlgui CLI
//
// A manifest lists the clients to compose, in the order they are added.

use super::Vocabulary;
use crate::client::Action;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for one composition run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tag and attribute names, overridable for non-standard documents
    pub vocabulary: Vocabulary,

    /// Active shortcut scheme
    pub shortcut_scheme: String,

    /// Log every action that a document references but no client provides
    pub strict_actions: bool,

    /// Clients in the order they are added to the factory
    pub clients: Vec<ClientConfig>,
}

/// One client: a GUI document plus the actions backing it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Label used for `--remove` and `parent`
    pub id: String,

    /// The client's GUI document
    pub file: PathBuf,

    /// Base document the client document is merged over (e.g. ui_standards.rc)
    pub standards: Option<PathBuf>,

    /// User-modified copy of `file`, preferred when its version is not older
    pub local_file: Option<PathBuf>,

    /// Nest this client under another one
    pub parent: Option<String>,

    /// Actions available to the document
    pub actions: Vec<ActionConfig>,

    /// Action lists to plug after the client has been added
    pub action_lists: BTreeMap<String, Vec<ActionConfig>>,

    /// States to activate after the client has been added
    pub states: Vec<String>,

    /// Shortcut scheme documents by scheme name
    pub shortcut_schemes: BTreeMap<String, PathBuf>,
}

/// An action given either by name or in full
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionConfig {
    Name(String),
    Full(Action),
}

impl ActionConfig {
    pub fn to_action(&self) -> Action {
        match self {
            ActionConfig::Name(name) => Action::new(name.as_str()),
            ActionConfig::Full(action) => {
                let mut action = action.clone();
                if action.default_shortcut.is_none() {
                    action.default_shortcut = action.shortcut.clone();
                }
                action
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            shortcut_scheme: "Default".to_string(),
            strict_actions: false,
            clients: vec![],
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            "xmlgui.yml",
            "xmlgui.yaml",
            "xmlgui.toml",
            ".xmlgui.yml",
            ".xmlgui.yaml",
            ".xmlgui.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Make every client path absolute relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        for client in &mut self.clients {
            resolve(&mut client.file);
            if let Some(standards) = client.standards.as_mut() {
                resolve(standards);
            }
            if let Some(local) = client.local_file.as_mut() {
                resolve(local);
            }
            for scheme in client.shortcut_schemes.values_mut() {
                resolve(scheme);
            }
        }
    }

    /// Find a client by its id
    pub fn client(&self, id: &str) -> Option<&ClientConfig> {
        self.clients.iter().find(|c| c.id == id)
    }
}
