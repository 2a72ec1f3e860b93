// Actions and action collections
//
// The merge engine never creates actions. It only looks them up by name in
// the collection a client supplies and hands them to the builder.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A user-triggerable command that can be plugged into containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique name within its collection, referenced by `<Action name=...>`
    pub name: String,

    /// Display text
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub icon: Option<String>,

    /// Active shortcut
    #[serde(default)]
    pub shortcut: Option<String>,

    /// Default shortcut, recorded the first time the action is seen by a factory
    #[serde(default)]
    pub default_shortcut: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Properties without a dedicated field, set through `ActionProperties`
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(skip)]
    pub(crate) defaults_saved: bool,

    /// Default shortcut as first recorded, restored by the default scheme
    #[serde(skip)]
    pub(crate) saved_default_shortcut: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            icon: None,
            shortcut: None,
            default_shortcut: None,
            enabled: true,
            properties: BTreeMap::new(),
            defaults_saved: false,
            saved_default_shortcut: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set both the active and the default shortcut
    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        let shortcut = shortcut.into();
        self.default_shortcut = Some(shortcut.clone());
        self.shortcut = Some(shortcut);
        self
    }

    /// Text to show for this action, falling back to its name
    pub fn label(&self) -> &str {
        if self.text.is_empty() {
            &self.name
        } else {
            &self.text
        }
    }
}

/// Lookup of actions by name
pub trait ActionSource {
    fn action(&self, name: &str) -> Option<&Action>;
}

/// Ordered, name-indexed set of actions owned by one client
#[derive(Debug, Clone, Default)]
pub struct ActionCollection {
    actions: Vec<Action>,
    by_name: HashMap<String, usize>,
}

impl ActionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action, replacing any action with the same name
    pub fn add(&mut self, action: Action) {
        match self.by_name.get(&action.name) {
            Some(&pos) => self.actions[pos] = action,
            None => {
                self.by_name.insert(action.name.clone(), self.actions.len());
                self.actions.push(action);
            }
        }
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        let pos = *self.by_name.get(name)?;
        self.actions.get_mut(pos)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn actions_mut(&mut self) -> impl Iterator<Item = &mut Action> {
        self.actions.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ActionSource for ActionCollection {
    fn action(&self, name: &str) -> Option<&Action> {
        self.by_name.get(name).and_then(|&pos| self.actions.get(pos))
    }
}

impl FromIterator<Action> for ActionCollection {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        let mut collection = ActionCollection::new();
        for action in iter {
            collection.add(action);
        }
        collection
    }
}
