//! GUI clients
//!
//! A client contributes a GUI document, the actions that document refers to,
//! optionally its own container builder, and child clients that are added and
//! removed together with it.

mod action;
mod state;

pub use action::{Action, ActionCollection, ActionSource};
pub use state::{parse_state_element, ReverseStateChange, StateChange};

use crate::builder::ContainerBuilder;
use crate::config::Vocabulary;
use crate::document::{
    apply_action_properties, find_action_properties, find_most_recent, DocumentMerger,
};
use crate::dom::{parse_document, DocumentError, Element};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A contributor to the merged GUI
pub struct GuiClient {
    component_name: String,
    vocabulary: Vocabulary,
    xml_file: Option<PathBuf>,
    local_xml_file: Option<PathBuf>,
    standards_file: Option<PathBuf>,
    document: Option<Element>,
    build_document: Option<Element>,
    actions: ActionCollection,
    children: Vec<GuiClient>,
    builder: Option<Box<dyn ContainerBuilder>>,
    states: HashMap<String, StateChange>,
    shortcut_schemes: HashMap<String, Element>,
}

impl fmt::Debug for GuiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuiClient")
            .field("component_name", &self.component_name)
            .field("client_name", &self.client_name())
            .field("xml_file", &self.xml_file)
            .field("actions", &self.actions.len())
            .field("children", &self.children)
            .field("has_builder", &self.builder.is_some())
            .finish()
    }
}

impl GuiClient {
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            vocabulary: Vocabulary::default(),
            xml_file: None,
            local_xml_file: None,
            standards_file: None,
            document: None,
            build_document: None,
            actions: ActionCollection::new(),
            children: Vec::new(),
            builder: None,
            states: HashMap::new(),
            shortcut_schemes: HashMap::new(),
        }
    }

    /// Use non-default tag and attribute names for this client's documents
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The `name` attribute of the document root, used as the merging key
    pub fn client_name(&self) -> &str {
        self.document
            .as_ref()
            .map(|doc| doc.attr_or_empty(&self.vocabulary.attr_name))
            .unwrap_or("")
    }

    pub fn dom_document(&self) -> Option<&Element> {
        self.document.as_ref()
    }

    /// Replace or merge the client document.
    ///
    /// With `merge`, `doc` is merged over the current document (which acts as
    /// the base), so a standards file loaded first keeps its layout.
    /// Any saved build document is dropped.
    pub fn set_dom_document(&mut self, doc: Element, merge: bool) {
        self.document = Some(match self.document.take() {
            Some(base) if merge => self.merger().merge_documents(base, doc),
            _ => doc,
        });
        self.build_document = None;
    }

    /// Parse and set the client document. An empty string with `merge`
    /// normalizes the current document against the client's actions.
    pub fn set_xml(&mut self, xml: &str, merge: bool) -> Result<(), DocumentError> {
        if xml.trim().is_empty() {
            if merge {
                if let Some(base) = self.document.take() {
                    self.document = Some(self.merger().normalize(base));
                }
            } else {
                self.document = None;
            }
            return Ok(());
        }

        let doc = parse_document(xml)?;
        self.set_dom_document(doc, merge);
        Ok(())
    }

    /// Load the client document from a file.
    ///
    /// If a local copy is configured, whichever of the two has the higher
    /// version wins. A configured standards file is loaded first and the
    /// client document merged over it.
    pub fn set_xml_file(&mut self, path: impl AsRef<Path>, merge: bool) -> Result<(), DocumentError> {
        let path = path.as_ref().to_path_buf();
        self.xml_file = Some(path.clone());

        let mut candidates = Vec::new();
        if let Some(local) = &self.local_xml_file {
            candidates.push(local.clone());
        }
        candidates.push(path.clone());

        let found = find_most_recent(&candidates, self.local_xml_file.as_deref(), &self.vocabulary)?;

        if let Some(standards) = self.standards_file.clone() {
            debug!("Loading standards document {}", standards.display());
            let contents = std::fs::read_to_string(&standards)?;
            let base = parse_document(&contents)?;
            self.document = Some(base);
        } else if !merge {
            self.document = None;
        }

        match found {
            Some(found) => {
                debug!("Using {} (version {})", found.path.display(), found.version);
                self.set_xml(&found.contents, true)
            }
            None => {
                warn!("Cannot find GUI document {}", path.display());
                self.set_xml("", true)
            }
        }
    }

    /// Reload from the configured files, discarding the current document
    pub fn reload_xml(&mut self) -> Result<(), DocumentError> {
        let Some(path) = self.xml_file.clone() else {
            return Ok(());
        };
        self.document = None;
        self.set_xml_file(path, true)
    }

    pub fn xml_file(&self) -> Option<&Path> {
        self.xml_file.as_deref()
    }

    pub fn set_local_xml_file(&mut self, path: impl Into<PathBuf>) {
        self.local_xml_file = Some(path.into());
    }

    pub fn local_xml_file(&self) -> Option<&Path> {
        self.local_xml_file.as_deref()
    }

    /// Base document that `set_xml_file` merges the client document over
    pub fn set_standards_file(&mut self, path: impl Into<PathBuf>) {
        self.standards_file = Some(path.into());
    }

    /// Working copy of the document owned by the factory while the client
    /// is plugged. Builders may have written state back into it.
    pub fn build_document(&self) -> Option<&Element> {
        self.build_document.as_ref()
    }

    pub fn set_build_document(&mut self, doc: Option<Element>) {
        self.build_document = doc;
    }

    pub(crate) fn build_document_mut(&mut self) -> &mut Option<Element> {
        &mut self.build_document
    }

    pub fn action_collection(&self) -> &ActionCollection {
        &self.actions
    }

    pub fn action_collection_mut(&mut self) -> &mut ActionCollection {
        &mut self.actions
    }

    /// Add an action to the client's collection
    pub fn add_action(&mut self, action: Action) {
        self.actions.add(action);
    }

    pub fn insert_child_client(&mut self, child: GuiClient) {
        self.children.push(child);
    }

    pub fn child_clients(&self) -> &[GuiClient] {
        &self.children
    }

    pub(crate) fn take_child_clients(&mut self) -> Vec<GuiClient> {
        std::mem::take(&mut self.children)
    }

    /// Give the client its own builder, consulted before the factory's
    pub fn set_client_builder(&mut self, builder: Box<dyn ContainerBuilder>) {
        self.builder = Some(builder);
    }

    pub fn has_client_builder(&self) -> bool {
        self.builder.is_some()
    }

    pub(crate) fn take_client_builder(&mut self) -> Option<Box<dyn ContainerBuilder>> {
        self.builder.take()
    }

    pub(crate) fn restore_client_builder(&mut self, builder: Box<dyn ContainerBuilder>) {
        self.builder = Some(builder);
    }

    pub fn add_state_action_enabled(&mut self, state: &str, action: &str) {
        self.states
            .entry(state.to_string())
            .or_default()
            .actions_to_enable
            .push(action.to_string());
    }

    pub fn add_state_action_disabled(&mut self, state: &str, action: &str) {
        self.states
            .entry(state.to_string())
            .or_default()
            .actions_to_disable
            .push(action.to_string());
    }

    pub fn state_change(&self, state: &str) -> Option<&StateChange> {
        self.states.get(state)
    }

    pub(crate) fn merge_state(&mut self, name: String, change: StateChange) {
        let entry = self.states.entry(name).or_default();
        entry.actions_to_enable.extend(change.actions_to_enable);
        entry.actions_to_disable.extend(change.actions_to_disable);
    }

    /// Enter (or with `StateReverse`, leave) a named state.
    /// Unknown states and unknown actions are ignored.
    pub fn state_changed(&mut self, state: &str, reverse: ReverseStateChange) {
        let Some(change) = self.states.get(state) else {
            debug!("{} has no state {}", self.component_name, state);
            return;
        };

        let enable = reverse == ReverseStateChange::StateNoReverse;
        for name in &change.actions_to_enable {
            if let Some(action) = self.actions.action_mut(name) {
                action.enabled = enable;
            }
        }
        for name in &change.actions_to_disable {
            if let Some(action) = self.actions.action_mut(name) {
                action.enabled = !enable;
            }
        }
    }

    /// Register the document holding the `ActionProperties` for a scheme
    pub fn add_shortcut_scheme(&mut self, scheme: impl Into<String>, doc: Element) {
        self.shortcut_schemes.insert(scheme.into(), doc);
    }

    /// Record every action's current shortcut as its default, once
    pub fn save_default_action_properties(&mut self) {
        for action in self.actions.actions_mut() {
            if action.defaults_saved {
                continue;
            }
            if action.shortcut.is_some() && action.default_shortcut.is_none() {
                warn!(
                    "Shortcut of {} has no default; it will be reset by scheme changes",
                    action.name
                );
                action.default_shortcut = action.shortcut.clone();
            }
            action.saved_default_shortcut = action.default_shortcut.clone();
            action.defaults_saved = true;
        }
    }

    /// Apply a shortcut scheme, then the document's own properties for it
    pub fn refresh_action_properties(&mut self, scheme: &str) {
        self.apply_shortcut_scheme(scheme);

        let doc = self.build_document.as_ref().or(self.document.as_ref());
        if let Some(block) = doc.and_then(|d| find_action_properties(d, scheme, &self.vocabulary)) {
            apply_action_properties(block, false, &self.vocabulary, &mut self.actions);
        }
    }

    fn apply_shortcut_scheme(&mut self, scheme: &str) {
        if scheme != self.vocabulary.default_scheme {
            debug!("Applying shortcut scheme {} to {}", scheme, self.component_name);
            for action in self.actions.actions_mut() {
                action.shortcut = None;
                action.default_shortcut = None;
            }

            let Some(scheme_doc) = self.shortcut_schemes.get(scheme) else {
                debug!("{} has no document for scheme {}", self.component_name, scheme);
                return;
            };
            let block = scheme_doc
                .children
                .iter()
                .find(|c| c.is(&self.vocabulary.tag_action_properties));
            if let Some(block) = block {
                apply_action_properties(block, true, &self.vocabulary, &mut self.actions);
            }
        } else {
            for action in self.actions.actions_mut().filter(|a| a.defaults_saved) {
                action.shortcut = action.saved_default_shortcut.clone();
                action.default_shortcut = action.saved_default_shortcut.clone();
            }
        }
    }

    fn merger(&self) -> DocumentMerger<'_> {
        DocumentMerger::new(&self.vocabulary, &self.actions)
    }
}

impl ActionSource for GuiClient {
    fn action(&self, name: &str) -> Option<&Action> {
        self.actions.action(name)
    }
}
