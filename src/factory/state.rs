// Per-operation build state
//
// Each add, remove or action-list operation pushes one BuildState. Merge
// points are tracked by merging name and looked up again on every use, so
// structural changes to a node's merging indices never leave stale handles.

use super::node::BuilderKind;
use super::ClientId;
use crate::client::StateChange;

#[derive(Debug, Clone)]
pub struct BuildState {
    pub client: ClientId,
    /// Root `name` attribute of the client's document
    pub client_name: String,

    /// Builder of the client, if it brought one
    pub client_builder: Option<BuilderKind>,
    pub builder_container_tags: Vec<String>,
    pub builder_custom_tags: Vec<String>,
    pub client_builder_container_tags: Vec<String>,
    pub client_builder_custom_tags: Vec<String>,

    /// `<default>` merging name when the current node defines one
    pub current_default: Option<String>,
    /// Merging index the current client's plain items flow through
    pub current_client: Option<String>,

    /// Action list being plugged or unplugged
    pub action_list_name: String,
    pub action_list: Vec<String>,

    /// `<State>` definitions met while building
    pub states: Vec<(String, StateChange)>,
    /// Actions referenced by the document but missing from the client
    pub missing_actions: Vec<String>,
    pub strict_actions: bool,
}

impl BuildState {
    pub fn new(client: ClientId, client_name: String) -> Self {
        Self {
            client,
            client_name,
            client_builder: None,
            builder_container_tags: Vec::new(),
            builder_custom_tags: Vec::new(),
            client_builder_container_tags: Vec::new(),
            client_builder_custom_tags: Vec::new(),
            current_default: None,
            current_client: None,
            action_list_name: String::new(),
            action_list: Vec::new(),
            states: Vec::new(),
            missing_actions: Vec::new(),
            strict_actions: false,
        }
    }
}

/// Stack of in-flight operations owned by the factory
#[derive(Debug, Default)]
pub struct BuildStateStack {
    states: Vec<BuildState>,
}

impl BuildStateStack {
    pub fn push(&mut self, state: BuildState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Option<BuildState> {
        self.states.pop()
    }

    pub fn current_mut(&mut self) -> Option<&mut BuildState> {
        self.states.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }
}
