//! The GUI merge engine
//!
//! A [`Factory`] owns the clients added to it and merges their documents into
//! one tree of containers. Later clients are interleaved with earlier ones
//! through named merge points (`<Merge>`, `<DefineGroup>`, `<ActionList>`),
//! and removing a client takes out exactly what it contributed.

mod action_list;
mod build;
mod node;
mod observer;
mod state;
mod teardown;

pub use node::{BuilderKind, ContainerClient, ContainerNode, ContainerTree, MergingIndex, NodeId};
pub use observer::{FactoryObserver, LoggingObserver};
pub use state::{BuildState, BuildStateStack};

use crate::builder::{ContainerBuilder, WidgetId};
use crate::client::{Action, GuiClient, ReverseStateChange};
use crate::config::Vocabulary;
use action_list::ListContext;
use build::{BuildContext, BuildHelper, Builders};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use teardown::TeardownContext;
use tracing::{debug, info, warn};

/// Handle of a client owned by a factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An action a client document referenced but the client did not provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingAction {
    pub client: ClientId,
    pub client_name: String,
    pub action: String,
}

struct RegisteredClient {
    client: GuiClient,
    parent: Option<ClientId>,
    children: Vec<ClientId>,
}

pub struct Factory<B: ContainerBuilder> {
    builder: B,
    vocabulary: Vocabulary,
    tree: ContainerTree,
    clients: BTreeMap<ClientId, RegisteredClient>,
    client_builders: HashMap<ClientId, Box<dyn ContainerBuilder>>,
    states: BuildStateStack,
    observers: Vec<Box<dyn FactoryObserver>>,
    shortcut_scheme: String,
    strict_actions: bool,
    missing_actions: Vec<MissingAction>,
    next_client: u64,
    change_depth: usize,
}

impl<B: ContainerBuilder> Factory<B> {
    pub fn new(builder: B, vocabulary: Vocabulary) -> Self {
        let shortcut_scheme = vocabulary.default_scheme.clone();
        Self {
            builder,
            vocabulary,
            tree: ContainerTree::new(),
            clients: BTreeMap::new(),
            client_builders: HashMap::new(),
            states: BuildStateStack::default(),
            observers: Vec::new(),
            shortcut_scheme,
            strict_actions: false,
            missing_actions: Vec::new(),
            next_client: 0,
            change_depth: 0,
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Read-only view of the container tree
    pub fn tree(&self) -> &ContainerTree {
        &self.tree
    }

    pub fn add_observer(&mut self, observer: Box<dyn FactoryObserver>) {
        self.observers.push(observer);
    }

    /// Log missing actions as warnings and keep them for [`Factory::missing_actions`]
    pub fn set_strict_actions(&mut self, strict: bool) {
        self.strict_actions = strict;
    }

    /// Actions referenced by added documents that their clients did not provide
    pub fn missing_actions(&self) -> &[MissingAction] {
        &self.missing_actions
    }

    pub fn client(&self, id: ClientId) -> Option<&GuiClient> {
        self.clients.get(&id).map(|r| &r.client)
    }

    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut GuiClient> {
        self.clients.get_mut(&id).map(|r| &mut r.client)
    }

    /// Added clients in the order they were added
    pub fn clients(&self) -> impl Iterator<Item = (ClientId, &GuiClient)> {
        self.clients.iter().map(|(id, r)| (*id, &r.client))
    }

    pub fn child_clients(&self, id: ClientId) -> &[ClientId] {
        self.clients
            .get(&id)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    /// Find a client by its component name
    pub fn find_client(&self, component_name: &str) -> Option<ClientId> {
        self.clients
            .iter()
            .find(|(_, r)| r.client.component_name() == component_name)
            .map(|(id, _)| *id)
    }

    fn begin_changes(&mut self) {
        self.change_depth += 1;
        if self.change_depth == 1 {
            for observer in &mut self.observers {
                observer.making_changes(true);
            }
        }
    }

    fn end_changes(&mut self) {
        self.change_depth = self.change_depth.saturating_sub(1);
        if self.change_depth == 0 {
            for observer in &mut self.observers {
                observer.making_changes(false);
            }
        }
    }

    /// Merge a client (and its child clients) into the GUI
    pub fn add_client(&mut self, client: GuiClient) -> ClientId {
        self.add_client_under(client, None)
    }

    fn add_client_under(&mut self, mut client: GuiClient, parent: Option<ClientId>) -> ClientId {
        self.begin_changes();

        self.next_client += 1;
        let id = ClientId(self.next_client);
        let children = client.take_child_clients();

        let mut state = BuildState::new(id, client.client_name().to_string());
        state.strict_actions = self.strict_actions;
        state.builder_container_tags = self.builder.container_tags();
        state.builder_custom_tags = self.builder.custom_tags();
        if let Some(builder) = client.take_client_builder() {
            state.client_builder = Some(BuilderKind::Client(id));
            state.client_builder_container_tags = builder.container_tags();
            state.client_builder_custom_tags = builder.custom_tags();
            self.client_builders.insert(id, builder);
        }
        self.states.push(state);

        client.save_default_action_properties();
        client.refresh_action_properties(&self.shortcut_scheme);

        debug!("Building client {} ({})", client.component_name(), id);
        if let Some(state) = self.states.current_mut() {
            let doc = client.build_document().or(client.dom_document());
            if let Some(root) = doc {
                let mut ctx = BuildContext {
                    tree: &mut self.tree,
                    builders: Builders {
                        factory: &mut self.builder,
                        clients: &mut self.client_builders,
                    },
                    vocab: &self.vocabulary,
                    actions: &client,
                    state: &mut *state,
                };
                let root_node = ctx.tree.root();
                BuildHelper::new(&mut ctx, root_node).build(root);
            } else {
                warn!("Client {} has no GUI document", client.component_name());
            }
            for (name, change) in std::mem::take(&mut state.states) {
                client.merge_state(name, change);
            }
            for action in std::mem::take(&mut state.missing_actions) {
                if self.strict_actions {
                    self.missing_actions.push(MissingAction {
                        client: id,
                        client_name: state.client_name.clone(),
                        action,
                    });
                }
            }
        }
        self.builder.finalize_gui();

        if let Some(parent) = parent.and_then(|p| self.clients.get_mut(&p)) {
            parent.children.push(id);
        }
        self.clients.insert(
            id,
            RegisteredClient {
                client,
                parent,
                children: Vec::new(),
            },
        );
        if let Some(registered) = self.clients.get(&id) {
            let client = &registered.client;
            for observer in &mut self.observers {
                observer.client_added(id, client);
            }
        }

        for child in children {
            self.add_client_under(child, Some(id));
        }

        self.states.pop();
        self.end_changes();
        id
    }

    /// Take a client (and its child clients) out of the GUI and hand it back.
    ///
    /// The returned client keeps the build document its containers wrote
    /// their state into, so adding it again restores that state.
    pub fn remove_client(&mut self, id: ClientId) -> Option<GuiClient> {
        if !self.clients.contains_key(&id) {
            warn!("Client {} is not part of this factory", id);
            return None;
        }

        self.begin_changes();
        let child_ids = self.child_clients(id).to_vec();
        let removed_children: Vec<GuiClient> = child_ids
            .into_iter()
            .filter_map(|child| self.remove_client(child))
            .collect();

        let Some(mut registered) = self.clients.remove(&id) else {
            self.end_changes();
            return None;
        };
        let client = &mut registered.client;
        debug!("Removing client {} ({})", client.component_name(), id);

        let mut state = BuildState::new(id, client.client_name().to_string());
        state.client_builder = self
            .client_builders
            .contains_key(&id)
            .then_some(BuilderKind::Client(id));
        self.states.push(state);

        if client.build_document().is_none() {
            let doc = client.dom_document().cloned();
            client.set_build_document(doc);
        }

        if let Some(state) = self.states.current_mut() {
            let mut ctx = TeardownContext {
                tree: &mut self.tree,
                builders: Builders {
                    factory: &mut self.builder,
                    clients: &mut self.client_builders,
                },
                vocab: &self.vocabulary,
                state,
            };
            let root = ctx.tree.root();
            teardown::destruct(&mut ctx, root, client.build_document_mut().as_mut());
        }
        self.states.pop();

        self.release_client_builder(id, client);
        self.missing_actions.retain(|m| m.client != id);
        if let Some(parent) = registered.parent.and_then(|p| self.clients.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in removed_children {
            registered.client.insert_child_client(child);
        }

        let client = registered.client;
        for observer in &mut self.observers {
            observer.client_removed(id, &client);
        }
        self.end_changes();
        Some(client)
    }

    /// Give a client its builder back unless containers still depend on it
    fn release_client_builder(&mut self, id: ClientId, client: &mut GuiClient) {
        let kind = BuilderKind::Client(id);
        if self.tree.uses_builder(kind) {
            debug!("Keeping builder of {} for containers it created", id);
        } else if let Some(builder) = self.client_builders.remove(&id) {
            client.restore_client_builder(builder);
        }

        let tree = &self.tree;
        let clients = &self.clients;
        self.client_builders.retain(|owner, _| {
            clients.contains_key(owner) || tree.uses_builder(BuilderKind::Client(*owner))
        });
    }

    /// Widget of the first container named `name` (or with tag `name` when
    /// `by_tag`), optionally only among those created by `client`
    pub fn container(&self, name: &str, client: Option<ClientId>, by_tag: bool) -> Option<WidgetId> {
        self.tree
            .find_container(self.tree.root(), name, client, by_tag)
            .and_then(|id| self.tree.node(id))
            .and_then(|node| node.container)
    }

    /// Widgets of every container built from `tag`
    pub fn containers(&self, tag: &str) -> Vec<WidgetId> {
        self.tree
            .find_all(tag)
            .into_iter()
            .filter_map(|id| self.tree.node(id).and_then(|n| n.container))
            .collect()
    }

    /// Plug `actions` at every `<ActionList name=...>` of the client.
    /// A list that is already plugged is replaced.
    pub fn plug_action_list(&mut self, client: ClientId, name: &str, actions: &[Action]) -> usize {
        self.unplug_action_list(client, name);

        let Some(mut state) = self.list_state(client, name) else {
            return 0;
        };
        state.action_list = actions.iter().map(|a| a.name.clone()).collect();
        self.states.push(state);

        let mut plugged = 0;
        if let Some(state) = self.states.current_mut() {
            let mut ctx = ListContext {
                tree: &mut self.tree,
                builders: Builders {
                    factory: &mut self.builder,
                    clients: &mut self.client_builders,
                },
                vocab: &self.vocabulary,
                state,
            };
            let root = ctx.tree.root();
            plugged = action_list::plug_action_list(&mut ctx, root, actions);
        }
        self.states.pop();

        if plugged == 0 {
            debug!("No <ActionList name=\"{}\"> for client {}", name, client);
        }
        plugged
    }

    /// Remove a plugged action list, restoring the positions around it
    pub fn unplug_action_list(&mut self, client: ClientId, name: &str) -> usize {
        let Some(state) = self.list_state(client, name) else {
            return 0;
        };
        self.states.push(state);

        let mut unplugged = 0;
        if let Some(state) = self.states.current_mut() {
            let mut ctx = ListContext {
                tree: &mut self.tree,
                builders: Builders {
                    factory: &mut self.builder,
                    clients: &mut self.client_builders,
                },
                vocab: &self.vocabulary,
                state,
            };
            let root = ctx.tree.root();
            unplugged = action_list::unplug_action_list(&mut ctx, root);
        }
        self.states.pop();
        unplugged
    }

    fn list_state(&self, client: ClientId, name: &str) -> Option<BuildState> {
        let Some(registered) = self.clients.get(&client) else {
            warn!("Client {} is not part of this factory", client);
            return None;
        };
        let mut state = BuildState::new(client, registered.client.client_name().to_string());
        state.action_list_name = name.to_string();
        Some(state)
    }

    /// Enter or leave a named state of one client
    pub fn state_changed(&mut self, client: ClientId, state: &str, reverse: ReverseStateChange) {
        match self.client_mut(client) {
            Some(client) => client.state_changed(state, reverse),
            None => warn!("Client {} is not part of this factory", client),
        }
    }

    pub fn shortcut_scheme(&self) -> &str {
        &self.shortcut_scheme
    }

    /// Switch every client to another shortcut scheme
    pub fn change_shortcut_scheme(&mut self, scheme: &str) {
        info!("Switching to shortcut scheme {}", scheme);
        self.shortcut_scheme = scheme.to_string();
        self.refresh_action_properties();
    }

    /// Re-apply the active scheme and document properties to every client
    pub fn refresh_action_properties(&mut self) {
        let scheme = self.shortcut_scheme.clone();
        for registered in self.clients.values_mut() {
            registered.client.refresh_action_properties(&scheme);
        }
    }

    /// Forget all clients and containers without touching built widgets.
    /// Returns the top-level clients with their children reattached.
    pub fn reset(&mut self) -> Vec<GuiClient> {
        self.tree.clear();
        self.missing_actions.clear();

        let mut registered = std::mem::take(&mut self.clients);
        let mut builders = std::mem::take(&mut self.client_builders);
        let top_level: Vec<ClientId> = registered
            .iter()
            .filter(|(_, r)| r.parent.is_none())
            .map(|(id, _)| *id)
            .collect();

        top_level
            .into_iter()
            .filter_map(|id| reassemble(id, &mut registered, &mut builders))
            .collect()
    }

    /// Drop the node of a container from the tree, leaving its widget alone
    pub fn reset_container(&mut self, name: &str, by_tag: bool) {
        if name.is_empty() {
            return;
        }
        let Some(node) = self.tree.find_container(self.tree.root(), name, None, by_tag) else {
            return;
        };
        if let Some(parent) = self.tree.parent(node) {
            self.tree.remove_child(parent, node);
        }
    }
}

fn reassemble(
    id: ClientId,
    registered: &mut BTreeMap<ClientId, RegisteredClient>,
    builders: &mut HashMap<ClientId, Box<dyn ContainerBuilder>>,
) -> Option<GuiClient> {
    let RegisteredClient {
        mut client,
        children,
        ..
    } = registered.remove(&id)?;
    if let Some(builder) = builders.remove(&id) {
        client.restore_client_builder(builder);
    }
    for child in children {
        if let Some(child) = reassemble(child, registered, builders) {
            client.insert_child_client(child);
        }
    }
    Some(client)
}

impl<B: ContainerBuilder + fmt::Debug> fmt::Debug for Factory<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("builder", &self.builder)
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .field("nodes", &self.tree.node_count())
            .finish()
    }
}
