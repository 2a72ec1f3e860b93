// Container tree
//
// Every built container is a node in a petgraph arena. Edges point from a
// parent to its children and are only used for upward traversal; the display
// order of children is the `children` list kept on each node.

use super::state::BuildState;
use super::ClientId;
use crate::builder::{ActionId, ElementId, WidgetId};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::BTreeMap;
use tracing::trace;

pub type NodeId = NodeIndex;

/// Which builder created a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderKind {
    Factory,
    Client(ClientId),
}

/// A named insertion point inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergingIndex {
    pub value: usize,
    pub merging_name: String,
    /// Document name of the client that defined it
    pub client_name: String,
}

/// One client's contribution to one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerClient {
    pub client: ClientId,
    pub group_name: String,
    pub merging_name: String,
    pub actions: Vec<ActionId>,
    pub custom_elements: Vec<ElementId>,
    pub action_lists: BTreeMap<String, Vec<ActionId>>,
}

impl ContainerClient {
    fn new(client: ClientId, group_name: &str, merging_name: String) -> Self {
        Self {
            client,
            group_name: group_name.to_string(),
            merging_name,
            actions: Vec::new(),
            custom_elements: Vec::new(),
            action_lists: BTreeMap::new(),
        }
    }

    /// Items this record has put into the container outside of action lists
    pub fn item_count(&self) -> usize {
        self.actions.len() + self.custom_elements.len()
    }
}

#[derive(Debug, Clone)]
pub struct ContainerNode {
    pub children: Vec<NodeId>,
    /// Client that created the container, None once that client is gone
    pub client: Option<ClientId>,
    pub builder: BuilderKind,
    pub builder_container_tags: Vec<String>,
    pub builder_custom_tags: Vec<String>,
    pub container: Option<WidgetId>,
    /// Lowercase tag of the element the container was built from
    pub tag_name: String,
    pub name: String,
    pub group_name: String,
    /// Merging index of the parent this container was inserted through
    pub merging_name: String,
    pub clients: Vec<ContainerClient>,
    pub merging_indices: Vec<MergingIndex>,
    /// Append position: number of items plugged outside any merging index
    pub index: usize,
}

impl ContainerNode {
    fn root() -> Self {
        Self {
            children: Vec::new(),
            client: None,
            builder: BuilderKind::Factory,
            builder_container_tags: Vec::new(),
            builder_custom_tags: Vec::new(),
            container: None,
            tag_name: String::new(),
            name: String::new(),
            group_name: String::new(),
            merging_name: String::new(),
            clients: Vec::new(),
            merging_indices: Vec::new(),
            index: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        container: WidgetId,
        tag_name: String,
        name: String,
        client: ClientId,
        builder: BuilderKind,
        builder_tags: (Vec<String>, Vec<String>),
        merging_name: String,
        group_name: String,
    ) -> Self {
        let (builder_container_tags, builder_custom_tags) = builder_tags;
        Self {
            children: Vec::new(),
            client: Some(client),
            builder,
            builder_container_tags,
            builder_custom_tags,
            container: Some(container),
            tag_name,
            name,
            group_name,
            merging_name,
            clients: Vec::new(),
            merging_indices: Vec::new(),
            index: 0,
        }
    }

    /// Position of a merging index by name
    pub fn find_index(&self, merging_name: &str) -> Option<usize> {
        self.merging_indices
            .iter()
            .position(|m| m.merging_name == merging_name)
    }

    pub fn merging_index(&self, merging_name: &str) -> Option<&MergingIndex> {
        self.merging_indices
            .iter()
            .find(|m| m.merging_name == merging_name)
    }

    /// Shift every merging index from `from` on, and the append position.
    /// `None` shifts only the append position.
    pub fn adjust_merging_indices(&mut self, offset: isize, from: Option<usize>) {
        if let Some(from) = from {
            for m in self.merging_indices.iter_mut().skip(from) {
                m.value = m.value.saturating_add_signed(offset);
            }
        }
        self.index = self.index.saturating_add_signed(offset);
    }

    /// Resolve where an item for `merging_name` goes (the client's own merge
    /// point when empty). Returns the position and the merging index it was
    /// resolved through, if any.
    pub fn calc_merging_index(
        &self,
        merging_name: &str,
        state: &BuildState,
        ignore_default: bool,
    ) -> (usize, Option<usize>) {
        let lookup = if merging_name.is_empty() {
            state.client_name.as_str()
        } else {
            merging_name
        };
        let found = self.find_index(lookup);
        let default = state
            .current_default
            .as_deref()
            .and_then(|name| self.find_index(name));

        if ignore_default || (found.is_none() && default.is_none()) {
            return (self.index, None);
        }

        match found.or(default) {
            Some(pos) => (self.merging_indices[pos].value, Some(pos)),
            None => (self.index, None),
        }
    }

    /// Find or create the record for (client, group). With an empty group
    /// any record of the client matches.
    pub fn find_child_container_client(
        &mut self,
        client: ClientId,
        group_name: &str,
        merging_pos: Option<usize>,
    ) -> usize {
        let existing = self.clients.iter().position(|cc| {
            cc.client == client && (group_name.is_empty() || cc.group_name == group_name)
        });
        if let Some(pos) = existing {
            return pos;
        }

        let merging_name = merging_pos
            .and_then(|pos| self.merging_indices.get(pos))
            .map(|m| m.merging_name.clone())
            .unwrap_or_default();
        trace!(
            "New container client for {:?} in <{}> {} at {:?}",
            client,
            self.tag_name,
            self.name,
            merging_name
        );
        self.clients
            .push(ContainerClient::new(client, group_name, merging_name));
        self.clients.len() - 1
    }
}

/// Arena of container nodes rooted at an invisible top-level node
#[derive(Debug, Clone)]
pub struct ContainerTree {
    graph: StableDiGraph<ContainerNode, ()>,
    root: NodeId,
}

impl Default for ContainerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerTree {
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(ContainerNode::root());
        Self { graph, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&ContainerNode> {
        self.graph.node_weight(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut ContainerNode> {
        self.graph.node_weight_mut(id)
    }

    /// Number of nodes, the root included
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .next()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, node: ContainerNode) -> NodeId {
        let id = self.graph.add_node(node);
        self.graph.add_edge(parent, id, ());
        if let Some(parent) = self.graph.node_weight_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Detach `child` from `parent`, closing the gap it left in the parent's
    /// merging indices, and drop its subtree
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let merging_name = match self.node(child) {
            Some(node) => node.merging_name.clone(),
            None => return,
        };
        if let Some(parent) = self.node_mut(parent) {
            let from = parent.find_index(&merging_name);
            parent.adjust_merging_indices(-1, from);
            parent.children.retain(|c| *c != child);
        }
        self.drop_subtree(child);
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.graph.remove_node(id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Sibling-only lookup of a reusable child container. A name must match
    /// together with the tag; without a name the first child with the tag
    /// matches. Containers in `exclude` were built earlier in the same pass.
    pub fn find_child_container(
        &self,
        parent: NodeId,
        name: &str,
        tag_name: &str,
        exclude: &[WidgetId],
    ) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|id| {
            let Some(node) = self.node(*id) else {
                return false;
            };
            if node.container.is_some_and(|c| exclude.contains(&c)) {
                return false;
            }
            if name.is_empty() {
                !tag_name.is_empty() && node.tag_name == tag_name
            } else {
                node.name == name && node.tag_name == tag_name
            }
        })
    }

    /// Depth-first search by name (or tag), optionally restricted to
    /// containers created by `client`
    pub fn find_container(
        &self,
        start: NodeId,
        name: &str,
        client: Option<ClientId>,
        by_tag: bool,
    ) -> Option<NodeId> {
        let node = self.node(start)?;
        let matches = if by_tag {
            node.tag_name.eq_ignore_ascii_case(name)
        } else {
            node.name == name
        };
        if matches && (client.is_none() || node.client == client) {
            return Some(start);
        }
        node.children
            .iter()
            .find_map(|child| self.find_container(*child, name, client, by_tag))
    }

    /// Every node with the given tag, depth-first
    pub fn find_all(&self, tag_name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect(self.root, tag_name, &mut found);
        found
    }

    fn collect(&self, id: NodeId, tag_name: &str, found: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.tag_name.eq_ignore_ascii_case(tag_name) {
            found.push(id);
        }
        for child in &node.children {
            self.collect(*child, tag_name, found);
        }
    }

    /// Whether any container still depends on a builder
    pub fn uses_builder(&self, kind: BuilderKind) -> bool {
        self.graph
            .node_indices()
            .filter(|id| *id != self.root)
            .any(|id| self.graph[id].builder == kind)
    }

    /// Forget every node but the root, leaving built widgets alone
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Indented dump for debugging and tests
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        out.push_str(&format!(
            "{}<{}> {} index={} clients={}\n",
            indent,
            node.tag_name,
            node.name,
            node.index,
            node.clients.len()
        ));
        for m in &node.merging_indices {
            out.push_str(&format!(
                "{}  @{}={} ({})\n",
                indent, m.merging_name, m.value, m.client_name
            ));
        }
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }
}
