// Build engine
//
// Walks one client document level by level. Each level runs against one
// container node: actions and custom elements are plugged at the position the
// node's merging indices resolve to, containers are reused or created and
// recursed into, and merge points are registered as they are met.

use super::node::{BuilderKind, ContainerNode, MergingIndex, NodeId};
use super::state::BuildState;
use super::{ClientId, ContainerTree};
use crate::builder::{ContainerBuilder, WidgetId};
use crate::client::{parse_state_element, ActionSource};
use crate::config::Vocabulary;
use crate::dom::Element;
use std::collections::HashMap;
use tracing::{debug, error, trace, warn};

/// The factory builder plus the builders clients brought along
pub(crate) struct Builders<'a> {
    pub factory: &'a mut dyn ContainerBuilder,
    pub clients: &'a mut HashMap<ClientId, Box<dyn ContainerBuilder>>,
}

impl<'a> Builders<'a> {
    pub fn get(&mut self, kind: BuilderKind) -> Option<&mut (dyn ContainerBuilder + 'a)> {
        match kind {
            BuilderKind::Factory => Some(&mut *self.factory),
            BuilderKind::Client(id) => {
                let builder: &mut (dyn ContainerBuilder + 'a) = self.clients.get_mut(&id)?.as_mut();
                Some(builder)
            }
        }
    }
}

/// Everything one build or teardown pass works on
pub(crate) struct BuildContext<'a> {
    pub tree: &'a mut ContainerTree,
    pub builders: Builders<'a>,
    pub vocab: &'a Vocabulary,
    pub actions: &'a dyn ActionSource,
    pub state: &'a mut BuildState,
}

/// Builds the children of one element into one container node
pub(crate) struct BuildHelper<'c, 'a> {
    ctx: &'c mut BuildContext<'a>,
    parent: NodeId,
    container_tags: Vec<String>,
    custom_tags: Vec<String>,
    /// Containers created during this pass, never reused by later siblings
    container_list: Vec<WidgetId>,
    ignore_default: bool,
}

impl<'c, 'a> BuildHelper<'c, 'a> {
    pub fn new(ctx: &'c mut BuildContext<'a>, parent: NodeId) -> Self {
        let state = &*ctx.state;
        let mut custom_tags = state.builder_custom_tags.clone();
        let mut container_tags = state.builder_container_tags.clone();

        if let Some(node) = ctx.tree.node(parent) {
            if node.builder != BuilderKind::Factory {
                custom_tags.extend(node.builder_custom_tags.iter().cloned());
                container_tags.extend(node.builder_container_tags.iter().cloned());
            }
        }

        if state.client_builder.is_some() {
            custom_tags = state
                .client_builder_custom_tags
                .iter()
                .cloned()
                .chain(custom_tags)
                .collect();
            container_tags = state
                .client_builder_container_tags
                .iter()
                .cloned()
                .chain(container_tags)
                .collect();
        }

        let mut helper = Self {
            ctx,
            parent,
            container_tags,
            custom_tags,
            container_list: Vec::new(),
            ignore_default: false,
        };
        helper.refresh_running_indices();
        helper
    }

    pub fn build(mut self, element: &Element) {
        let vocab = self.ctx.vocab;

        for child in &element.children {
            let tag = child.tag_lower();
            let name = child.attr_or_empty(&vocab.attr_name);

            if child.is(&vocab.tag_action) {
                self.process_action_or_custom(child, true);
            } else if self.custom_tags.contains(&tag) {
                self.process_action_or_custom(child, false);
            } else if self.container_tags.contains(&tag) {
                self.process_container(child, &tag, name);
            } else if child.is(&vocab.tag_merge)
                || child.is(&vocab.tag_define_group)
                || child.is(&vocab.tag_action_list)
            {
                self.process_merge(child, name);
            } else if child.is(&vocab.tag_state) {
                self.process_state(child);
            } else {
                trace!("Ignoring <{}>", child.tag);
            }
        }
    }

    /// Re-resolve the `<default>` and client merge points of the parent node
    fn refresh_running_indices(&mut self) {
        let vocab = self.ctx.vocab;
        let default_name = &vocab.default_merging_name;
        let Some(node) = self.ctx.tree.node(self.parent) else {
            return;
        };

        self.ctx.state.current_default = node
            .find_index(default_name)
            .map(|_| default_name.clone());
        let (_, pos) = node.calc_merging_index("", self.ctx.state, self.ignore_default);
        self.ctx.state.current_client = pos.map(|p| node.merging_indices[p].merging_name.clone());
    }

    /// Position for a new item and the merging index it goes through
    fn resolve_position(&self, node: &ContainerNode, group: &str) -> (usize, Option<usize>) {
        if !group.is_empty() {
            return node.calc_merging_index(group, self.ctx.state, self.ignore_default);
        }

        let current = self
            .ctx
            .state
            .current_client
            .as_deref()
            .and_then(|name| node.find_index(name));
        match current {
            Some(pos) => (node.merging_indices[pos].value, Some(pos)),
            None => (node.index, None),
        }
    }

    fn process_action_or_custom(&mut self, element: &Element, is_action: bool) {
        let vocab = self.ctx.vocab;
        let client = self.ctx.state.client;

        let Some(node) = self.ctx.tree.node(self.parent) else {
            return;
        };
        let Some(container) = node.container else {
            return;
        };
        let group = vocab.group_merging_name(element.attr_or_empty(&vocab.attr_group));
        let (index, merging_pos) = self.resolve_position(node, &group);

        let Some(node) = self.ctx.tree.node_mut(self.parent) else {
            return;
        };
        let record = node.find_child_container_client(client, &group, merging_pos);
        let Some(builder) = self.ctx.builders.get(node.builder) else {
            warn!("Builder of <{}> {} is gone", node.tag_name, node.name);
            return;
        };

        if is_action {
            let name = element.attr_or_empty(&vocab.attr_name);
            let Some(action) = self.ctx.actions.action(name) else {
                if self.ctx.state.strict_actions {
                    warn!("Action {} not found in client {}", name, self.ctx.state.client_name);
                } else {
                    trace!("Action {} not found, skipping", name);
                }
                self.ctx.state.missing_actions.push(name.to_string());
                return;
            };

            let Some(id) = builder.insert_action(container, index, action) else {
                return;
            };
            node.clients[record].actions.push(id);
        } else {
            let Some(id) = builder.create_custom_element(container, index, element) else {
                return;
            };
            node.clients[record].custom_elements.push(id);
        }

        node.adjust_merging_indices(1, merging_pos);
    }

    fn process_container(&mut self, element: &Element, tag: &str, name: &str) {
        let found = self
            .ctx
            .tree
            .find_child_container(self.parent, name, tag, &self.container_list);

        let child = match found {
            Some(child) => child,
            None => match self.create_node(element, tag, name) {
                Some(child) => child,
                None => return,
            },
        };

        BuildHelper::new(&mut *self.ctx, child).build(element);
        self.refresh_running_indices();
    }

    fn create_node(&mut self, element: &Element, tag: &str, name: &str) -> Option<NodeId> {
        let vocab = self.ctx.vocab;
        let node = self.ctx.tree.node(self.parent)?;
        let group = vocab.group_merging_name(element.attr_or_empty(&vocab.attr_group));
        let (index, merging_pos) = self.resolve_position(node, &group);
        let parent_container = node.container;

        let (container, kind) = self.create_container(parent_container, index, element)?;

        let node = self.ctx.tree.node_mut(self.parent)?;
        node.adjust_merging_indices(1, merging_pos);
        let merging_name = merging_pos
            .and_then(|pos| node.merging_indices.get(pos))
            .map(|m| m.merging_name.clone())
            .unwrap_or_default();
        self.container_list.push(container);

        let state = &*self.ctx.state;
        let tags = match kind {
            BuilderKind::Factory => (
                state.builder_container_tags.clone(),
                state.builder_custom_tags.clone(),
            ),
            BuilderKind::Client(_) => (
                state.client_builder_container_tags.clone(),
                state.client_builder_custom_tags.clone(),
            ),
        };

        debug!("Created <{}> {} at {}", tag, name, index);
        let node = ContainerNode::new(
            container,
            tag.to_string(),
            name.to_string(),
            state.client,
            kind,
            tags,
            merging_name,
            group,
        );
        Some(self.ctx.tree.add_child(self.parent, node))
    }

    /// Ask the client's builder first, then the factory's
    fn create_container(
        &mut self,
        parent: Option<WidgetId>,
        index: usize,
        element: &Element,
    ) -> Option<(WidgetId, BuilderKind)> {
        if let Some(kind) = self.ctx.state.client_builder {
            if let Some(builder) = self.ctx.builders.get(kind) {
                if let Some(container) = builder.create_container(parent, index, element) {
                    return Some((container, kind));
                }
            }
        }

        let container = self
            .ctx
            .builders
            .factory
            .create_container(parent, index, element)?;
        Some((container, BuilderKind::Factory))
    }

    fn process_merge(&mut self, element: &Element, name: &str) {
        let vocab = self.ctx.vocab;

        let merging_name = if element.is(&vocab.tag_define_group) {
            if name.is_empty() {
                error!("Cannot define a group without a name");
                return;
            }
            vocab.group_merging_name(name)
        } else if element.is(&vocab.tag_action_list) {
            if name.is_empty() {
                error!("Cannot define an action list without a name");
                return;
            }
            vocab.action_list_merging_name(name)
        } else if name.is_empty() {
            vocab.default_merging_name.clone()
        } else {
            name.to_string()
        };

        let Some(node) = self.ctx.tree.node_mut(self.parent) else {
            return;
        };
        if node.find_index(&merging_name).is_some() {
            warn!(
                "Merging index {} already defined in <{}> {}, ignoring",
                merging_name, node.tag_name, node.name
            );
            return;
        }

        // a merge point inside another one goes right after it
        let group = vocab.group_merging_name(element.attr_or_empty(&vocab.attr_group));
        let (value, parent_pos) = node.calc_merging_index(&group, self.ctx.state, self.ignore_default);
        let index = MergingIndex {
            value,
            merging_name: merging_name.clone(),
            client_name: self.ctx.state.client_name.clone(),
        };
        match parent_pos {
            Some(pos) => node.merging_indices.insert(pos + 1, index),
            None => node.merging_indices.push(index),
        }

        if merging_name == vocab.default_merging_name {
            self.ignore_default = true;
        }
        self.refresh_running_indices();
    }

    fn process_state(&mut self, element: &Element) {
        if let Some(state) = parse_state_element(element, self.ctx.vocab) {
            self.ctx.state.states.push(state);
        }
    }
}
