// Teardown engine
//
// Removes one client bottom-up. Every index shift made while building is
// undone here at the same merging index, so the remaining clients keep their
// relative order.

use super::build::Builders;
use super::node::{ContainerClient, ContainerNode, NodeId};
use super::state::BuildState;
use super::ContainerTree;
use crate::builder::{ContainerBuilder, WidgetId};
use crate::config::Vocabulary;
use crate::dom::Element;
use tracing::{debug, warn};

pub(crate) struct TeardownContext<'a> {
    pub tree: &'a mut ContainerTree,
    pub builders: Builders<'a>,
    pub vocab: &'a Vocabulary,
    pub state: &'a BuildState,
}

/// Remove the active client from `id` and its subtree. Returns true when the
/// node's container was destroyed and the caller should detach the node.
pub(crate) fn destruct(
    ctx: &mut TeardownContext<'_>,
    id: NodeId,
    mut element: Option<&mut Element>,
) -> bool {
    destruct_children(ctx, id, element.as_deref_mut());
    unplug_actions(ctx, id);

    let client = ctx.state.client;
    let client_name = ctx.state.client_name.as_str();
    let parent_container = ctx
        .tree
        .parent(id)
        .and_then(|p| ctx.tree.node(p))
        .and_then(|p| p.container);

    let Some(node) = ctx.tree.node_mut(id) else {
        return false;
    };
    node.merging_indices.retain(|m| m.client_name != client_name);

    // a container whose creator left earlier belongs to whoever empties it
    let owned = node.client.is_none() || node.client == Some(client);
    if node.clients.is_empty() && node.children.is_empty() && owned {
        if let Some(container) = node.container {
            debug!("Removing <{}> {}", node.tag_name, node.name);
            match ctx.builders.get(node.builder) {
                Some(builder) => builder.remove_container(container, parent_container, element),
                None => warn!("No builder left to remove <{}> {}", node.tag_name, node.name),
            }
            node.client = None;
            return true;
        }
    }

    if node.client == Some(client) {
        node.client = None;
    }
    false
}

fn destruct_children(ctx: &mut TeardownContext<'_>, id: NodeId, mut element: Option<&mut Element>) {
    let vocab = ctx.vocab;
    let name_attr = vocab.attr_name.as_str();

    for child in ctx.tree.children(id).to_vec() {
        let Some(node) = ctx.tree.node(child) else {
            continue;
        };
        let (tag, name) = (node.tag_name.clone(), node.name.clone());

        let child_element = element.as_deref_mut().and_then(|e| {
            e.children
                .iter_mut()
                .find(|c| c.tag_lower() == tag && c.attr_or_empty(name_attr) == name)
        });

        if destruct(ctx, child, child_element) {
            ctx.tree.remove_child(id, child);
        }
    }
}

/// Unplug everything the active client put directly into this container
fn unplug_actions(ctx: &mut TeardownContext<'_>, id: NodeId) {
    let client = ctx.state.client;
    let vocab = ctx.vocab;

    let Some(node) = ctx.tree.node_mut(id) else {
        return;
    };
    let Some(container) = node.container else {
        return;
    };
    let mut builder = ctx.builders.get(node.builder);

    if node.clients.len() == 1 && node.clients[0].client == client && node.client == Some(client) {
        if let Some(builder) = builder.as_deref_mut() {
            builder.hide_container(container);
        }
    }

    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut node.clients)
        .into_iter()
        .partition(|cc| cc.client == client);
    node.clients = kept;

    for record in removed {
        unplug_client(node, container, &record, builder.as_deref_mut(), vocab);
    }
}

fn unplug_client(
    node: &mut ContainerNode,
    container: WidgetId,
    record: &ContainerClient,
    mut builder: Option<&mut (dyn ContainerBuilder + '_)>,
    vocab: &Vocabulary,
) {
    match builder.as_deref_mut() {
        Some(builder) => {
            for id in &record.custom_elements {
                builder.remove_custom_element(container, *id);
            }
            for id in &record.actions {
                builder.remove_action(container, *id);
            }
        }
        None => warn!("No builder left to unplug from <{}> {}", node.tag_name, node.name),
    }

    let from = node.find_index(&record.merging_name);
    node.adjust_merging_indices(-(record.item_count() as isize), from);

    for (list, actions) in &record.action_lists {
        if let Some(builder) = builder.as_deref_mut() {
            for id in actions {
                builder.remove_action(container, *id);
            }
        }

        let key = vocab.action_list_merging_name(list);
        let Some(pos) = node.find_index(&key) else {
            continue;
        };
        node.adjust_merging_indices(-(actions.len() as isize), Some(pos));
        node.merging_indices.remove(pos);
    }
}
