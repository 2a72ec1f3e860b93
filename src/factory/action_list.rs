// Action lists
//
// An `<ActionList name="x"/>` in a client document reserves the merging index
// `actionlistx`. Lists of actions can then be plugged there and unplugged
// again without rebuilding the client.

use super::build::Builders;
use super::node::NodeId;
use super::state::BuildState;
use super::ContainerTree;
use crate::client::Action;
use crate::config::Vocabulary;
use tracing::debug;

pub(crate) struct ListContext<'a> {
    pub tree: &'a mut ContainerTree,
    pub builders: Builders<'a>,
    pub vocab: &'a Vocabulary,
    pub state: &'a BuildState,
}

/// Plug `actions` at every merge point of the active list defined by the
/// active client, in `id` and below. Returns how many places got the list.
pub(crate) fn plug_action_list(ctx: &mut ListContext<'_>, id: NodeId, actions: &[Action]) -> usize {
    let state = ctx.state;
    let key = ctx.vocab.action_list_merging_name(&state.action_list_name);
    let mut plugged = 0;

    if let Some(node) = ctx.tree.node_mut(id) {
        let target = node
            .merging_indices
            .iter()
            .position(|m| m.merging_name == key && m.client_name == state.client_name);

        if let (Some(pos), Some(container)) = (target, node.container) {
            let value = node.merging_indices[pos].value;
            let record = node.find_child_container_client(state.client, "", None);

            let mut ids = Vec::with_capacity(actions.len());
            if let Some(builder) = ctx.builders.get(node.builder) {
                for action in actions {
                    if let Some(action_id) = builder.insert_action(container, value + ids.len(), action) {
                        ids.push(action_id);
                    }
                }
            }
            let count = ids.len();
            node.clients[record]
                .action_lists
                .insert(state.action_list_name.clone(), ids);
            node.adjust_merging_indices(count as isize, Some(pos));

            debug!(
                "Plugged {} actions of list {} into <{}> {}",
                count,
                state.action_list_name,
                node.tag_name,
                node.name
            );
            plugged += 1;
        }
    }

    for child in ctx.tree.children(id).to_vec() {
        plugged += plug_action_list(ctx, child, actions);
    }
    plugged
}

/// Remove the active list from `id` and below. Returns how many places had it.
pub(crate) fn unplug_action_list(ctx: &mut ListContext<'_>, id: NodeId) -> usize {
    let state = ctx.state;
    let key = ctx.vocab.action_list_merging_name(&state.action_list_name);
    let mut unplugged = 0;

    if let Some(node) = ctx.tree.node_mut(id) {
        let target = node
            .merging_indices
            .iter()
            .position(|m| m.merging_name == key && m.client_name == state.client_name);
        let record = node.clients.iter().position(|cc| {
            cc.client == state.client && cc.action_lists.contains_key(&state.action_list_name)
        });

        if let (Some(pos), Some(record), Some(container)) = (target, record, node.container) {
            let actions = node.clients[record]
                .action_lists
                .remove(&state.action_list_name)
                .unwrap_or_default();

            if let Some(builder) = ctx.builders.get(node.builder) {
                for id in &actions {
                    builder.remove_action(container, *id);
                }
            }
            node.adjust_merging_indices(-(actions.len() as isize), Some(pos));
            unplugged += 1;
        }
    }

    for child in ctx.tree.children(id).to_vec() {
        unplugged += unplug_action_list(ctx, child);
    }
    unplugged
}
