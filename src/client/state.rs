// Named action states
//
// A `<State name="...">` element lists actions to enable and disable when the
// client switches into that state.

use crate::config::Vocabulary;
use crate::dom::Element;
use tracing::warn;

/// Actions to toggle when a state is entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateChange {
    pub actions_to_enable: Vec<String>,
    pub actions_to_disable: Vec<String>,
}

/// Whether a state change is applied or reverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverseStateChange {
    #[default]
    StateNoReverse,
    StateReverse,
}

/// Read a `<State>` element into its name and change set.
///
/// A state without a name is rejected. An `<Action>` without a name inside
/// the enable/disable lists stops processing of the element; everything
/// collected up to that point is kept.
pub fn parse_state_element(element: &Element, vocab: &Vocabulary) -> Option<(String, StateChange)> {
    let state_name = element.attr_or_empty(&vocab.attr_name);
    if state_name.is_empty() {
        warn!("Ignoring <{}> without a name", element.tag);
        return None;
    }

    let mut change = StateChange::default();
    'lists: for list in &element.children {
        let enable = list.is(&vocab.tag_enable);
        if !enable && !list.is(&vocab.tag_disable) {
            continue;
        }

        for action in list.children.iter().filter(|c| c.is(&vocab.tag_action)) {
            let action_name = action.attr_or_empty(&vocab.attr_name);
            if action_name.is_empty() {
                warn!("Nameless action in state {}", state_name);
                break 'lists;
            }
            if enable {
                change.actions_to_enable.push(action_name.to_string());
            } else {
                change.actions_to_disable.push(action_name.to_string());
            }
        }
    }

    Some((state_name.to_string(), change))
}
