// ActionProperties blocks
//
// `<ActionProperties scheme="...">` holds per-action overrides, most commonly
// shortcuts. Each child `<Action name="...">` carries the properties to set as
// attributes.

use crate::client::{Action, ActionCollection};
use crate::config::Vocabulary;
use crate::dom::Element;
use tracing::{debug, trace};

/// All ActionProperties children of a document root, any scheme
pub fn action_properties_elements<'a>(
    doc: &'a Element,
    vocab: &'a Vocabulary,
) -> impl Iterator<Item = &'a Element> + 'a {
    doc.children
        .iter()
        .filter(move |c| c.is(&vocab.tag_action_properties))
}

fn scheme_of<'a>(element: &'a Element, vocab: &'a Vocabulary) -> &'a str {
    element
        .attribute(&vocab.attr_scheme)
        .unwrap_or(vocab.default_scheme.as_str())
}

/// The ActionProperties block for `scheme`, if the document has one
pub fn find_action_properties<'a>(
    doc: &'a Element,
    scheme: &str,
    vocab: &'a Vocabulary,
) -> Option<&'a Element> {
    action_properties_elements(doc, vocab).find(|e| scheme_of(e, vocab) == scheme)
}

/// The ActionProperties block for `scheme`, appended to the root if missing
pub fn action_properties_element<'a>(
    doc: &'a mut Element,
    scheme: &str,
    vocab: &Vocabulary,
) -> &'a mut Element {
    let pos = doc
        .children
        .iter()
        .position(|e| e.is(&vocab.tag_action_properties) && scheme_of(e, vocab) == scheme);

    let pos = match pos {
        Some(pos) => pos,
        None => {
            doc.children.push(
                Element::new(vocab.tag_action_properties.as_str())
                    .with_attribute(vocab.attr_scheme.as_str(), scheme),
            );
            doc.children.len() - 1
        }
    };
    &mut doc.children[pos]
}

/// The `<Action name=...>` entry of a properties block, created on demand
pub fn find_action_by_name<'a>(
    properties: &'a mut Element,
    name: &str,
    create: bool,
    vocab: &Vocabulary,
) -> Option<&'a mut Element> {
    let pos = properties
        .children
        .iter()
        .position(|e| e.is(&vocab.tag_action) && e.attr_or_empty(&vocab.attr_name) == name);

    match pos {
        Some(pos) => Some(&mut properties.children[pos]),
        None if create => {
            properties.children.push(
                Element::new("Action").with_attribute(vocab.attr_name.as_str(), name),
            );
            properties.children.last_mut()
        }
        None => None,
    }
}

/// Apply the attributes of one `<Action>` properties entry to an action.
///
/// `accel` is accepted as an alias for `shortcut`. With `set_default` a
/// shortcut also becomes the action's default shortcut.
pub fn configure_action(action: &mut Action, entry: &Element, set_default: bool, vocab: &Vocabulary) {
    for (key, value) in &entry.attributes {
        if *key == vocab.attr_name {
            continue;
        }
        let key = if key == "accel" { "shortcut" } else { key.as_str() };

        match key {
            "shortcut" => {
                let shortcut = (!value.is_empty()).then(|| value.clone());
                if set_default {
                    action.default_shortcut = shortcut.clone();
                }
                action.shortcut = shortcut;
            }
            "text" => action.text = value.clone(),
            "icon" => action.icon = (!value.is_empty()).then(|| value.clone()),
            "enabled" => action.enabled = value != "false" && value != "0",
            other => {
                debug!("Storing custom property {}={} on {}", other, value, action.name);
                action.properties.insert(other.to_string(), value.clone());
            }
        }
    }
    trace!("Configured action {}", action.name);
}

/// Apply every entry of a properties block to the matching actions
pub fn apply_action_properties(
    block: &Element,
    set_default: bool,
    vocab: &Vocabulary,
    actions: &mut ActionCollection,
) {
    for entry in block.children.iter().filter(|e| e.is(&vocab.tag_action)) {
        let name = entry.attr_or_empty(&vocab.attr_name);
        match actions.action_mut(name) {
            Some(action) => configure_action(action, entry, set_default, vocab),
            None => trace!("No action {} for properties", name),
        }
    }
}
