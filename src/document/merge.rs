// Base/additive document merging
//
// Combines a base document (typically the global standards file) with a
// client document before any container is built. This is also where weak
// separators are normalized: a separator coming from the base document is
// dropped when it would start the container, follow another weak separator
// or follow a `<text>` element, and a weak separator left at the end of a
// container is dropped too.

use crate::client::ActionSource;
use crate::config::Vocabulary;
use crate::dom::Element;
use tracing::{debug, trace};

/// Merges GUI documents against the actions a client implements
pub struct DocumentMerger<'a> {
    vocab: &'a Vocabulary,
    actions: &'a dyn ActionSource,
}

impl<'a> DocumentMerger<'a> {
    pub fn new(vocab: &'a Vocabulary, actions: &'a dyn ActionSource) -> Self {
        Self { vocab, actions }
    }

    /// Merge `additive` over `base` and return the combined document
    pub fn merge_documents(&self, mut base: Element, additive: Element) -> Element {
        if self.replaces(&additive) {
            debug!("Document <{}> replaces its base", additive.tag);
            return additive;
        }

        self.merge(&mut base, Some(additive));
        base
    }

    /// Merge against nothing: strips unimplemented actions, empty containers
    /// and redundant weak separators from a lone base document
    pub fn normalize(&self, mut base: Element) -> Element {
        self.merge(&mut base, None);
        base
    }

    fn replaces(&self, element: &Element) -> bool {
        element.attribute(&self.vocab.attr_no_merge) == Some("1")
    }

    /// Returns true when `base` ended up empty and may be removed by the caller
    fn merge(&self, base: &mut Element, additive: Option<Element>) -> bool {
        let vocab = self.vocab;

        let mut pending: Vec<Option<Element>> = match additive {
            Some(additive) => {
                for (key, value) in additive.attributes {
                    base.set_attribute(key, value);
                }
                additive.children.into_iter().map(Some).collect()
            }
            None => Vec::new(),
        };

        let mut i = 0;
        while i < base.children.len() {
            let child = &base.children[i];

            if child.is(&vocab.tag_action) {
                let name = child.attr_or_empty(&vocab.attr_name);
                if self.actions.action(name).is_none() {
                    trace!("Dropping unimplemented action {}", name);
                    base.children.remove(i);
                    continue;
                }
                i += 1;
            } else if child.is(&vocab.tag_separator) {
                base.children[i].set_attribute(vocab.attr_weak_separator.as_str(), "1");

                let redundant = match i.checked_sub(1).map(|p| &base.children[p]) {
                    None => true,
                    Some(prev) => self.is_weak_separator(prev) || prev.is(&vocab.tag_text),
                };
                if redundant {
                    base.children.remove(i);
                    continue;
                }
                i += 1;
            } else if child.is(&vocab.tag_merge_local) {
                i = self.expand_merge_local(base, i, &mut pending);
            } else if child.is(&vocab.tag_text) || child.is(&vocab.tag_merge) {
                i += 1;
            } else {
                // a container: merge it with its counterpart, if any
                match find_matching_slot(child, &pending, vocab) {
                    Some(slot) => {
                        let matching = pending[slot].take().unwrap_or_default();
                        if self.replaces(&matching) {
                            debug!("<{}> replaced wholesale", matching.tag);
                            base.children[i] = matching;
                            i += 1;
                        } else if self.merge(&mut base.children[i], Some(matching)) {
                            base.children.remove(i);
                        } else {
                            i += 1;
                        }
                    }
                    None => {
                        if self.merge(&mut base.children[i], None) {
                            base.children.remove(i);
                        } else {
                            i += 1;
                        }
                    }
                }
            }
        }

        // append everything that was not merged in via MergeLocal
        for element in pending.into_iter().flatten() {
            if find_matching_element(&element, &base.children, vocab).is_none() {
                base.children.push(element);
            }
        }

        if base.children.last().is_some_and(|last| self.is_weak_separator(last)) {
            base.children.pop();
        }

        self.is_empty_container(base)
    }

    /// Insert the pending additive elements at the `<MergeLocal>` at `pos`,
    /// remove the marker, and return the index of the element that followed it
    fn expand_merge_local(
        &self,
        base: &mut Element,
        pos: usize,
        pending: &mut [Option<Element>],
    ) -> usize {
        let vocab = self.vocab;
        let marker_name = base.children[pos].attr_or_empty(&vocab.attr_name).to_string();
        let mut insert_at = pos;

        for slot in pending.iter_mut() {
            let Some(candidate) = slot.as_ref() else {
                continue;
            };
            if candidate.is(&vocab.tag_text) {
                continue;
            }
            if candidate.attr_or_empty(&vocab.attr_append) != marker_name {
                continue;
            }

            // elements matching a base element get merged there instead
            let unmatched = find_matching_element(candidate, &base.children, vocab).is_none();
            if unmatched || candidate.is(&vocab.tag_separator) {
                if let Some(element) = slot.take() {
                    base.children.insert(insert_at, element);
                    insert_at += 1;
                }
            }
        }

        base.children.remove(insert_at);
        insert_at
    }

    fn is_weak_separator(&self, element: &Element) -> bool {
        element.is(&self.vocab.tag_separator) && element.has_attribute(&self.vocab.attr_weak_separator)
    }

    /// A container survives if it holds an implemented action, a separator
    /// owned by the additive document, or any other non-text, non-merge element
    pub fn is_empty_container(&self, base: &Element) -> bool {
        let vocab = self.vocab;
        for child in &base.children {
            if child.is(&vocab.tag_action) {
                if self.actions.action(child.attr_or_empty(&vocab.attr_name)).is_some() {
                    return false;
                }
            } else if child.is(&vocab.tag_separator) {
                let weak = child
                    .attribute(&vocab.attr_weak_separator)
                    .and_then(|v| v.trim().parse::<i32>().ok());
                if weak != Some(1) {
                    return false;
                }
            } else if child.is(&vocab.tag_merge) || child.is(&vocab.tag_text) {
                continue;
            } else {
                return false;
            }
        }
        true
    }
}

/// First element among `candidates` with the same tag and `name` as `element`.
/// Actions and MergeLocal markers never match.
pub fn find_matching_element<'e>(
    element: &Element,
    candidates: &'e [Element],
    vocab: &Vocabulary,
) -> Option<&'e Element> {
    candidates
        .iter()
        .find(|candidate| is_match(element, candidate, vocab))
}

fn find_matching_slot(element: &Element, pending: &[Option<Element>], vocab: &Vocabulary) -> Option<usize> {
    pending.iter().position(|slot| {
        slot.as_ref()
            .is_some_and(|candidate| is_match(element, candidate, vocab))
    })
}

fn is_match(element: &Element, candidate: &Element, vocab: &Vocabulary) -> bool {
    if candidate.is(&vocab.tag_action) || candidate.is(&vocab.tag_merge_local) {
        return false;
    }
    candidate.tag.eq_ignore_ascii_case(&element.tag)
        && candidate.attr_or_empty(&vocab.attr_name) == element.attr_or_empty(&vocab.attr_name)
}
