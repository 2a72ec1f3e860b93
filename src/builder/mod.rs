//! Container builders
//!
//! The merge engine never creates widgets itself. Everything toolkit-specific
//! goes through [`ContainerBuilder`]: which tags it can build, how to create
//! and remove containers and custom elements, and how to plug actions.

mod widget_tree;

pub use widget_tree::{ContainerSnapshot, ItemSnapshot, WidgetItem, WidgetSnapshot, WidgetTree};

use crate::client::Action;
use crate::dom::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of a container created by a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

/// Opaque handle of a custom element (separator, title, ...) created by a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Opaque handle of one plugged action. Two clients may plug actions with
/// the same name into one container, so unplugging goes by handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Creates and destroys the concrete GUI for a merged document.
///
/// Indices are positions among everything the engine has inserted into a
/// container so far: actions, custom elements and child containers alike.
/// Builders should clamp indices past the end.
pub trait ContainerBuilder {
    /// Tags (lowercase) this builder can turn into containers
    fn container_tags(&self) -> Vec<String>;

    /// Tags (lowercase) this builder can turn into custom elements
    fn custom_tags(&self) -> Vec<String>;

    /// Create a container for `element` inside `parent` (None at top level).
    /// Returning None means the builder declined and the subtree is skipped.
    fn create_container(
        &mut self,
        parent: Option<WidgetId>,
        index: usize,
        element: &Element,
    ) -> Option<WidgetId>;

    /// Destroy a container. The builder may write state it wants restored
    /// on the next build back into `element`.
    fn remove_container(
        &mut self,
        container: WidgetId,
        parent: Option<WidgetId>,
        element: Option<&mut Element>,
    );

    fn create_custom_element(
        &mut self,
        parent: WidgetId,
        index: usize,
        element: &Element,
    ) -> Option<ElementId>;

    fn remove_custom_element(&mut self, parent: WidgetId, id: ElementId);

    /// Plug `action` at `index`. None means nothing was inserted.
    fn insert_action(
        &mut self,
        container: WidgetId,
        index: usize,
        action: &Action,
    ) -> Option<ActionId>;

    fn remove_action(&mut self, container: WidgetId, id: ActionId);

    /// Hide a container that should not be shown, without destroying it
    fn hide_container(&mut self, _container: WidgetId) {}

    /// Called once after a client's document has been built
    fn finalize_gui(&mut self) {}
}

impl<T: ContainerBuilder + ?Sized> ContainerBuilder for Box<T> {
    fn container_tags(&self) -> Vec<String> {
        (**self).container_tags()
    }

    fn custom_tags(&self) -> Vec<String> {
        (**self).custom_tags()
    }

    fn create_container(
        &mut self,
        parent: Option<WidgetId>,
        index: usize,
        element: &Element,
    ) -> Option<WidgetId> {
        (**self).create_container(parent, index, element)
    }

    fn remove_container(
        &mut self,
        container: WidgetId,
        parent: Option<WidgetId>,
        element: Option<&mut Element>,
    ) {
        (**self).remove_container(container, parent, element)
    }

    fn create_custom_element(
        &mut self,
        parent: WidgetId,
        index: usize,
        element: &Element,
    ) -> Option<ElementId> {
        (**self).create_custom_element(parent, index, element)
    }

    fn remove_custom_element(&mut self, parent: WidgetId, id: ElementId) {
        (**self).remove_custom_element(parent, id)
    }

    fn insert_action(
        &mut self,
        container: WidgetId,
        index: usize,
        action: &Action,
    ) -> Option<ActionId> {
        (**self).insert_action(container, index, action)
    }

    fn remove_action(&mut self, container: WidgetId, id: ActionId) {
        (**self).remove_action(container, id)
    }

    fn hide_container(&mut self, container: WidgetId) {
        (**self).hide_container(container)
    }

    fn finalize_gui(&mut self) {
        (**self).finalize_gui()
    }
}
