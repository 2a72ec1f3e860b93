// In-memory widget tree
//
// A toolkit-free ContainerBuilder that records what a real GUI toolkit would
// have built. Used by the CLI to print composed menus and toolbars, and by
// tests to check item ordering.

use super::{ActionId, ContainerBuilder, ElementId, WidgetId};
use crate::client::Action;
use crate::dom::Element;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const CONTAINER_TAGS: &[&str] = &["menubar", "menu", "toolbar", "statusbar"];
const CUSTOM_TAGS: &[&str] = &["separator", "tearoffhandle", "title"];

/// One entry inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetItem {
    Action {
        id: ActionId,
        name: String,
        label: String,
        shortcut: Option<String>,
    },
    Separator(ElementId),
    TearOff(ElementId),
    Title(ElementId, String),
    Container(WidgetId),
}

#[derive(Debug, Clone)]
struct Widget {
    tag: String,
    name: String,
    caption: String,
    parent: Option<WidgetId>,
    items: Vec<WidgetItem>,
    hidden: bool,
    position: Option<String>,
}

/// The widgets created so far, in display order
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: BTreeMap<WidgetId, Widget>,
    top_level: Vec<WidgetId>,
    next_id: u64,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of live containers
    pub fn container_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// First container with this tag and name, depth-first in display order
    pub fn find(&self, tag: &str, name: &str) -> Option<WidgetId> {
        fn walk(tree: &WidgetTree, ids: &[WidgetId], tag: &str, name: &str) -> Option<WidgetId> {
            for id in ids {
                let widget = tree.widgets.get(id)?;
                if widget.tag.eq_ignore_ascii_case(tag) && widget.name == name {
                    return Some(*id);
                }
                let children: Vec<WidgetId> = widget
                    .items
                    .iter()
                    .filter_map(|item| match item {
                        WidgetItem::Container(child) => Some(*child),
                        _ => None,
                    })
                    .collect();
                if let Some(found) = walk(tree, &children, tag, name) {
                    return Some(found);
                }
            }
            None
        }
        walk(self, &self.top_level, tag, name)
    }

    /// Short labels for the items of a container: action names, `-` for
    /// separators, `~` for tear-off handles, `[text]` for titles and
    /// `tag:name` for sub-containers
    pub fn item_labels(&self, container: WidgetId) -> Vec<String> {
        let Some(widget) = self.widgets.get(&container) else {
            return Vec::new();
        };
        widget
            .items
            .iter()
            .map(|item| match item {
                WidgetItem::Action { name, .. } => name.clone(),
                WidgetItem::Separator(_) => "-".to_string(),
                WidgetItem::TearOff(_) => "~".to_string(),
                WidgetItem::Title(_, text) => format!("[{}]", text),
                WidgetItem::Container(id) => match self.widgets.get(id) {
                    Some(child) => format!("{}:{}", child.tag, child.name),
                    None => "?".to_string(),
                },
            })
            .collect()
    }

    /// `tag:name` labels of the top-level containers
    pub fn top_level_labels(&self) -> Vec<String> {
        self.top_level
            .iter()
            .filter_map(|id| self.widgets.get(id))
            .map(|w| format!("{}:{}", w.tag, w.name))
            .collect()
    }

    pub fn is_hidden(&self, container: WidgetId) -> bool {
        self.widgets.get(&container).is_some_and(|w| w.hidden)
    }

    /// Serializable view of the whole tree
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            containers: self
                .top_level
                .iter()
                .filter_map(|id| self.container_snapshot(*id))
                .collect(),
        }
    }

    fn container_snapshot(&self, id: WidgetId) -> Option<ContainerSnapshot> {
        let widget = self.widgets.get(&id)?;
        let items = widget
            .items
            .iter()
            .filter_map(|item| match item {
                WidgetItem::Action {
                    name,
                    label,
                    shortcut,
                    ..
                } => Some(ItemSnapshot::Action {
                    name: name.clone(),
                    label: label.clone(),
                    shortcut: shortcut.clone(),
                }),
                WidgetItem::Separator(_) => Some(ItemSnapshot::Separator),
                WidgetItem::TearOff(_) => Some(ItemSnapshot::TearOff),
                WidgetItem::Title(_, text) => Some(ItemSnapshot::Title { text: text.clone() }),
                WidgetItem::Container(child) => {
                    self.container_snapshot(*child).map(ItemSnapshot::Container)
                }
            })
            .collect();

        Some(ContainerSnapshot {
            tag: widget.tag.clone(),
            name: widget.name.clone(),
            caption: widget.caption.clone(),
            hidden: widget.hidden,
            position: widget.position.clone(),
            items,
        })
    }

    fn items_mut(&mut self, container: WidgetId) -> Option<&mut Vec<WidgetItem>> {
        self.widgets.get_mut(&container).map(|w| &mut w.items)
    }

    fn drop_widget(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.remove(&id) {
            for item in widget.items {
                if let WidgetItem::Container(child) = item {
                    debug!("Dropping orphaned container {}", child);
                    self.drop_widget(child);
                }
            }
        }
    }
}

impl ContainerBuilder for WidgetTree {
    fn container_tags(&self) -> Vec<String> {
        CONTAINER_TAGS.iter().map(|t| t.to_string()).collect()
    }

    fn custom_tags(&self) -> Vec<String> {
        CUSTOM_TAGS.iter().map(|t| t.to_string()).collect()
    }

    fn create_container(
        &mut self,
        parent: Option<WidgetId>,
        index: usize,
        element: &Element,
    ) -> Option<WidgetId> {
        let tag = element.tag_lower();
        if !CONTAINER_TAGS.contains(&tag.as_str()) {
            return None;
        }
        if parent.is_some_and(|p| !self.widgets.contains_key(&p)) {
            warn!("Cannot create <{}> in unknown container", element.tag);
            return None;
        }

        let id = WidgetId(self.allocate());
        self.widgets.insert(
            id,
            Widget {
                tag,
                name: element.attr_or_empty("name").to_string(),
                caption: element.caption().to_string(),
                parent,
                items: Vec::new(),
                hidden: element.attribute("hidden") == Some("true"),
                position: element.attribute("position").map(str::to_string),
            },
        );

        match parent {
            Some(p) => {
                let items = self.items_mut(p)?;
                let at = index.min(items.len());
                items.insert(at, WidgetItem::Container(id));
            }
            None => {
                let at = index.min(self.top_level.len());
                self.top_level.insert(at, id);
            }
        }
        Some(id)
    }

    fn remove_container(
        &mut self,
        container: WidgetId,
        parent: Option<WidgetId>,
        element: Option<&mut Element>,
    ) {
        if let (Some(element), Some(widget)) = (element, self.widgets.get(&container)) {
            if let Some(position) = &widget.position {
                element.set_attribute("position", position.as_str());
            }
        }

        let parent = parent.or_else(|| self.widgets.get(&container).and_then(|w| w.parent));
        match parent.and_then(|p| self.items_mut(p)) {
            Some(items) => items.retain(|item| *item != WidgetItem::Container(container)),
            None => self.top_level.retain(|id| *id != container),
        }
        self.drop_widget(container);
    }

    fn create_custom_element(
        &mut self,
        parent: WidgetId,
        index: usize,
        element: &Element,
    ) -> Option<ElementId> {
        let id = ElementId(self.allocate());
        let item = match element.tag_lower().as_str() {
            "separator" => WidgetItem::Separator(id),
            "tearoffhandle" => WidgetItem::TearOff(id),
            "title" => WidgetItem::Title(id, element.caption().to_string()),
            _ => return None,
        };

        let items = self.items_mut(parent)?;
        let at = index.min(items.len());
        items.insert(at, item);
        Some(id)
    }

    fn remove_custom_element(&mut self, parent: WidgetId, id: ElementId) {
        if let Some(items) = self.items_mut(parent) {
            items.retain(|item| match item {
                WidgetItem::Separator(e) | WidgetItem::TearOff(e) | WidgetItem::Title(e, _) => {
                    *e != id
                }
                _ => true,
            });
        }
    }

    fn insert_action(
        &mut self,
        container: WidgetId,
        index: usize,
        action: &Action,
    ) -> Option<ActionId> {
        if !self.widgets.contains_key(&container) {
            warn!("Cannot plug {} into unknown container {}", action.name, container);
            return None;
        }
        let id = ActionId(self.allocate());
        let items = self.items_mut(container)?;
        let at = index.min(items.len());
        items.insert(
            at,
            WidgetItem::Action {
                id,
                name: action.name.clone(),
                label: action.label().to_string(),
                shortcut: action.shortcut.clone(),
            },
        );
        Some(id)
    }

    fn remove_action(&mut self, container: WidgetId, id: ActionId) {
        if let Some(items) = self.items_mut(container) {
            items.retain(|item| !matches!(item, WidgetItem::Action { id: plugged, .. } if *plugged == id));
        }
    }

    fn hide_container(&mut self, container: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&container) {
            widget.hidden = true;
        }
    }
}

/// Serializable form of a [`WidgetTree`]
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub containers: Vec<ContainerSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerSnapshot {
    pub tag: String,
    pub name: String,
    pub caption: String,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSnapshot {
    Action {
        name: String,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        shortcut: Option<String>,
    },
    Separator,
    TearOff,
    Title {
        text: String,
    },
    Container(ContainerSnapshot),
}
