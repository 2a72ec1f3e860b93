//! End-to-end composition tests
//!
//! These tests add and remove clients through the factory and check the
//! widgets the in-memory builder ends up with.

use std::cell::RefCell;
use std::rc::Rc;
use xmlgui::builder::{ActionId, ContainerBuilder, ElementId, ItemSnapshot, WidgetId, WidgetTree};
use xmlgui::client::{Action, ActionSource, GuiClient, ReverseStateChange};
use xmlgui::config::Vocabulary;
use xmlgui::document::DocumentMerger;
use xmlgui::dom::{parse_document, Element};
use xmlgui::factory::{ClientId, Factory};

fn client(name: &str, actions: &[&str], xml: &str) -> GuiClient {
    let mut client = GuiClient::new(name);
    for action in actions {
        client.add_action(Action::new(*action));
    }
    client.set_xml(xml, false).expect("valid test document");
    client
}

fn factory() -> Factory<WidgetTree> {
    Factory::new(WidgetTree::new(), Vocabulary::default())
}

fn labels(factory: &Factory<WidgetTree>, name: &str) -> Vec<String> {
    match factory.container(name, None, false) {
        Some(widget) => factory.builder().item_labels(widget),
        None => Vec::new(),
    }
}

fn merging_value(factory: &Factory<WidgetTree>, container: &str, merging_name: &str) -> Option<usize> {
    let tree = factory.tree();
    let node = tree.find_container(tree.root(), container, None, false)?;
    tree.node(node)?.merging_index(merging_name).map(|m| m.value)
}

fn assert_pristine(factory: &Factory<WidgetTree>) {
    let tree = factory.tree();
    let root = tree.node(tree.root()).unwrap();
    assert_eq!(tree.node_count(), 1, "tree:\n{}", tree.dump());
    assert!(root.children.is_empty());
    assert!(root.merging_indices.is_empty());
    assert!(root.clients.is_empty());
    assert_eq!(root.index, 0);
    assert!(factory.builder().is_empty());
}

const X_FILE: &str = r#"<gui name="x"><MenuBar><Menu name="file">
    <Action name="open"/><Merge/><Action name="save"/>
</Menu></MenuBar></gui>"#;

const Y_FILE: &str = r#"<gui name="y"><MenuBar><Menu name="file">
    <Action name="print"/>
</Menu></MenuBar></gui>"#;

// ============================================================================
// Default merge point
// ============================================================================

#[test]
fn test_first_client_defines_default_merge_point() {
    let mut factory = factory();
    factory.add_client(client("x", &["open", "save"], X_FILE));

    assert_eq!(labels(&factory, "file"), vec!["open", "save"]);
    assert_eq!(merging_value(&factory, "file", "<default>"), Some(1));
}

#[test]
fn test_second_client_lands_at_default_merge_point() {
    let mut factory = factory();
    factory.add_client(client("x", &["open", "save"], X_FILE));
    factory.add_client(client("y", &["print"], Y_FILE));

    assert_eq!(labels(&factory, "file"), vec!["open", "print", "save"]);
    assert_eq!(merging_value(&factory, "file", "<default>"), Some(2));
}

#[test]
fn test_removing_second_client_restores_first() {
    let mut factory = factory();
    factory.add_client(client("x", &["open", "save"], X_FILE));
    let y = factory.add_client(client("y", &["print"], Y_FILE));

    factory.remove_client(y).unwrap();

    assert_eq!(labels(&factory, "file"), vec!["open", "save"]);
    assert_eq!(merging_value(&factory, "file", "<default>"), Some(1));
}

#[test]
fn test_named_merge_point_takes_matching_client() {
    let mut factory = factory();
    factory.add_client(client(
        "shell",
        &["open", "quit"],
        r#"<gui name="shell"><MenuBar><Menu name="file">
             <Action name="open"/><Merge name="spell"/><Merge/><Action name="quit"/>
           </Menu></MenuBar></gui>"#,
    ));
    factory.add_client(client(
        "other",
        &["share"],
        r#"<gui name="other"><MenuBar><Menu name="file"><Action name="share"/></Menu></MenuBar></gui>"#,
    ));
    factory.add_client(client(
        "spell",
        &["check"],
        r#"<gui name="spell"><MenuBar><Menu name="file"><Action name="check"/></Menu></MenuBar></gui>"#,
    ));

    assert_eq!(labels(&factory, "file"), vec!["open", "check", "share", "quit"]);
}

// ============================================================================
// Groups and action lists
// ============================================================================

const Z_FILE: &str = r#"<gui name="z"><MenuBar><Menu name="file">
    <Action name="new"/>
    <DefineGroup name="recent"/>
    <ActionList name="recentFiles" group="recent"/>
    <Action name="quit"/>
</Menu></MenuBar></gui>"#;

#[test]
fn test_action_list_plugs_at_group() {
    let mut factory = factory();
    let z = factory.add_client(client("z", &["new", "quit"], Z_FILE));
    assert_eq!(labels(&factory, "file"), vec!["new", "quit"]);
    let before = merging_value(&factory, "file", "actionlistrecentFiles");

    let recent: Vec<Action> = ["a.txt", "b.txt", "c.txt"].into_iter().map(Action::new).collect();
    assert_eq!(factory.plug_action_list(z, "recentFiles", &recent), 1);
    assert_eq!(
        labels(&factory, "file"),
        vec!["new", "a.txt", "b.txt", "c.txt", "quit"]
    );

    assert_eq!(factory.unplug_action_list(z, "recentFiles"), 1);
    assert_eq!(labels(&factory, "file"), vec!["new", "quit"]);
    assert_eq!(merging_value(&factory, "file", "actionlistrecentFiles"), before);
}

#[test]
fn test_replugging_action_list_replaces_it() {
    let mut factory = factory();
    let z = factory.add_client(client("z", &["new", "quit"], Z_FILE));

    factory.plug_action_list(z, "recentFiles", &[Action::new("a.txt"), Action::new("b.txt")]);
    factory.plug_action_list(z, "recentFiles", &[Action::new("c.txt")]);

    assert_eq!(labels(&factory, "file"), vec!["new", "c.txt", "quit"]);
}

#[test]
fn test_action_list_of_other_client_untouched() {
    let mut factory = factory();
    let z = factory.add_client(client("z", &["new", "quit"], Z_FILE));
    let other = factory.add_client(client(
        "w",
        &[],
        r#"<gui name="w"><MenuBar><Menu name="file"><ActionList name="recentFiles"/></Menu></MenuBar></gui>"#,
    ));

    factory.plug_action_list(z, "recentFiles", &[Action::new("a.txt")]);
    assert_eq!(factory.unplug_action_list(other, "recentFiles"), 0);
    assert_eq!(labels(&factory, "file"), vec!["new", "a.txt", "quit"]);
}

#[test]
fn test_grouped_items_follow_group_position() {
    let mut factory = factory();
    factory.add_client(client(
        "shell",
        &["open", "quit"],
        r#"<gui name="shell"><MenuBar><Menu name="file">
             <Action name="open"/><DefineGroup name="print"/><Action name="quit"/>
           </Menu></MenuBar></gui>"#,
    ));
    factory.add_client(client(
        "printer",
        &["print", "preview"],
        r#"<gui name="printer"><MenuBar><Menu name="file">
             <Action name="print" group="print"/><Action name="preview" group="print"/>
           </Menu></MenuBar></gui>"#,
    ));

    assert_eq!(labels(&factory, "file"), vec!["open", "print", "preview", "quit"]);
}

#[test]
fn test_removing_client_with_plugged_list() {
    let mut factory = factory();
    let z = factory.add_client(client("z", &["new", "quit"], Z_FILE));
    factory.plug_action_list(z, "recentFiles", &[Action::new("a.txt")]);

    factory.remove_client(z).unwrap();
    assert_pristine(&factory);
}

// ============================================================================
// Document merging
// ============================================================================

#[test]
fn test_no_merge_container_replaces_base() {
    let vocab = Vocabulary::default();
    let mut v = client(
        "app",
        &["cut", "copy", "paste"],
        r#"<gui name="app"><MenuBar><Menu name="edit">
             <Action name="cut"/><Action name="copy"/>
           </Menu></MenuBar></gui>"#,
    );
    let w = parse_document(
        r#"<gui name="app"><MenuBar><Menu name="edit" noMerge="1">
             <Action name="paste"/>
           </Menu></MenuBar></gui>"#,
    )
    .unwrap();

    let merged = DocumentMerger::new(&vocab, v.action_collection())
        .merge_documents(v.dom_document().unwrap().clone(), w);
    v.set_dom_document(merged, false);

    let mut factory = factory();
    factory.add_client(v);
    assert_eq!(labels(&factory, "edit"), vec!["paste"]);
}

#[test]
fn test_merged_standards_document_builds_in_base_order() {
    let mut c = GuiClient::new("editor");
    for name in ["file_open", "file_quit", "spell"] {
        c.add_action(Action::new(name));
    }
    c.set_dom_document(
        parse_document(
            r#"<gui name="standards"><MenuBar>
                 <Menu name="file"><Action name="file_open"/><Separator weakSeparator="1"/><Action name="file_quit"/></Menu>
                 <Menu name="tools"><Separator weakSeparator="1"/></Menu>
               </MenuBar></gui>"#,
        )
        .unwrap(),
        false,
    );
    c.set_xml(
        r#"<gui name="editor"><MenuBar><Menu name="tools"><Action name="spell"/></Menu></MenuBar></gui>"#,
        true,
    )
    .unwrap();

    let mut factory = factory();
    factory.add_client(c);
    assert_eq!(labels(&factory, "file"), vec!["file_open", "-", "file_quit"]);
    assert_eq!(labels(&factory, "tools"), vec!["spell"]);
}

// ============================================================================
// Container sharing
// ============================================================================

#[test]
fn test_removing_first_client_keeps_second_contiguous() {
    let mut factory = factory();
    let a = factory.add_client(client(
        "a",
        &["a1", "a2"],
        r#"<gui name="a"><MenuBar><Menu name="edit">
             <Action name="a1"/><Merge/><Action name="a2"/>
           </Menu></MenuBar></gui>"#,
    ));
    let b = factory.add_client(client(
        "b",
        &["b1", "b2"],
        r#"<gui name="b"><MenuBar><Menu name="edit">
             <Action name="b1"/><Action name="b2"/>
           </Menu></MenuBar></gui>"#,
    ));
    assert_eq!(labels(&factory, "edit"), vec!["a1", "b1", "b2", "a2"]);

    factory.remove_client(a).unwrap();
    assert_eq!(labels(&factory, "edit"), vec!["b1", "b2"]);

    factory.remove_client(b).unwrap();
    assert_pristine(&factory);
}

#[test]
fn test_shared_container_survives_one_removal() {
    let mut factory = factory();
    let doc = |name: &str, action: &str| {
        format!(
            r#"<gui name="{name}"><MenuBar><Menu name="edit"><Action name="{action}"/></Menu></MenuBar></gui>"#
        )
    };
    let a = factory.add_client(client("a", &["undo"], &doc("a", "undo")));
    let b = factory.add_client(client("b", &["redo"], &doc("b", "redo")));
    assert_eq!(factory.containers("menu").len(), 1);

    factory.remove_client(b).unwrap();
    assert_eq!(labels(&factory, "edit"), vec!["undo"]);

    factory.remove_client(a).unwrap();
    assert!(factory.container("edit", None, false).is_none());
    assert_pristine(&factory);
}

#[test]
fn test_same_name_different_tag_gets_two_nodes() {
    let mut factory = factory();
    factory.add_client(client(
        "a",
        &["x"],
        r#"<gui name="a"><Menu name="tools"><Action name="x"/></Menu></gui>"#,
    ));
    factory.add_client(client(
        "b",
        &["y"],
        r#"<gui name="b"><Menu name="tools"><Action name="y"/></Menu><ToolBar name="tools"><Action name="y"/></ToolBar></gui>"#,
    ));

    let tree = factory.tree();
    assert_eq!(tree.find_all("menu").len(), 1);
    assert_eq!(tree.find_all("toolbar").len(), 1);
    assert_eq!(factory.builder().top_level_labels(), vec!["menu:tools", "toolbar:tools"]);

    let menu = factory.container("menu", None, true).unwrap();
    assert_eq!(factory.builder().item_labels(menu), vec!["x", "y"]);
}

#[test]
fn test_container_lookup_by_creator() {
    let mut factory = factory();
    let a = factory.add_client(client(
        "a",
        &[],
        r#"<gui name="a"><ToolBar name="main"/></gui>"#,
    ));
    let b = factory.add_client(client(
        "b",
        &[],
        r#"<gui name="b"><ToolBar name="main"/></gui>"#,
    ));

    assert!(factory.container("main", Some(a), false).is_some());
    assert!(factory.container("main", Some(b), false).is_none());
}

#[test]
fn test_same_action_names_from_two_clients() {
    let x_doc = r#"<gui name="x"><MenuBar><Menu name="file">
        <Action name="a"/><Merge/><Action name="b"/>
    </Menu></MenuBar></gui>"#;
    let y_doc = r#"<gui name="y"><MenuBar><Menu name="file">
        <Action name="b"/><Action name="a"/>
    </Menu></MenuBar></gui>"#;

    let mut factory = factory();
    let x = factory.add_client(client("x", &["a", "b"], x_doc));
    let y = factory.add_client(client("y", &["a", "b"], y_doc));
    assert_eq!(labels(&factory, "file"), vec!["a", "b", "a", "b"]);

    factory.remove_client(x).unwrap();
    assert_eq!(labels(&factory, "file"), vec!["b", "a"]);
    factory.remove_client(y).unwrap();
    assert_pristine(&factory);

    let x = factory.add_client(client("x", &["a", "b"], x_doc));
    let y = factory.add_client(client("y", &["a", "b"], y_doc));
    factory.remove_client(y).unwrap();
    assert_eq!(labels(&factory, "file"), vec!["a", "b"]);
    factory.remove_client(x).unwrap();
    assert_pristine(&factory);
}

/// Display labels of the actions in the first top-level container
fn action_texts(factory: &Factory<WidgetTree>) -> Vec<String> {
    let snapshot = factory.builder().snapshot();
    snapshot.containers[0]
        .items
        .iter()
        .filter_map(|item| match item {
            ItemSnapshot::Action { label, .. } => Some(label.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_unplugging_list_keeps_same_named_document_action() {
    let mut c = GuiClient::new("c");
    c.add_action(Action::new("a").with_text("From document"));
    c.set_xml(
        r#"<gui name="c"><Menu name="file"><Action name="a"/><ActionList name="recent"/></Menu></gui>"#,
        false,
    )
    .unwrap();

    let mut factory = factory();
    let id = factory.add_client(c);
    let list = [Action::new("a").with_text("From list")];
    assert_eq!(factory.plug_action_list(id, "recent", &list), 1);
    assert_eq!(action_texts(&factory), vec!["From document", "From list"]);

    assert_eq!(factory.unplug_action_list(id, "recent"), 1);
    assert_eq!(action_texts(&factory), vec!["From document"]);

    factory.remove_client(id).unwrap();
    assert_pristine(&factory);
}

#[test]
fn test_append_position_tracks_items_after_merge_owner_leaves() {
    let mut factory = factory();
    let a = factory.add_client(client(
        "a",
        &["a1", "a2"],
        r#"<gui name="a"><Menu name="file"><Action name="a1"/><Merge/><Action name="a2"/></Menu></gui>"#,
    ));
    let b = factory.add_client(client(
        "b",
        &["b1", "b2"],
        r#"<gui name="b"><Menu name="file"><Action name="b1"/><DefineGroup name="g"/><Action name="b2"/></Menu></gui>"#,
    ));
    assert_eq!(labels(&factory, "file"), vec!["a1", "b1", "b2", "a2"]);
    assert_eq!(merging_value(&factory, "file", "groupg"), Some(3));

    factory.remove_client(a).unwrap();
    assert_eq!(labels(&factory, "file"), vec!["b1", "b2"]);

    let tree = factory.tree();
    let node = tree.find_container(tree.root(), "file", None, false).unwrap();
    let node = tree.node(node).unwrap();
    assert_eq!(node.index, 2);
    assert!(node.merging_index("<default>").is_none());
    // only the append position is kept in step with the items; the group
    // index keeps the offset it had when a2 sat behind it
    assert_eq!(merging_value(&factory, "file", "groupg"), Some(3));

    factory.remove_client(b).unwrap();
    assert_pristine(&factory);
}

/// Widget tree that records which containers it was asked to hide
#[derive(Default)]
struct HidingTree {
    tree: WidgetTree,
    hidden: Vec<WidgetId>,
}

impl ContainerBuilder for HidingTree {
    fn container_tags(&self) -> Vec<String> {
        self.tree.container_tags()
    }

    fn custom_tags(&self) -> Vec<String> {
        self.tree.custom_tags()
    }

    fn create_container(&mut self, parent: Option<WidgetId>, index: usize, element: &Element) -> Option<WidgetId> {
        self.tree.create_container(parent, index, element)
    }

    fn remove_container(&mut self, container: WidgetId, parent: Option<WidgetId>, element: Option<&mut Element>) {
        self.tree.remove_container(container, parent, element)
    }

    fn create_custom_element(&mut self, parent: WidgetId, index: usize, element: &Element) -> Option<ElementId> {
        self.tree.create_custom_element(parent, index, element)
    }

    fn remove_custom_element(&mut self, parent: WidgetId, id: ElementId) {
        self.tree.remove_custom_element(parent, id)
    }

    fn insert_action(&mut self, container: WidgetId, index: usize, action: &Action) -> Option<ActionId> {
        self.tree.insert_action(container, index, action)
    }

    fn remove_action(&mut self, container: WidgetId, id: ActionId) {
        self.tree.remove_action(container, id)
    }

    fn hide_container(&mut self, container: WidgetId) {
        self.hidden.push(container);
        self.tree.hide_container(container)
    }
}

#[test]
fn test_container_hidden_only_when_last_client_owns_it() {
    let doc = |name: &str, action: &str| {
        format!(
            r#"<gui name="{name}"><MenuBar><Menu name="edit"><Action name="{action}"/></Menu></MenuBar></gui>"#
        )
    };
    let mut factory = Factory::new(HidingTree::default(), Vocabulary::default());
    let a = factory.add_client(client("a", &["undo"], &doc("a", "undo")));
    let b = factory.add_client(client("b", &["redo"], &doc("b", "redo")));
    let edit = factory.container("edit", None, false).unwrap();

    factory.remove_client(b).unwrap();
    assert!(factory.builder().hidden.is_empty());
    assert!(!factory.builder().tree.is_hidden(edit));
    assert_eq!(factory.builder().tree.item_labels(edit), vec!["undo"]);

    factory.remove_client(a).unwrap();
    assert_eq!(factory.builder().hidden, vec![edit]);
    assert!(factory.builder().tree.is_empty());
}

// ============================================================================
// Tolerated mistakes
// ============================================================================

#[test]
fn test_missing_action_skipped() {
    let mut factory = factory();
    factory.set_strict_actions(true);
    let c = factory.add_client(client(
        "c",
        &["real"],
        r#"<gui name="c"><Menu name="m"><Action name="ghost"/><Action name="real"/></Menu></gui>"#,
    ));

    assert_eq!(labels(&factory, "m"), vec!["real"]);
    let missing = factory.missing_actions();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].client, c);
    assert_eq!(missing[0].action, "ghost");

    let tree = factory.tree();
    let node = tree.find_container(tree.root(), "m", None, false).unwrap();
    assert_eq!(tree.node(node).unwrap().index, 1);
}

#[test]
fn test_missing_actions_forgotten_with_their_client() {
    let mut factory = factory();
    factory.set_strict_actions(true);
    let c = factory.add_client(client(
        "c",
        &["real"],
        r#"<gui name="c"><Menu name="m"><Action name="ghost"/><Action name="real"/></Menu></gui>"#,
    ));
    let d = factory.add_client(client(
        "d",
        &[],
        r#"<gui name="d"><Menu name="m"><Action name="phantom"/></Menu></gui>"#,
    ));
    assert_eq!(factory.missing_actions().len(), 2);

    factory.remove_client(c).unwrap();
    let missing = factory.missing_actions();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].client, d);
    assert_eq!(missing[0].action, "phantom");

    factory.remove_client(d).unwrap();
    assert!(factory.missing_actions().is_empty());
}

#[test]
fn test_redefined_merge_point_ignored() {
    let mut factory = factory();
    factory.add_client(client(
        "c",
        &["a"],
        r#"<gui name="c"><Menu name="m"><Merge name="slot"/><Action name="a"/><Merge name="slot"/></Menu></gui>"#,
    ));

    let tree = factory.tree();
    let node = tree.find_container(tree.root(), "m", None, false).unwrap();
    let node = tree.node(node).unwrap();
    assert_eq!(node.merging_indices.len(), 1);
    assert_eq!(node.merging_indices[0].value, 0);
}

#[test]
fn test_nameless_group_ignored() {
    let mut factory = factory();
    factory.add_client(client(
        "c",
        &["a"],
        r#"<gui name="c"><Menu name="m"><DefineGroup/><ActionList/><Action name="a"/></Menu></gui>"#,
    ));

    let tree = factory.tree();
    let node = tree.find_container(tree.root(), "m", None, false).unwrap();
    assert!(tree.node(node).unwrap().merging_indices.is_empty());
    assert_eq!(labels(&factory, "m"), vec!["a"]);
}

#[test]
fn test_removing_twice_is_noop() {
    let mut factory = factory();
    let c = factory.add_client(client("c", &["a"], r#"<gui name="c"><Menu name="m"><Action name="a"/></Menu></gui>"#));
    assert!(factory.remove_client(c).is_some());
    assert!(factory.remove_client(c).is_none());
    assert_pristine(&factory);
}

// ============================================================================
// Client state
// ============================================================================

#[test]
fn test_readding_client_uses_build_document() {
    let mut factory = factory();
    let id = factory.add_client(client(
        "c",
        &["a"],
        r#"<gui name="c"><ToolBar name="main" position="top"><Action name="a"/></ToolBar></gui>"#,
    ));
    let mut c = factory.remove_client(id).unwrap();

    let mut saved = c.build_document().unwrap().clone();
    assert_eq!(
        saved.element_named("ToolBar", "main").unwrap().attribute("position"),
        Some("top")
    );
    saved.children[0].set_attribute("position", "left");
    c.set_build_document(Some(saved));

    factory.add_client(c);
    let snapshot = factory.builder().snapshot();
    assert_eq!(snapshot.containers[0].position.as_deref(), Some("left"));
}

#[test]
fn test_states_toggle_actions() {
    let mut factory = factory();
    let id = factory.add_client(client(
        "c",
        &["save", "undo"],
        r#"<gui name="c">
             <State name="modified">
               <enable><Action name="save"/></enable>
               <disable><Action name="undo"/></disable>
             </State>
           </gui>"#,
    ));

    factory.state_changed(id, "modified", ReverseStateChange::StateNoReverse);
    let actions = factory.client(id).unwrap().action_collection();
    assert!(actions.action("save").unwrap().enabled);
    assert!(!actions.action("undo").unwrap().enabled);

    factory.state_changed(id, "modified", ReverseStateChange::StateReverse);
    let actions = factory.client(id).unwrap().action_collection();
    assert!(!actions.action("save").unwrap().enabled);
    assert!(actions.action("undo").unwrap().enabled);
}

#[test]
fn test_document_shortcuts_and_schemes() {
    let mut c = GuiClient::new("c");
    c.add_action(Action::new("open").with_shortcut("Ctrl+O"));
    c.add_action(Action::new("find"));
    c.set_xml(
        r#"<gui name="c">
             <Menu name="m"><Action name="open"/><Action name="find"/></Menu>
             <ActionProperties><Action name="find" shortcut="Ctrl+F"/></ActionProperties>
           </gui>"#,
        false,
    )
    .unwrap();
    c.add_shortcut_scheme(
        "Emacs",
        parse_document(
            r#"<gui><ActionProperties scheme="Emacs"><Action name="find" shortcut="Ctrl+S"/></ActionProperties></gui>"#,
        )
        .unwrap(),
    );

    let mut factory = factory();
    let id = factory.add_client(c);
    let shortcut = |f: &Factory<WidgetTree>, name: &str| {
        f.client(id)
            .unwrap()
            .action_collection()
            .action(name)
            .unwrap()
            .shortcut
            .clone()
    };
    assert_eq!(shortcut(&factory, "find").as_deref(), Some("Ctrl+F"));
    assert_eq!(shortcut(&factory, "open").as_deref(), Some("Ctrl+O"));

    factory.change_shortcut_scheme("Emacs");
    assert_eq!(shortcut(&factory, "find").as_deref(), Some("Ctrl+S"));
    assert_eq!(shortcut(&factory, "open"), None);

    factory.change_shortcut_scheme("Default");
    assert_eq!(shortcut(&factory, "find").as_deref(), Some("Ctrl+F"));
    assert_eq!(shortcut(&factory, "open").as_deref(), Some("Ctrl+O"));
}

// ============================================================================
// Client builders
// ============================================================================

/// Builds `<Panel>` containers and records what it was asked to do
#[derive(Default)]
struct PanelBuilder {
    log: Rc<RefCell<Vec<String>>>,
    next: u64,
}

impl ContainerBuilder for PanelBuilder {
    fn container_tags(&self) -> Vec<String> {
        vec!["panel".to_string()]
    }

    fn custom_tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn create_container(&mut self, _parent: Option<WidgetId>, _index: usize, element: &Element) -> Option<WidgetId> {
        if !element.is("panel") {
            return None;
        }
        self.next += 1;
        self.log.borrow_mut().push(format!("create {}", element.attr_or_empty("name")));
        Some(WidgetId(1000 + self.next))
    }

    fn remove_container(&mut self, container: WidgetId, _parent: Option<WidgetId>, _element: Option<&mut Element>) {
        self.log.borrow_mut().push(format!("remove {}", container));
    }

    fn create_custom_element(&mut self, _parent: WidgetId, _index: usize, _element: &Element) -> Option<ElementId> {
        None
    }

    fn remove_custom_element(&mut self, _parent: WidgetId, _id: ElementId) {}

    fn insert_action(&mut self, _container: WidgetId, index: usize, action: &Action) -> Option<ActionId> {
        self.next += 1;
        self.log.borrow_mut().push(format!("insert {} at {}", action.name, index));
        Some(ActionId(2000 + self.next))
    }

    fn remove_action(&mut self, _container: WidgetId, id: ActionId) {
        self.log.borrow_mut().push(format!("unplug {}", id));
    }
}

#[test]
fn test_client_builder_handles_its_tags() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut c = client(
        "p",
        &["x"],
        r#"<gui name="p">
             <Panel name="side"><Action name="x"/></Panel>
             <MenuBar><Menu name="file"><Action name="x"/></Menu></MenuBar>
           </gui>"#,
    );
    c.set_client_builder(Box::new(PanelBuilder {
        log: log.clone(),
        next: 0,
    }));

    let mut factory = factory();
    let id = factory.add_client(c);
    assert_eq!(labels(&factory, "file"), vec!["x"]);
    assert_eq!(factory.builder().top_level_labels(), vec!["menubar:"]);
    assert_eq!(*log.borrow(), vec!["create side", "insert x at 0"]);

    let c = factory.remove_client(id).unwrap();
    assert!(c.has_client_builder());
    assert_eq!(
        *log.borrow(),
        vec!["create side", "insert x at 0", "unplug a2002", "remove w1001"]
    );
    assert_pristine(&factory);
}

#[test]
fn test_child_clients_follow_parent() {
    let mut shell = client(
        "shell",
        &["open"],
        r#"<gui name="shell"><MenuBar><Menu name="file"><Action name="open"/><Merge/></Menu></MenuBar></gui>"#,
    );
    shell.insert_child_client(client(
        "plugin",
        &["export"],
        r#"<gui name="plugin"><MenuBar><Menu name="file"><Action name="export"/></Menu></MenuBar></gui>"#,
    ));

    let mut factory = factory();
    let id = factory.add_client(shell);
    assert_eq!(labels(&factory, "file"), vec!["open", "export"]);
    assert_eq!(factory.clients().count(), 2);
    assert_eq!(factory.child_clients(id).len(), 1);

    let shell = factory.remove_client(id).unwrap();
    assert_eq!(shell.child_clients().len(), 1);
    assert_eq!(shell.child_clients()[0].component_name(), "plugin");
    assert_pristine(&factory);
}

#[test]
fn test_unknown_client_handles() {
    let mut factory = factory();
    assert!(factory.client(ClientId(7)).is_none());
    assert_eq!(factory.plug_action_list(ClientId(7), "list", &[Action::new("a")]), 0);
    factory.state_changed(ClientId(7), "busy", ReverseStateChange::StateNoReverse);
    assert_pristine(&factory);
}
