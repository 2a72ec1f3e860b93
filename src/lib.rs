//! xmlgui - XML-driven GUI composition
//!
//! Applications, plugins and embedded components each describe their part of
//! a GUI in an XML document. This crate merges those documents into one tree
//! of menus and toolbars and takes a client's contribution back out again
//! without disturbing the others.
//!
//! # Architecture
//!
//! The composition pipeline consists of:
//! 1. **Documents** - Parse GUI documents, pick the newest of the installed
//!    and local copies, merge them over a standards base
//! 2. **Clients** - Bundle a document with its actions, states and shortcut
//!    schemes
//! 3. **Factory** - Build every client into a shared container tree through
//!    named merge points, and tear clients down again
//! 4. **Builders** - Turn container requests into widgets
//! 5. **Reporting** - Print the composed GUI
//!
//! ```
//! use xmlgui::builder::WidgetTree;
//! use xmlgui::client::{Action, GuiClient};
//! use xmlgui::config::Vocabulary;
//! use xmlgui::factory::Factory;
//!
//! let mut shell = GuiClient::new("shell");
//! shell.add_action(Action::new("open"));
//! shell.add_action(Action::new("quit"));
//! shell
//!     .set_xml(
//!         r#"<gui name="shell"><MenuBar><Menu name="file">
//!              <Action name="open"/><Merge/><Action name="quit"/>
//!            </Menu></MenuBar></gui>"#,
//!         false,
//!     )
//!     .unwrap();
//!
//! let mut part = GuiClient::new("part");
//! part.add_action(Action::new("print"));
//! part.set_xml(
//!     r#"<gui name="part"><MenuBar><Menu name="file"><Action name="print"/></Menu></MenuBar></gui>"#,
//!     false,
//! )
//! .unwrap();
//!
//! let mut factory = Factory::new(WidgetTree::new(), Vocabulary::default());
//! factory.add_client(shell);
//! let part = factory.add_client(part);
//!
//! let file = factory.container("file", None, false).unwrap();
//! assert_eq!(factory.builder().item_labels(file), vec!["open", "print", "quit"]);
//!
//! factory.remove_client(part);
//! assert_eq!(factory.builder().item_labels(file), vec!["open", "quit"]);
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod document;
pub mod dom;
pub mod factory;
pub mod report;
pub mod watch;

pub use builder::{ContainerBuilder, WidgetTree};
pub use client::{Action, ActionCollection, GuiClient, ReverseStateChange};
pub use config::{Config, Vocabulary};
pub use dom::{parse_document, DocumentError, Element};
pub use factory::{ClientId, Factory, FactoryObserver};
pub use report::{ReportFormat, Reporter};
