mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::builder::{WidgetSnapshot, WidgetTree};
use crate::client::GuiClient;
use crate::factory::{ClientId, Factory, MissingAction};
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// One client as it stands in a composed GUI
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: ClientId,
    pub component: String,
    pub name: String,
    pub actions: usize,
    pub children: usize,
}

impl ClientSummary {
    fn new(id: ClientId, client: &GuiClient, children: usize) -> Self {
        Self {
            id,
            component: client.component_name().to_string(),
            name: client.client_name().to_string(),
            actions: client.action_collection().len(),
            children,
        }
    }
}

/// Everything a report shows about a composed GUI
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub clients: Vec<ClientSummary>,
    pub shortcut_scheme: String,
    pub widgets: WidgetSnapshot,
    pub missing_actions: Vec<MissingAction>,
}

impl Composition {
    pub fn from_factory(factory: &Factory<WidgetTree>) -> Self {
        Self {
            clients: factory
                .clients()
                .map(|(id, client)| ClientSummary::new(id, client, factory.child_clients(id).len()))
                .collect(),
            shortcut_scheme: factory.shortcut_scheme().to_string(),
            widgets: factory.builder().snapshot(),
            missing_actions: factory.missing_actions().to_vec(),
        }
    }
}

/// Reporter for printing composed GUIs
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    pub fn report(&self, composition: &Composition) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(composition),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(composition),
        }
    }
}
