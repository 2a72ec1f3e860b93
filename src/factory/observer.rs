// Factory observers

use super::ClientId;
use crate::client::GuiClient;
use tracing::{debug, info};

/// Notified around client additions and removals.
///
/// `making_changes(true)` is sent before the outermost add or remove starts
/// and `making_changes(false)` after it has finished, child clients included.
pub trait FactoryObserver {
    fn client_added(&mut self, _id: ClientId, _client: &GuiClient) {}

    fn client_removed(&mut self, _id: ClientId, _client: &GuiClient) {}

    fn making_changes(&mut self, _changing: bool) {}
}

/// Logs every notification
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl FactoryObserver for LoggingObserver {
    fn client_added(&mut self, id: ClientId, client: &GuiClient) {
        info!(
            "Added client {} ({}) as {}",
            client.component_name(),
            client.client_name(),
            id
        );
    }

    fn client_removed(&mut self, id: ClientId, client: &GuiClient) {
        info!(
            "Removed client {} ({}), was {}",
            client.component_name(),
            client.client_name(),
            id
        );
    }

    fn making_changes(&mut self, changing: bool) {
        if changing {
            debug!("GUI rebuild started");
        } else {
            debug!("GUI rebuild finished");
        }
    }
}
