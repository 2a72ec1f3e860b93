//! Document preparation before building
//!
//! - [`merge`]: base/additive merging and weak separator normalization
//! - [`version`]: choosing between the installed and the local document
//! - [`properties`]: `ActionProperties` blocks and shortcut schemes

pub mod merge;
pub mod properties;
pub mod version;

pub use merge::{find_matching_element, DocumentMerger};
pub use properties::{
    action_properties_element, apply_action_properties, configure_action, find_action_by_name,
    find_action_properties,
};
pub use version::{find_most_recent, version_of, VersionedDocument};
