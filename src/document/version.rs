// Document version selection
//
// A GUI document may exist both as the installed file and as a user-modified
// local copy. The copy with the highest `version` on its root element wins;
// when the installed file wins, the user's action properties (shortcuts) are
// carried over from the local copy so upgrades do not lose them.

use super::properties::action_properties_elements;
use crate::config::Vocabulary;
use crate::dom::{parse_document, to_xml_string, DocumentError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// The selected document file and its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    pub path: PathBuf,
    pub contents: String,
    pub version: u32,
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"))
}

fn root_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[A-Za-z_][^>]*>").expect("valid tag pattern"))
}

fn version_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\sversion\s*=\s*["']([^"']*)["']"#).expect("valid attribute pattern")
    })
}

/// Version number declared on the root element, without parsing the document
pub fn version_of(xml: &str) -> Option<u32> {
    let stripped = comment_regex().replace_all(xml, "");
    let root = root_tag_regex().find(&stripped)?;
    let caps = version_attr_regex().captures(root.as_str())?;
    caps.get(1)?.as_str().trim().parse().ok()
}

/// Pick the most recent of `files`.
///
/// Missing files are skipped. Files without a version count as version 0 and
/// ties go to the earlier file, so list the local copy first. If `local` is
/// given and loses, its action properties are merged into the winner.
pub fn find_most_recent(
    files: &[PathBuf],
    local: Option<&Path>,
    vocab: &Vocabulary,
) -> Result<Option<VersionedDocument>, DocumentError> {
    let mut candidates = Vec::new();
    for path in files {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let version = version_of(&contents).unwrap_or(0);
                debug!("{} has version {}", path.display(), version);
                candidates.push(VersionedDocument {
                    path: path.clone(),
                    contents,
                    version,
                });
            }
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    let mut best: Option<VersionedDocument> = None;
    let mut local_doc: Option<VersionedDocument> = None;
    for candidate in candidates {
        if local.is_some_and(|l| l == candidate.path.as_path()) {
            local_doc = Some(candidate.clone());
        }
        match &best {
            Some(current) if current.version >= candidate.version => {}
            _ => best = Some(candidate),
        }
    }

    let Some(mut best) = best else {
        return Ok(None);
    };

    if let Some(local_doc) = local_doc.filter(|l| l.path != best.path) {
        debug!(
            "Installed {} (v{}) supersedes local copy (v{})",
            best.path.display(),
            best.version,
            local_doc.version
        );
        match carry_action_properties(&local_doc.contents, &best.contents, vocab) {
            Ok(Some(merged)) => best.contents = merged,
            Ok(None) => {}
            Err(e) => warn!("Could not keep local action properties: {}", e),
        }
    }

    Ok(Some(best))
}

/// Copy every `ActionProperties` block of `local` into `installed`, replacing
/// blocks for the same scheme. Returns None when there is nothing to copy.
fn carry_action_properties(
    local: &str,
    installed: &str,
    vocab: &Vocabulary,
) -> Result<Option<String>, DocumentError> {
    let local = parse_document(local)?;
    let blocks: Vec<_> = action_properties_elements(&local, vocab).cloned().collect();
    if blocks.is_empty() {
        return Ok(None);
    }

    let mut installed = parse_document(installed)?;
    for block in blocks {
        let scheme = block
            .attribute(&vocab.attr_scheme)
            .unwrap_or(vocab.default_scheme.as_str())
            .to_string();
        installed.children.retain(|c| {
            !(c.is(&vocab.tag_action_properties)
                && c.attribute(&vocab.attr_scheme).unwrap_or(vocab.default_scheme.as_str()) == scheme)
        });
        installed.children.push(block);
    }

    to_xml_string(&installed).map(Some)
}
