// Recognised tag and attribute names
//
// Tag names are compared case-insensitively, attribute names exactly.

use serde::{Deserialize, Serialize};

/// The names the merge engine and the document merger recognise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub tag_action: String,
    pub tag_merge: String,
    pub tag_define_group: String,
    pub tag_action_list: String,
    pub tag_state: String,
    pub tag_enable: String,
    pub tag_disable: String,
    pub tag_text: String,
    pub tag_separator: String,
    pub tag_merge_local: String,
    pub tag_action_properties: String,

    pub attr_name: String,
    pub attr_group: String,
    pub attr_append: String,
    pub attr_no_merge: String,
    pub attr_weak_separator: String,
    pub attr_scheme: String,
    pub attr_version: String,

    /// Merging name of an unnamed `<Merge/>`
    pub default_merging_name: String,

    /// Prefix of merging names created by `<DefineGroup>`
    pub group_prefix: String,

    /// Prefix of merging names created by `<ActionList>`
    pub action_list_prefix: String,

    /// Scheme name used when none is configured
    pub default_scheme: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            tag_action: "action".to_string(),
            tag_merge: "merge".to_string(),
            tag_define_group: "definegroup".to_string(),
            tag_action_list: "actionlist".to_string(),
            tag_state: "state".to_string(),
            tag_enable: "enable".to_string(),
            tag_disable: "disable".to_string(),
            tag_text: "text".to_string(),
            tag_separator: "separator".to_string(),
            tag_merge_local: "mergelocal".to_string(),
            tag_action_properties: "ActionProperties".to_string(),
            attr_name: "name".to_string(),
            attr_group: "group".to_string(),
            attr_append: "append".to_string(),
            attr_no_merge: "noMerge".to_string(),
            attr_weak_separator: "weakSeparator".to_string(),
            attr_scheme: "scheme".to_string(),
            attr_version: "version".to_string(),
            default_merging_name: "<default>".to_string(),
            group_prefix: "group".to_string(),
            action_list_prefix: "actionlist".to_string(),
            default_scheme: "Default".to_string(),
        }
    }
}

impl Vocabulary {
    /// Merging name for a `group` attribute value, empty when there is no group
    pub fn group_merging_name(&self, group: &str) -> String {
        if group.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.group_prefix, group)
        }
    }

    pub fn action_list_merging_name(&self, list: &str) -> String {
        format!("{}{}", self.action_list_prefix, list)
    }

    /// Action list name behind a merging name, if it is one
    pub fn action_list_name<'a>(&self, merging_name: &'a str) -> Option<&'a str> {
        merging_name.strip_prefix(self.action_list_prefix.as_str())
    }
}
