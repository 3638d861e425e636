//! Ordered, name-unique tool collection.

use super::{SystemId, ToolDefinition};

/// Ordered set of tool definitions keyed by exposed name.
///
/// Insertion order is preserved and the first definition registered under a
/// name wins; later duplicates are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCollection {
    tools: Vec<ToolDefinition>,
}

impl ToolCollection {
    /// Creates a collection from `tools`, dropping duplicate names.
    #[must_use]
    pub fn new(tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        let mut collection = Self::default();
        collection.add_tools(tools);
        collection
    }

    /// Adds a tool unless its name is already taken.
    ///
    /// Returns `false` when the tool was skipped as a duplicate.
    pub fn add_tool(&mut self, tool: ToolDefinition) -> bool {
        if self.contains(tool.name()) {
            return false;
        }
        self.tools.push(tool);
        true
    }

    /// Adds every tool in order and returns the names skipped as duplicates.
    pub fn add_tools(&mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Vec<String> {
        tools
            .into_iter()
            .filter_map(|tool| {
                let name = tool.name().to_owned();
                (!self.add_tool(tool)).then_some(name)
            })
            .collect()
    }

    /// Keeps only base tools, dropping everything contributed by connections.
    pub fn retain_local(&mut self) {
        self.tools.retain(ToolDefinition::is_local);
    }

    /// Returns the tool registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Returns whether a tool is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the exposed names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    /// Returns the tools attributed to `server_id`.
    #[must_use]
    pub fn remote_tools_for(&self, server_id: &SystemId) -> Vec<&ToolDefinition> {
        self.tools
            .iter()
            .filter(|tool| tool.server_id() == Some(server_id))
            .collect()
    }

    /// Iterates over tools in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    /// Returns the number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns an owned copy of every definition.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ToolDefinition> {
        self.tools.clone()
    }
}

impl<'a> IntoIterator for &'a ToolCollection {
    type Item = &'a ToolDefinition;
    type IntoIter = std::slice::Iter<'a, ToolDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}
