use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use simple_agent_model::ModelTool;

use crate::tool::ToolObject;

/// Holds the toolset of an agent and resolves requests by name.
///
/// Names are unique within one registry; the duplicate check happens
/// when the registry is built, so lookups during a run cannot collide.
pub(crate) struct Registry {
    tools: Vec<Arc<dyn ToolObject>>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Builds a registry, rejecting duplicate tool names.
    ///
    /// Returns the offending name on conflict.
    pub fn with_tools(
        tools: Vec<Arc<dyn ToolObject>>,
    ) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            let name = tool.name();
            if index.insert(name.to_owned(), i).is_some() {
                return Err(name.to_owned());
            }
        }
        Ok(Self { tools, index })
    }

    /// Returns the tool definitions, in registration order.
    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .iter()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Looks up a tool by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolObject>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{FunctionTool, ToolObjectImpl};

    fn named_tool(name: &str) -> Arc<dyn ToolObject> {
        Arc::new(ToolObjectImpl(FunctionTool::new(
            name,
            "A test tool",
            json!({ "type": "object", "properties": {} }),
            |_: Value| ready(Ok("success".to_owned())),
        )))
    }

    #[test]
    fn test_lookup_and_definitions() {
        let registry =
            Registry::with_tools(vec![named_tool("a"), named_tool("b")])
                .unwrap();

        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());

        let definitions = registry.definitions();
        let names: Vec<_> =
            definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err =
            Registry::with_tools(vec![named_tool("dup"), named_tool("dup")])
                .unwrap_err();
        assert_eq!(err, "dup");
    }
}
