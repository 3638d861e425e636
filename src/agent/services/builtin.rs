//! Base tools executed in-process by the agent runtime.

use super::editor::StrReplaceEditor;
use crate::tool_registry::domain::{ToolDefinition, ToolRegistryDomainError};
use serde_json::{Value, json};

/// Name of the tool that ends an interaction.
pub const TERMINATE_TOOL_NAME: &str = "terminate";

/// Name of the workspace file editor tool.
pub const STR_REPLACE_EDITOR_TOOL_NAME: &str = "str_replace_editor";

const TERMINATE_DESCRIPTION: &str = "Terminate the interaction when the request is met OR if \
the assistant cannot proceed further with the task. When you have finished all the tasks, \
call this tool to end the work.";

/// Builds the `terminate` base tool definition.
///
/// # Errors
///
/// Returns [`ToolRegistryDomainError`] if the definition fails validation.
pub fn terminate_tool() -> Result<ToolDefinition, ToolRegistryDomainError> {
    ToolDefinition::local(
        TERMINATE_TOOL_NAME,
        TERMINATE_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "description": "The finish status of the interaction.",
                    "enum": ["success", "failure"]
                }
            },
            "required": ["status"]
        }),
    )
}

const STR_REPLACE_EDITOR_DESCRIPTION: &str = "Custom editing tool for viewing, creating and \
editing files in the working directory.
* State is persistent across command calls and discussions with the user
* Paths are relative to the working directory; absolute paths must stay inside it
* If `path` is a file, `view` displays the result of applying `cat -n`. If `path` is a \
directory, `view` lists non-hidden files and directories up to 2 levels deep
* The `create` command cannot be used if the specified `path` already exists as a file
* The `undo_edit` command will revert the last edit made to the file at `path`

Notes for using the `str_replace` command:
* The `old_str` parameter should match EXACTLY one or more consecutive lines from the \
original file. Be mindful of whitespaces!
* If the `old_str` parameter is not unique in the file, the replacement will not be \
performed. Include enough context in `old_str` to make it unique
* The `new_str` parameter should contain the edited lines that should replace the `old_str`";

/// Builds the `str_replace_editor` base tool definition.
///
/// # Errors
///
/// Returns [`ToolRegistryDomainError`] if the definition fails validation.
pub fn str_replace_editor_tool() -> Result<ToolDefinition, ToolRegistryDomainError> {
    ToolDefinition::local(
        STR_REPLACE_EDITOR_TOOL_NAME,
        STR_REPLACE_EDITOR_DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "description": "The commands to run. Allowed options are: `view`, `create`, `str_replace`, `insert`, `undo_edit`.",
                    "enum": ["view", "create", "str_replace", "insert", "undo_edit"],
                    "type": "string"
                },
                "path": {
                    "description": "Path to file or directory, relative to the working directory.",
                    "type": "string"
                },
                "file_text": {
                    "description": "Required parameter of `create` command, with the content of the file to be created.",
                    "type": "string"
                },
                "old_str": {
                    "description": "Required parameter of `str_replace` command containing the string in `path` to replace.",
                    "type": "string"
                },
                "new_str": {
                    "description": "Optional parameter of `str_replace` command containing the new string. Required parameter of `insert` command containing the string to insert.",
                    "type": "string"
                },
                "insert_line": {
                    "description": "Required parameter of `insert` command. The `new_str` will be inserted AFTER the line `insert_line` of `path`.",
                    "type": "integer"
                },
                "view_range": {
                    "description": "Optional parameter of `view` command when `path` points to a file. `[start_line, -1]` shows all lines from `start_line` to the end.",
                    "items": {"type": "integer"},
                    "type": "array"
                }
            },
            "required": ["command", "path"]
        }),
    )
}

/// In-process implementations of the base tools.
///
/// `terminate` is always available; the file editor only once attached with
/// [`LocalTools::with_editor`].
#[derive(Debug, Clone, Default)]
pub struct LocalTools {
    editor: Option<StrReplaceEditor>,
}

impl LocalTools {
    /// Creates the base tools with `terminate` only.
    #[must_use]
    pub const fn new() -> Self {
        Self { editor: None }
    }

    /// Attaches the workspace file editor.
    #[must_use]
    pub fn with_editor(mut self, editor: StrReplaceEditor) -> Self {
        self.editor = Some(editor);
        self
    }

    /// Returns the definitions of the tools this set can run.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] if a definition fails validation.
    pub fn definitions(&self) -> Result<Vec<ToolDefinition>, ToolRegistryDomainError> {
        let mut definitions = Vec::with_capacity(2);
        if self.editor.is_some() {
            definitions.push(str_replace_editor_tool()?);
        }
        definitions.push(terminate_tool()?);
        Ok(definitions)
    }

    /// Runs the base tool `name` with parsed `arguments`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for unknown tools or invalid
    /// arguments.
    pub fn execute(&mut self, name: &str, arguments: &Value) -> Result<String, String> {
        match (name, self.editor.as_mut()) {
            (TERMINATE_TOOL_NAME, _) => terminate(arguments),
            (STR_REPLACE_EDITOR_TOOL_NAME, Some(editor)) => editor.execute(arguments),
            (other, _) => Err(format!("no local implementation for tool '{other}'")),
        }
    }
}

fn terminate(arguments: &Value) -> Result<String, String> {
    let status = arguments
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing required argument 'status'".to_owned())?;

    match status {
        "success" | "failure" => Ok(format!(
            "The interaction has been completed with status: {status}"
        )),
        other => Err(format!(
            "invalid status '{other}', expected 'success' or 'failure'"
        )),
    }
}
