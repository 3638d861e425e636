//! File editor confined to the agent's workspace.
//!
//! Paths are resolved through a capability-scoped handle on the workspace
//! root, so `..` components and absolute paths outside the root are
//! refused. Each edit keeps the previous file contents for `undo_edit`.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde_json::Value;
use std::collections::HashMap;

/// Lines of context shown around an edit.
const SNIPPET_LINES: usize = 4;

/// Depth of a directory listing.
const MAX_LISTING_DEPTH: usize = 2;

/// Editor behind the `str_replace_editor` tool.
///
/// Supports `view`, `create`, `str_replace`, `insert` and `undo_edit`.
/// Failures are returned as messages for the model, never raised.
#[derive(Debug, Clone)]
pub struct StrReplaceEditor {
    root: Utf8PathBuf,
    history: HashMap<Utf8PathBuf, Vec<String>>,
}

type EditorResult = Result<String, String>;

impl StrReplaceEditor {
    /// Creates an editor over `root`. The directory is created on first use.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            history: HashMap::new(),
        }
    }

    /// Runs one editor command described by `arguments`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the failure: a missing parameter, a path
    /// outside the workspace, an ambiguous replacement, or an I/O error.
    pub fn execute(&mut self, arguments: &Value) -> EditorResult {
        let command = required_str(arguments, "command")?;
        let shown = required_str(arguments, "path")?;
        let relative = self.resolve(shown)?;
        let dir = self.open_root()?;

        match command {
            "view" => view(&dir, shown, &relative, arguments.get("view_range")),
            "create" => create(&dir, shown, &relative, required_str(arguments, "file_text")?),
            "str_replace" => {
                let old = required_str(arguments, "old_str")?;
                let new = optional_str(arguments, "new_str").unwrap_or_default();
                self.str_replace(&dir, shown, relative, old, new)
            }
            "insert" => {
                let line = arguments
                    .get("insert_line")
                    .and_then(Value::as_u64)
                    .and_then(|value| usize::try_from(value).ok())
                    .ok_or_else(|| "Parameter `insert_line` is required for command: insert".to_owned())?;
                let text = required_str(arguments, "new_str")?;
                self.insert(&dir, shown, relative, line, text)
            }
            "undo_edit" => self.undo(&dir, shown, &relative),
            other => Err(format!(
                "Unrecognized command {other}. The allowed commands are: view, create, \
                 str_replace, insert, undo_edit"
            )),
        }
    }

    fn resolve(&self, path: &str) -> Result<Utf8PathBuf, String> {
        let requested = Utf8Path::new(path.trim());
        let relative = if requested.is_absolute() {
            requested
                .strip_prefix(&self.root)
                .map_err(|_| format!("The path {path} is outside the workspace {}", self.root))?
        } else {
            requested
        };
        if relative.as_str().is_empty() {
            Ok(Utf8PathBuf::from("."))
        } else {
            Ok(relative.to_owned())
        }
    }

    fn open_root(&self) -> Result<Dir, String> {
        Dir::create_ambient_dir_all(&self.root, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(&self.root, ambient_authority()))
            .map_err(|err| format!("Cannot open workspace {}: {err}", self.root))
    }

    fn str_replace(
        &mut self,
        dir: &Dir,
        shown: &str,
        relative: Utf8PathBuf,
        old: &str,
        new: &str,
    ) -> EditorResult {
        if old.is_empty() {
            return Err("Parameter `old_str` must not be empty for command: str_replace".to_owned());
        }
        let content = read(dir, shown, &relative)?;
        let positions: Vec<usize> = content.match_indices(old).map(|(index, _)| index).collect();

        match positions.as_slice() {
            [] => Err(format!(
                "No replacement was performed, old_str `{old}` did not appear verbatim in {shown}."
            )),
            [index] => {
                let line = line_of(&content, *index);
                let updated = content.replacen(old, new, 1);
                write(dir, shown, &relative, &updated)?;
                let excerpt = snippet(&updated, line, new.matches('\n').count());
                self.history.entry(relative).or_default().push(content);
                Ok(edited(shown, &excerpt))
            }
            many => {
                let lines: Vec<String> = many
                    .iter()
                    .map(|index| line_of(&content, *index).to_string())
                    .collect();
                Err(format!(
                    "No replacement was performed. Multiple occurrences of old_str `{old}` in \
                     lines [{}]. Please ensure it is unique",
                    lines.join(", ")
                ))
            }
        }
    }

    fn insert(
        &mut self,
        dir: &Dir,
        shown: &str,
        relative: Utf8PathBuf,
        after_line: usize,
        text: &str,
    ) -> EditorResult {
        let content = read(dir, shown, &relative)?;
        let lines: Vec<&str> = content.lines().collect();
        if after_line > lines.len() {
            return Err(format!(
                "Invalid `insert_line` parameter: {after_line}. It should be within the range of \
                 lines of the file: [0, {}]",
                lines.len()
            ));
        }

        let mut merged: Vec<&str> = lines.iter().copied().take(after_line).collect();
        merged.extend(text.lines());
        merged.extend(lines.iter().copied().skip(after_line));
        let mut updated = merged.join("\n");
        if content.is_empty() || content.ends_with('\n') {
            updated.push('\n');
        }

        write(dir, shown, &relative, &updated)?;
        let excerpt = snippet(
            &updated,
            after_line + 1,
            text.lines().count().saturating_sub(1),
        );
        self.history.entry(relative).or_default().push(content);
        Ok(edited(shown, &excerpt))
    }

    fn undo(&mut self, dir: &Dir, shown: &str, relative: &Utf8Path) -> EditorResult {
        let previous = self
            .history
            .get_mut(relative)
            .and_then(Vec::pop)
            .ok_or_else(|| format!("No edit history found for {shown}."))?;
        write(dir, shown, relative, &previous)?;
        Ok(format!(
            "Last edit to {shown} undone successfully. Here's the result of running `cat -n` on \
             {shown}:\n{}\n",
            numbered(previous.lines(), 1)
        ))
    }
}

fn view(dir: &Dir, shown: &str, relative: &Utf8Path, range: Option<&Value>) -> EditorResult {
    if dir.is_dir(relative) {
        if range.is_some() {
            return Err(
                "The `view_range` parameter is not allowed when `path` points to a directory."
                    .to_owned(),
            );
        }
        let mut entries = Vec::new();
        list_entries(dir, relative, 1, &mut entries)?;
        entries.sort();
        return Ok(format!(
            "Here's the files and directories up to {MAX_LISTING_DEPTH} levels deep in {shown}, \
             excluding hidden items:\n{}\n",
            entries.join("\n")
        ));
    }

    let content = read(dir, shown, relative)?;
    let lines: Vec<&str> = content.lines().collect();
    let (first, last) = match range {
        Some(value) => parse_range(value, lines.len())?,
        None => (1, lines.len()),
    };
    let shown_lines = lines
        .iter()
        .copied()
        .skip(first - 1)
        .take((last + 1).saturating_sub(first));
    Ok(format!(
        "Here's the result of running `cat -n` on {shown}:\n{}\n",
        numbered(shown_lines, first)
    ))
}

fn create(dir: &Dir, shown: &str, relative: &Utf8Path, text: &str) -> EditorResult {
    if dir.exists(relative) {
        return Err(format!(
            "File already exists at: {shown}. Cannot overwrite files using command `create`."
        ));
    }
    if let Some(parent) = relative.parent().filter(|parent| !parent.as_str().is_empty()) {
        dir.create_dir_all(parent)
            .map_err(|err| format!("Failed to create directories for {shown}: {err}"))?;
    }
    write(dir, shown, relative, text)?;
    Ok(format!("File created successfully at: {shown}"))
}

fn list_entries(
    dir: &Dir,
    relative: &Utf8Path,
    depth: usize,
    out: &mut Vec<String>,
) -> Result<(), String> {
    let listing = |err: std::io::Error| format!("Failed to list {relative}: {err}");
    for item in dir.read_dir(relative).map_err(listing)? {
        let entry = item.map_err(listing)?;
        let name = entry.file_name().map_err(listing)?;
        if name.starts_with('.') {
            continue;
        }
        let child = if relative == Utf8Path::new(".") {
            Utf8PathBuf::from(name)
        } else {
            relative.join(name)
        };
        let is_dir = entry.file_type().map_err(listing)?.is_dir();
        if is_dir {
            out.push(format!("{child}/"));
            if depth < MAX_LISTING_DEPTH {
                list_entries(dir, &child, depth + 1, out)?;
            }
        } else {
            out.push(child.into_string());
        }
    }
    Ok(())
}

fn parse_range(value: &Value, total: usize) -> Result<(usize, usize), String> {
    let invalid = || "Invalid `view_range`. It should be a list of two integers.".to_owned();
    let bounds = value.as_array().ok_or_else(invalid)?;
    let [low, high] = bounds.as_slice() else {
        return Err(invalid());
    };
    let (Some(start), Some(end)) = (low.as_i64(), high.as_i64()) else {
        return Err(invalid());
    };

    let first = usize::try_from(start)
        .ok()
        .filter(|line| (1..=total).contains(line))
        .ok_or_else(|| {
            format!(
                "Invalid `view_range`: [{start}, {end}]. Its first element `{start}` should be \
                 within the range of lines of the file: [1, {total}]"
            )
        })?;
    if end == -1 {
        return Ok((first, total));
    }
    let last = usize::try_from(end)
        .ok()
        .filter(|line| (first..=total).contains(line))
        .ok_or_else(|| {
            format!(
                "Invalid `view_range`: [{start}, {end}]. Its second element `{end}` should be \
                 -1 or within [{first}, {total}]"
            )
        })?;
    Ok((first, last))
}

fn read(dir: &Dir, shown: &str, relative: &Utf8Path) -> Result<String, String> {
    dir.read_to_string(relative)
        .map_err(|err| format!("Failed to read {shown}: {err}"))
}

fn write(dir: &Dir, shown: &str, relative: &Utf8Path, contents: &str) -> Result<(), String> {
    dir.write(relative, contents)
        .map_err(|err| format!("Failed to write {shown}: {err}"))
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, String> {
    optional_str(arguments, key).ok_or_else(|| format!("Parameter `{key}` is required"))
}

fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

/// 1-based line number of byte offset `index`.
fn line_of(content: &str, index: usize) -> usize {
    content
        .get(..index)
        .map_or(0, |prefix| prefix.matches('\n').count())
        + 1
}

fn snippet(content: &str, line: usize, added_lines: usize) -> String {
    let first = line.saturating_sub(SNIPPET_LINES).max(1);
    let last = line + added_lines + SNIPPET_LINES;
    numbered(
        content.lines().skip(first - 1).take(last + 1 - first),
        first,
    )
}

fn numbered<'a>(lines: impl Iterator<Item = &'a str>, first: usize) -> String {
    lines
        .enumerate()
        .map(|(offset, line)| format!("{:>6}\t{line}", first + offset))
        .collect::<Vec<_>>()
        .join("\n")
}

fn edited(shown: &str, excerpt: &str) -> String {
    format!(
        "The file {shown} has been edited. Here's the result of running `cat -n` on a snippet of \
         {shown}:\n{excerpt}\nReview the changes and make sure they are as expected. Edit the \
         file again if necessary."
    )
}
