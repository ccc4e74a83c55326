//! Shell command construction with per-value quoting.
//!
//! Commands sent to a target are assembled from two kinds of pieces:
//! - Template text (`&'static str`) written into the source, kept verbatim
//! - Values (service names, package names, paths) that are always quoted
//!
//! Values never reach the rendered string unquoted, so a service called
//! `web; rm -rf /` cannot break out of its argument position. Rendering is
//! deferred until the target's shell flavor is known.

use std::fmt;

use crate::core::error::ExecError;

/// The quoting rules of the shell on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellFlavor {
    /// POSIX `sh` and compatible shells.
    #[default]
    Posix,
    /// Windows `cmd.exe` / PowerShell.
    Windows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Raw(&'static str),
    Value(String),
}

/// A command line built from template text and quoted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    parts: Vec<Part>,
}

impl ShellCommand {
    /// Start a command with template text, e.g. `"launchctl kickstart"`.
    pub fn new(template: &'static str) -> Self {
        ShellCommand {
            parts: vec![Part::Raw(template)],
        }
    }

    /// Append more template text (flags, pipes, redirects).
    pub fn raw(mut self, template: &'static str) -> Self {
        self.parts.push(Part::Raw(template));
        self
    }

    /// Append a single value; it will be quoted when rendered.
    pub fn arg(mut self, value: impl AsRef<str>) -> Self {
        self.parts.push(Part::Value(value.as_ref().to_string()));
        self
    }

    /// Append several values.
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parts
            .extend(values.into_iter().map(|v| Part::Value(v.as_ref().to_string())));
        self
    }

    /// Render for the given shell flavor.
    pub fn render(&self, flavor: ShellFlavor) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let piece = match part {
                Part::Raw(text) => (*text).to_string(),
                Part::Value(value) => quote(value, flavor),
            };
            if piece.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&piece);
        }
        out
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(ShellFlavor::Posix))
    }
}

fn is_safe(c: char, flavor: ShellFlavor) -> bool {
    if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '+') {
        return true;
    }
    match flavor {
        ShellFlavor::Posix => matches!(c, '%' | ',' | '='),
        // cmd expands `%VAR%` and splits arguments on `,` and `=`.
        ShellFlavor::Windows => c == '\\',
    }
}

/// Quote a single value for the given shell.
///
/// Values made only of characters that are inert in that shell are
/// returned unchanged; everything else is wrapped.
pub fn quote(value: &str, flavor: ShellFlavor) -> String {
    if !value.is_empty() && value.chars().all(|c| is_safe(c, flavor)) {
        return value.to_string();
    }

    match flavor {
        ShellFlavor::Posix => format!("'{}'", value.replace('\'', r#"'"'"'"#)),
        ShellFlavor::Windows => {
            // cmd expands `%` even inside double quotes, so every `%` is
            // emitted between quoted runs with a caret escape.
            let escaped = value.replace('"', "\"\"").replace('%', "\"^%\"");
            format!("\"{}\"", escaped)
        }
    }
}

/// Reject a value that a tool would read as an option instead of an operand.
pub fn check_operand(value: &str) -> Result<(), ExecError> {
    if value.is_empty() {
        return Err(invalid_name(value, "must not be empty"));
    }
    if value.starts_with('-') {
        return Err(invalid_name(value, "must not start with `-`"));
    }
    Ok(())
}

/// Like [`check_operand`], and also require a single path component.
///
/// Service names end up inside paths such as `/etc/init.d/<name>`.
pub fn check_path_component(value: &str) -> Result<(), ExecError> {
    check_operand(value)?;
    if value.contains(['/', '\\']) {
        return Err(invalid_name(value, "must not contain a path separator"));
    }
    if value == "." || value == ".." {
        return Err(invalid_name(value, "must not be `.` or `..`"));
    }
    Ok(())
}

fn invalid_name(value: &str, reason: &'static str) -> ExecError {
    ExecError::InvalidName {
        name: value.to_string(),
        reason,
    }
}
