//! Line-oriented page script: one user interaction per line.

use anyhow::bail;
use filter_core::ClickTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    All,
    Table,
    Filters,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Open { group: String },
    Toggle { group: String, value: String },
    Click { group: String, value: String, target: ClickTarget },
    SelectAll { group: String, checked: bool },
    Close,
    Apply,
    Reset,
    Sort { column: String },
    Render { target: RenderTarget },
    Status,
    Refresh,
    Quit,
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
///
/// Option values and sort columns take the rest of the line after a single space, so inner
/// whitespace is kept as written.
pub fn parse_command(line: &str) -> anyhow::Result<Option<PageCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = split_word(line);
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match name {
        "open" => PageCommand::Open {
            group: single_arg(name, &args)?,
        },
        "toggle" => {
            let (group, value) = group_and_rest(name, rest)?;
            PageCommand::Toggle { group, value }
        }
        "click" => {
            let (target, remainder) = match split_word(rest) {
                ("input", remainder) => (ClickTarget::Input, remainder),
                ("label", remainder) => (ClickTarget::Label, remainder),
                ("row", remainder) => (ClickTarget::Row, remainder),
                _ => (ClickTarget::Input, rest),
            };
            let (group, value) = group_and_rest(name, remainder)?;
            PageCommand::Click { group, value, target }
        }
        "select-all" => match args.as_slice() {
            [group, "on"] => PageCommand::SelectAll {
                group: group.to_string(),
                checked: true,
            },
            [group, "off"] => PageCommand::SelectAll {
                group: group.to_string(),
                checked: false,
            },
            _ => bail!("usage: select-all <group> on|off"),
        },
        "close" if args.is_empty() => PageCommand::Close,
        "close" => bail!("usage: close"),
        "apply" => PageCommand::Apply,
        "reset" => PageCommand::Reset,
        "sort" if !rest.is_empty() => PageCommand::Sort {
            column: rest.to_string(),
        },
        "sort" => bail!("usage: sort <column>"),
        "render" => PageCommand::Render {
            target: match args.first().copied() {
                None => RenderTarget::All,
                Some("table") => RenderTarget::Table,
                Some("filters") => RenderTarget::Filters,
                Some("notice") => RenderTarget::Notice,
                Some(other) => bail!("unknown render target '{other}'"),
            },
        },
        "status" => PageCommand::Status,
        "refresh" => PageCommand::Refresh,
        "quit" | "exit" => PageCommand::Quit,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

/// Splits off the first space-separated word; the remainder is returned untouched.
fn split_word(text: &str) -> (&str, &str) {
    text.split_once(' ').unwrap_or((text, ""))
}

fn single_arg(name: &str, args: &[&str]) -> anyhow::Result<String> {
    match args {
        [arg] => Ok(arg.to_string()),
        _ => bail!("usage: {name} <group>"),
    }
}

fn group_and_rest(name: &str, rest: &str) -> anyhow::Result<(String, String)> {
    match split_word(rest) {
        (group, value) if !group.is_empty() && !value.is_empty() => {
            Ok((group.to_string(), value.to_string()))
        }
        _ => bail!("usage: {name} <group> <value>"),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
