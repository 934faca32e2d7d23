//! Best-effort cleanup for edit payloads coming back from the upstream.
//!
//! Everything here is heuristic and lossy. The fallbacks (2-space indent,
//! `untitled.txt`) are part of the observable behaviour and must stay put.

use lazy_static::lazy_static;
use regex::Regex;

/// Indent width edits are rescaled to.
pub const TARGET_INDENT: usize = 2;

/// File name used when no path can be pulled out of a document title.
pub const PLACEHOLDER_FILE_NAME: &str = "untitled.txt";

lazy_static! {
    static ref NUMBERED_PIPE: Regex = Regex::new(r"^\s*\d+[|→]\s?(.*)$").unwrap();
    static ref NUMBERED_TAB: Regex = Regex::new(r"^\s*\d+\t(.*)$").unwrap();
    static ref NUMBERED_COLON: Regex = Regex::new(r"^(\d+):(.*)$").unwrap();
    static ref TITLE_PATH: Regex =
        Regex::new(r"(?i)(?:Create|Write|创建|写入)\s+(?:file\s+)?(.+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tabs,
    Spaces(usize),
}

/// Drop line-number prefixes (`12| `, `12→ `, `12\t`, `12:`) from every line.
/// A line is rewritten only when the whole line fits one of those shapes.
pub fn strip_line_numbers(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            [&*NUMBERED_PIPE, &*NUMBERED_TAB]
                .iter()
                .find_map(|re| re.captures(line))
                .map(|caps| caps[1].to_string())
                .or_else(|| {
                    NUMBERED_COLON
                        .captures(line)
                        .map(|caps| caps[2].to_string())
                })
                .unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Guess the indentation unit of a snippet.
///
/// Tabs win if more lines start with a tab than with spaces. Otherwise the
/// unit is the GCD of the observed space-run lengths; a GCD of 1 with some
/// run of 2+ is treated as 2 (odd runs are usually alignment noise).
pub fn detect_indent_style(text: &str) -> IndentStyle {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut widths: Vec<usize> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        let indent = leading_whitespace(line);
        if indent.is_empty() {
            continue;
        }
        if indent.contains('\t') {
            tab_lines += 1;
        } else {
            space_lines += 1;
            let width = indent.chars().take_while(|c| *c == ' ').count();
            if width > 0 && !widths.contains(&width) {
                widths.push(width);
            }
        }
    }

    if tab_lines > space_lines {
        return IndentStyle::Tabs;
    }
    if widths.is_empty() {
        return IndentStyle::Spaces(TARGET_INDENT);
    }

    let unit = widths.iter().copied().fold(0, gcd);
    if unit == 1 && widths.iter().any(|w| *w >= 2) {
        IndentStyle::Spaces(2)
    } else {
        IndentStyle::Spaces(unit.max(1))
    }
}

/// Rescale leading indentation to `target` spaces per level.
/// Blank lines pass through untouched.
pub fn normalize_indent(text: &str, target: usize) -> String {
    let style = detect_indent_style(text);
    if style == IndentStyle::Spaces(target) {
        return text.to_string();
    }

    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                return line.to_string();
            }
            let indent = leading_whitespace(line);
            if indent.is_empty() {
                return line.to_string();
            }
            let level = match style {
                IndentStyle::Tabs => indent.chars().filter(|c| *c == '\t').count(),
                IndentStyle::Spaces(unit) => {
                    let spaces = indent.chars().filter(|c| *c == ' ').count();
                    (spaces as f64 / unit as f64).round() as usize
                }
            };
            format!("{}{}", " ".repeat(level * target), &line[indent.len()..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both cleanup passes, in order, as applied to reconstructed edits.
pub fn clean_edit_text(text: &str) -> String {
    normalize_indent(&strip_line_numbers(text), TARGET_INDENT)
}

/// Pull a file path out of a human-readable document title such as
/// `"Create file src/main.rs"`. Falls back to [`PLACEHOLDER_FILE_NAME`].
pub fn extract_path_from_title(title: &str) -> String {
    TITLE_PATH
        .captures(title)
        .map(|caps| caps[1].trim().to_string())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_numbers() {
        assert_eq!(
            strip_line_numbers("12| return x;\n13| return y;"),
            "return x;\nreturn y;"
        );
        assert_eq!(strip_line_numbers("  7→ let a = 1;"), "let a = 1;");
        assert_eq!(strip_line_numbers("3\tfoo()"), "foo()");
        assert_eq!(strip_line_numbers("42:bar"), "bar");
    }

    #[test]
    fn test_strip_line_numbers_leaves_prose_alone() {
        assert_eq!(strip_line_numbers("note: see above"), "note: see above");
        assert_eq!(strip_line_numbers("x = a | b"), "x = a | b");
    }

    #[test]
    fn test_detect_indent_style() {
        assert_eq!(detect_indent_style("a\n    b\n        c"), IndentStyle::Spaces(4));
        assert_eq!(detect_indent_style("a\n\tb\n\t\tc"), IndentStyle::Tabs);
        assert_eq!(detect_indent_style("a\n   b\n  c"), IndentStyle::Spaces(2));
        assert_eq!(detect_indent_style("no indent"), IndentStyle::Spaces(2));
        assert_eq!(detect_indent_style("a\n  \tb\n  \tc\n    d"), IndentStyle::Tabs);
    }

    #[test]
    fn test_normalize_indent_rescales_to_target() {
        assert_eq!(
            normalize_indent("fn a() {\n    b();\n\n        c();\n}", 2),
            "fn a() {\n  b();\n\n    c();\n}"
        );
        assert_eq!(normalize_indent("if x {\n\ty\n}", 2), "if x {\n  y\n}");
    }

    #[test]
    fn test_normalize_indent_keeps_two_space_input() {
        let text = "a:\n  b:\n    c";
        assert_eq!(normalize_indent(text, 2), text);
    }

    #[test]
    fn test_extract_path_from_title() {
        assert_eq!(extract_path_from_title("Create file src/lib.rs"), "src/lib.rs");
        assert_eq!(extract_path_from_title("write notes.md"), "notes.md");
        assert_eq!(extract_path_from_title("创建 README.md"), "README.md");
        assert_eq!(extract_path_from_title("Quarterly plan"), PLACEHOLDER_FILE_NAME);
    }
}
