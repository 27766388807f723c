use crate::app::models::EffectiveSettings;
use crate::app::scanner::display_relative;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SESSION_PROMPT_SEPARATOR: &str = "\n\n--> code files combine starts here: <--\n\n";
pub const ROOT_NAME_PLACEHOLDER: &str = "[root directory name]";

/// Writes the selected files, optionally preceded by the session prompt.
pub struct OutputGenerator<'a> {
    settings: &'a EffectiveSettings,
}

/// Single quotes unless the text holds `'` and no `"`. Backslashes, the
/// chosen quote and control characters are escaped.
fn quote_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `['a', 'b']`
fn format_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote_literal(s)).collect();
    format!("[{}]", quoted.join(", "))
}

/// `\r\n` and lone `\r` become `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn render_session_prompt(raw: &str, root: &Path) -> String {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    normalize_newlines(raw).replace(ROOT_NAME_PLACEHOLDER, &root_name)
}

impl<'a> OutputGenerator<'a> {
    pub fn new(settings: &'a EffectiveSettings) -> Self {
        Self { settings }
    }

    /// Creates (or truncates) the output file and writes every record into it.
    pub fn write_file(&self, files: &[PathBuf], session_prompt: Option<&str>) -> Result<()> {
        let path = self.settings.output_path();
        let file = File::create(path)
            .with_context(|| format!("Could not write to output file '{}'", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out, files, session_prompt)
            .and_then(|_| out.flush())
            .with_context(|| format!("Could not write to output file '{}'", path.display()))
    }

    pub fn write_to<W: Write>(
        &self,
        out: &mut W,
        files: &[PathBuf],
        session_prompt: Option<&str>,
    ) -> io::Result<()> {
        let session_prompt = session_prompt.filter(|text| !text.is_empty());
        if let Some(text) = session_prompt {
            out.write_all(text.as_bytes())?;
            out.write_all(SESSION_PROMPT_SEPARATOR.as_bytes())?;
        }

        if files.is_empty() {
            return self.write_empty_notice(out, session_prompt.is_some());
        }

        let headers = self.settings.emit_headers();
        for (i, path) in files.iter().enumerate() {
            let relative = display_relative(path, &self.settings.root);
            log::debug!("  Appending content of: {}", relative);

            if headers {
                writeln!(out, "--- START FILE: {} ---", relative)?;
            }
            match fs::read(path) {
                Ok(bytes) => {
                    let text = normalize_newlines(&String::from_utf8_lossy(&bytes));
                    out.write_all(text.as_bytes())?
                }
                Err(err) => {
                    let marker = format!("[Error reading file {}: {}]", relative, err);
                    log::warn!("{}", marker);
                    if headers {
                        writeln!(out, "{}", marker)?;
                    } else {
                        write!(out, "\n\n'''{}'''\n\n", marker)?;
                    }
                }
            }
            if headers {
                write!(out, "\n--- END FILE: {} ---", relative)?;
            }

            if i + 1 < files.len() {
                out.write_all(b"\n\n")?;
            } else if headers {
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    /// Empty selection notice, per (prompt present, headers enabled):
    /// (no, yes) full notice; (yes, yes) one line; headers disabled writes nothing.
    fn write_empty_notice<W: Write>(&self, out: &mut W, has_prompt: bool) -> io::Result<()> {
        let root = self.settings.root.display();
        match (has_prompt, self.settings.emit_headers()) {
            (false, true) => {
                writeln!(out, "# No code files found matching criteria in '{}'", root)?;
                writeln!(
                    out,
                    "# Include Extensions: {}",
                    format_list(&self.settings.include_strs())
                )?;
                writeln!(
                    out,
                    "# Exclude Patterns: {}",
                    format_list(&self.settings.exclude_strs())
                )
            }
            (true, true) => writeln!(
                out,
                "\n# No code files found matching criteria in '{}' (after session prompt)",
                root
            ),
            (false, false) | (true, false) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::parse_rules;
    use crate::app::models::{CliOverrides, Defaults};
    use crate::app::settings::merge;
    use tempfile::TempDir;

    fn settings_for(root: &Path, rule_text: &str) -> EffectiveSettings {
        merge(
            CliOverrides::default(),
            parse_rules(rule_text),
            &Defaults::default(),
            root,
            root,
        )
    }

    fn render(settings: &EffectiveSettings, files: &[PathBuf], prompt: Option<&str>) -> String {
        let mut buf = Vec::new();
        OutputGenerator::new(settings)
            .write_to(&mut buf, files, prompt)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_records_with_headers() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.js"), "let a = 1;").unwrap();
        fs::write(root.join("b.js"), "let b = 2;\n").unwrap();

        let settings = settings_for(root, "");
        let out = render(&settings, &[root.join("src/a.js"), root.join("b.js")], None);

        assert_eq!(
            out,
            "--- START FILE: src/a.js ---\nlet a = 1;\n--- END FILE: src/a.js ---\n\n\
             --- START FILE: b.js ---\nlet b = 2;\n\n--- END FILE: b.js ---\n"
        );
    }

    #[test]
    fn writes_bare_contents_without_headers() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a.js"), "A").unwrap();
        fs::write(root.join("b.js"), "B").unwrap();

        let settings = settings_for(root, "no_header: on");
        let out = render(&settings, &[root.join("a.js"), root.join("b.js")], None);

        assert_eq!(out, "A\n\nB");
    }

    #[test]
    fn prepends_session_prompt_with_separator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a.js"), "A").unwrap();

        let settings = settings_for(root, "");
        let out = render(&settings, &[root.join("a.js")], Some("Hello"));

        assert!(out.starts_with(
            "Hello\n\n--> code files combine starts here: <--\n\n--- START FILE: a.js ---\n"
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced_and_missing_files_get_a_marker() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("bin.js"), [b'o', b'k', 0xff]).unwrap();

        let settings = settings_for(root, "");
        let out = render(&settings, &[root.join("bin.js"), root.join("gone.js")], None);

        assert!(out.contains("ok\u{FFFD}"));
        assert!(out.contains("--- START FILE: gone.js ---\n[Error reading file gone.js: "));
        assert!(out.ends_with("]\n\n--- END FILE: gone.js ---\n"));
    }

    #[test]
    fn read_error_marker_without_headers_is_quoted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let settings = settings_for(root, "no_header: true");
        let out = render(&settings, &[root.join("gone.js")], None);

        assert!(out.starts_with("\n\n'''[Error reading file gone.js: "));
        assert!(out.ends_with("]'''\n\n"));
    }

    #[test]
    fn empty_selection_case_table() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let root_display = root.display();

        let with_headers = settings_for(root, "*.py\nbuild/\n");
        assert_eq!(
            render(&with_headers, &[], None),
            format!(
                "# No code files found matching criteria in '{}'\n\
                 # Include Extensions: ['*.py']\n\
                 # Exclude Patterns: ['build/']\n",
                root_display
            )
        );
        assert_eq!(
            render(&with_headers, &[], Some("P")),
            format!(
                "P{}\n# No code files found matching criteria in '{}' (after session prompt)\n",
                SESSION_PROMPT_SEPARATOR, root_display
            )
        );

        let without_headers = settings_for(root, "no_header: yes");
        assert_eq!(render(&without_headers, &[], None), "");
        assert_eq!(
            render(&without_headers, &[], Some("P")),
            format!("P{}", SESSION_PROMPT_SEPARATOR)
        );
    }

    #[test]
    fn empty_prompt_text_counts_as_absent() {
        let temp = TempDir::new().unwrap();
        let settings = settings_for(temp.path(), "no_header: yes");
        assert_eq!(render(&settings, &[], Some("")), "");
    }

    #[test]
    fn placeholder_is_replaced_with_root_name() {
        let rendered = render_session_prompt(
            "Name: [root directory name]",
            Path::new("/work/my-app"),
        );
        assert_eq!(rendered, "Name: my-app");
    }

    #[test]
    fn line_endings_are_normalized() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("win.js"), "a\r\nb\rc\n").unwrap();

        let settings = settings_for(root, "no_header: yes");
        let out = render(&settings, &[root.join("win.js")], None);

        assert_eq!(out, "a\nb\nc\n");
        assert_eq!(
            render_session_prompt("Hi\r\n[root directory name]\r", Path::new("/w/app")),
            "Hi\napp\n"
        );
    }

    #[test]
    fn notice_lists_quote_and_escape_patterns() {
        assert_eq!(format_list(&[]), "[]");
        assert_eq!(format_list(&["*.js", "dist/"]), "['*.js', 'dist/']");
        assert_eq!(format_list(&["it's"]), "[\"it's\"]");
        assert_eq!(format_list(&["a'b\"c"]), "['a\\'b\"c']");
        assert_eq!(format_list(&["a\\b"]), "['a\\\\b']");
        assert_eq!(format_list(&["tab\there"]), "['tab\\there']");
    }
}
