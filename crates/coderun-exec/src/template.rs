//! `{placeholder}` substitution for user-supplied custom commands.
//!
//! Values are spliced in verbatim. Nothing is shell-escaped: a custom command
//! is a shell line the user wrote, and it runs with the same privileges as
//! the code itself.

/// Values available to a custom command template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    /// Path of the temp file holding the source
    pub file: &'a str,
    /// User arguments, space-joined
    pub args: &'a str,
    /// Directory containing the temp file
    pub dir: &'a str,
}

impl TemplateVars<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "file" => Some(self.file),
            "args" => Some(self.args),
            "dir" => Some(self.dir),
            _ => None,
        }
    }
}

/// Replace every `{file}`, `{args}` and `{dir}` in `template`.
///
/// Unknown placeholders are left untouched. Substituted values are not
/// scanned again, so a path containing `{args}` stays literal.
pub fn substitute(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            vars.lookup(&after[..close])
                .map(|value| (value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
