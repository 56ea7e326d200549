/// Extension used for temp files when a command does not ask for one.
pub const GENERIC_EXTENSION: &str = "txt";

/// Concrete program invocation for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to invoke
    pub program: String,
    /// Arguments. Self-contained unless `uses_temp_file` is set, in which
    /// case the engine appends the temp file path and the user arguments.
    pub argv: Vec<String>,
    /// Whether the source must be written to a temp file first
    pub uses_temp_file: bool,
    /// Temp file extension, without the dot
    pub temp_file_extension: Option<String>,
}

impl CommandSpec {
    /// Code is embedded in `argv` (e.g. `python3 -c <code>`).
    pub fn inline(program: impl Into<String>, argv: Vec<String>, extension: &str) -> Self {
        Self {
            program: program.into(),
            argv,
            uses_temp_file: false,
            temp_file_extension: Some(extension.to_string()),
        }
    }

    /// Code is read from a temp file the engine appends to `argv`.
    pub fn with_temp_file(program: impl Into<String>, argv: Vec<String>, extension: &str) -> Self {
        Self {
            program: program.into(),
            argv,
            uses_temp_file: true,
            temp_file_extension: Some(extension.to_string()),
        }
    }

    /// `/bin/sh -c <script> --`: the temp file becomes `$1` and user
    /// arguments follow as `$2..`.
    pub fn shell_script(script: String, extension: &str) -> Self {
        Self::with_temp_file(
            "/bin/sh",
            vec!["-c".to_string(), script, "--".to_string()],
            extension,
        )
    }

    /// Extension to use when materializing the source.
    pub fn extension(&self) -> &str {
        self.temp_file_extension
            .as_deref()
            .filter(|ext| !ext.is_empty())
            .unwrap_or(GENERIC_EXTENSION)
    }
}
