//! Typed per-language settings and the command builder.
//!
//! A [`ConfigValues`] map is resolved once per invocation into a
//! [`LanguageSettings`] value; [`LanguageSettings::build_command`] then turns
//! it, together with the source and the user arguments, into a
//! [`CommandSpec`]. Building is pure: nothing is executed or written here.

use std::sync::LazyLock;

use regex::Regex;

use crate::command::CommandSpec;
use crate::field::{ConfigField, ConfigValues};
use crate::language::{Language, fields};

/// Settings for languages driven by a single interpreter or tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterSettings {
    pub command: String,
    pub custom_command: Option<String>,
}

/// Settings for compile-then-run languages (C, C++).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    pub compiler: String,
    pub flags: String,
    pub custom_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustSettings {
    pub cargo: String,
    pub edition: String,
    pub custom_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaSettings {
    pub javac: String,
    pub java: String,
    pub custom_command: Option<String>,
}

/// Resolved settings for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSettings {
    Python(InterpreterSettings),
    JavaScript(InterpreterSettings),
    TypeScript(InterpreterSettings),
    Shell(InterpreterSettings),
    Ruby(InterpreterSettings),
    Php(InterpreterSettings),
    C(CompilerSettings),
    Cpp(CompilerSettings),
    Go(InterpreterSettings),
    Rust(RustSettings),
    Java(JavaSettings),
}

fn owned_opt(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

impl LanguageSettings {
    /// Resolve the settings of `language` from `values`, falling back to the
    /// declared defaults for missing or blank keys.
    pub fn resolve(language: Language, values: &ConfigValues) -> Self {
        let custom_command = owned_opt(values.get_opt(language.custom_command_field()));
        let interpreter = |field: &ConfigField| InterpreterSettings {
            command: values.get(field).to_string(),
            custom_command: custom_command.clone(),
        };

        match language {
            Language::Python => Self::Python(interpreter(&fields::PYTHON_COMMAND)),
            Language::JavaScript => Self::JavaScript(interpreter(&fields::NODE_COMMAND)),
            Language::TypeScript => Self::TypeScript(interpreter(&fields::TS_NODE_COMMAND)),
            Language::Shell => Self::Shell(interpreter(&fields::SHELL_COMMAND)),
            Language::Ruby => Self::Ruby(interpreter(&fields::RUBY_COMMAND)),
            Language::Php => Self::Php(interpreter(&fields::PHP_COMMAND)),
            Language::Go => Self::Go(interpreter(&fields::GO_COMMAND)),
            Language::C => Self::C(CompilerSettings {
                compiler: values.get(&fields::C_COMPILER).to_string(),
                flags: values.get(&fields::C_FLAGS).to_string(),
                custom_command,
            }),
            Language::Cpp => Self::Cpp(CompilerSettings {
                compiler: values.get(&fields::CPP_COMPILER).to_string(),
                flags: values.get(&fields::CPP_FLAGS).to_string(),
                custom_command,
            }),
            Language::Rust => Self::Rust(RustSettings {
                cargo: values.get(&fields::CARGO_COMMAND).to_string(),
                edition: values.get(&fields::RUST_EDITION).to_string(),
                custom_command,
            }),
            Language::Java => Self::Java(JavaSettings {
                javac: values.get(&fields::JAVAC_COMMAND).to_string(),
                java: values.get(&fields::JAVA_COMMAND).to_string(),
                custom_command,
            }),
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Self::Python(_) => Language::Python,
            Self::JavaScript(_) => Language::JavaScript,
            Self::TypeScript(_) => Language::TypeScript,
            Self::Shell(_) => Language::Shell,
            Self::Ruby(_) => Language::Ruby,
            Self::Php(_) => Language::Php,
            Self::C(_) => Language::C,
            Self::Cpp(_) => Language::Cpp,
            Self::Go(_) => Language::Go,
            Self::Rust(_) => Language::Rust,
            Self::Java(_) => Language::Java,
        }
    }

    /// The user's custom command template, if one is configured.
    pub fn custom_command(&self) -> Option<&str> {
        match self {
            Self::Python(s)
            | Self::JavaScript(s)
            | Self::TypeScript(s)
            | Self::Shell(s)
            | Self::Ruby(s)
            | Self::Php(s)
            | Self::Go(s) => s.custom_command.as_deref(),
            Self::C(s) | Self::Cpp(s) => s.custom_command.as_deref(),
            Self::Rust(s) => s.custom_command.as_deref(),
            Self::Java(s) => s.custom_command.as_deref(),
        }
    }

    /// Build the default command for `source`.
    ///
    /// Interpreters embed the code inline when there are no user arguments
    /// and switch to a temp file otherwise, so that the script sees a real
    /// argv. Compiled languages always go through a temp file and a small
    /// `/bin/sh` driver script that compiles, runs and removes artifacts.
    pub fn build_command(&self, source: &str, user_args: &[String]) -> CommandSpec {
        let ext = self.language().extension();
        let args = user_args.join(" ");

        match self {
            Self::Python(s) => interpreter_command(&s.command, "-c", source, user_args, ext),
            Self::JavaScript(s) => interpreter_command(&s.command, "-e", source, user_args, ext),
            Self::Shell(s) => interpreter_command(&s.command, "-c", source, user_args, ext),
            Self::Ruby(s) => interpreter_command(&s.command, "-e", source, user_args, ext),
            Self::Php(s) => interpreter_command(&s.command, "-r", source, user_args, ext),
            Self::TypeScript(s) => {
                // ts-node has no inline evaluation flag
                if user_args.is_empty() {
                    CommandSpec::with_temp_file(&s.command, vec![], ext)
                } else {
                    CommandSpec::shell_script(format!("{} \"$1\" {}", s.command, args), ext)
                }
            }
            Self::C(s) | Self::Cpp(s) => CommandSpec::shell_script(
                format!(
                    "{} {} \"$1\" -o \"$1.out\" && \"$1.out\" {}; \
                     EXIT_CODE=$?; rm -f \"$1.out\"; exit $EXIT_CODE",
                    s.compiler, s.flags, args
                ),
                ext,
            ),
            Self::Go(s) => {
                CommandSpec::shell_script(format!("{} run \"$1\" {}", s.command, args), ext)
            }
            Self::Rust(s) => CommandSpec::shell_script(rust_script(s, &args), ext),
            Self::Java(s) => {
                CommandSpec::shell_script(java_script(s, java_class_name(source), &args), ext)
            }
        }
    }
}

fn interpreter_command(
    program: &str,
    eval_flag: &str,
    source: &str,
    user_args: &[String],
    ext: &str,
) -> CommandSpec {
    if user_args.is_empty() {
        CommandSpec::inline(program, vec![eval_flag.to_string(), source.to_string()], ext)
    } else {
        CommandSpec::with_temp_file(program, vec![], ext)
    }
}

fn rust_script(settings: &RustSettings, args: &str) -> String {
    format!(
        "TEMP_FILE=\"$1\" && \
         DIR=$(dirname \"$TEMP_FILE\") && \
         PROJ_DIR=\"$DIR/rust_temp_$$\" && \
         mkdir -p \"$PROJ_DIR/src\" && \
         cp \"$TEMP_FILE\" \"$PROJ_DIR/src/main.rs\" && \
         cat > \"$PROJ_DIR/Cargo.toml\" << 'CARGO_EOF'\n\
         [package]\n\
         name = \"temp_runner\"\n\
         version = \"0.1.0\"\n\
         edition = \"{edition}\"\n\
         \n\
         [dependencies]\n\
         CARGO_EOF\n\
         cd \"$PROJ_DIR\" && {cargo} run --quiet -- {args}; \
         EXIT_CODE=$?; \
         cd - > /dev/null && rm -rf \"$PROJ_DIR\"; \
         exit $EXIT_CODE",
        edition = settings.edition,
        cargo = settings.cargo,
    )
}

fn java_script(settings: &JavaSettings, class: &str, args: &str) -> String {
    format!(
        "TEMP_FILE=\"$1\" && \
         DIR=$(dirname \"$TEMP_FILE\") && \
         cp \"$TEMP_FILE\" \"$DIR/{class}.java\" && \
         {javac} \"$DIR/{class}.java\" && \
         {java} -cp \"$DIR\" {class} {args}; \
         EXIT_CODE=$?; \
         rm -f \"$DIR/{class}.java\" \"$DIR/{class}.class\"; \
         exit $EXIT_CODE",
        javac = settings.javac,
        java = settings.java,
    )
}

static PUBLIC_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"public\s+class\s+(\w+)").expect("class pattern is valid"));

/// Name of the public class declared in `source`, `Main` when there is none.
pub fn java_class_name(source: &str) -> &str {
    PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("Main")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn python_inline_without_args() {
        let settings = LanguageSettings::resolve(Language::Python, &ConfigValues::new());
        let spec = settings.build_command("print(1+1)", &[]);
        assert_eq!(spec.program, "python3");
        assert_eq!(spec.argv, args(&["-c", "print(1+1)"]));
        assert!(!spec.uses_temp_file);
    }

    #[test]
    fn python_temp_file_with_args() {
        let values = ConfigValues::new().with("python_command", "/usr/local/bin/python3.12");
        let settings = LanguageSettings::resolve(Language::Python, &values);
        let spec = settings.build_command("import sys; print(sys.argv)", &args(&["a"]));
        assert_eq!(spec.program, "/usr/local/bin/python3.12");
        assert!(spec.argv.is_empty());
        assert!(spec.uses_temp_file);
        assert_eq!(spec.extension(), "py");
    }

    #[test]
    fn inline_flags_per_interpreter() {
        let values = ConfigValues::new();
        let cases = [
            (Language::JavaScript, "node", "-e"),
            (Language::Shell, "/bin/bash", "-c"),
            (Language::Ruby, "ruby", "-e"),
            (Language::Php, "php", "-r"),
        ];
        for (language, program, flag) in cases {
            let spec = LanguageSettings::resolve(language, &values).build_command("x", &[]);
            assert_eq!(spec.program, program, "{language}");
            assert_eq!(spec.argv, args(&[flag, "x"]), "{language}");
        }
    }

    #[test]
    fn typescript_always_uses_temp_file() {
        let settings = LanguageSettings::resolve(Language::TypeScript, &ConfigValues::new());

        let plain = settings.build_command("console.log(1)", &[]);
        assert_eq!(plain.program, "ts-node");
        assert!(plain.uses_temp_file);

        let with_args = settings.build_command("console.log(1)", &args(&["x"]));
        assert_eq!(with_args.program, "/bin/sh");
        assert_eq!(with_args.argv[1], "ts-node \"$1\" x");
        assert!(with_args.uses_temp_file);
    }

    #[test]
    fn c_compiles_through_shell_script() {
        let values = ConfigValues::new().with("c_flags", "-O2");
        let spec = LanguageSettings::resolve(Language::C, &values)
            .build_command("int main(){return 0;}", &args(&["1", "2"]));
        assert_eq!(spec.program, "/bin/sh");
        assert_eq!(spec.argv[0], "-c");
        assert!(spec.argv[1].starts_with("gcc -O2 \"$1\" -o \"$1.out\""));
        assert!(spec.argv[1].contains("\"$1.out\" 1 2;"));
        assert_eq!(spec.argv[2], "--");
        assert!(spec.uses_temp_file);
        assert_eq!(spec.extension(), "c");
    }

    #[test]
    fn cpp_defaults() {
        let spec = LanguageSettings::resolve(Language::Cpp, &ConfigValues::new())
            .build_command("", &[]);
        assert!(spec.argv[1].starts_with("g++ -std=c++17 "));
        assert_eq!(spec.extension(), "cpp");
    }

    #[test]
    fn rust_script_uses_edition_and_cargo() {
        let values = ConfigValues::new()
            .with("rust_edition", "2024")
            .with("cargo_command", "/opt/cargo");
        let spec = LanguageSettings::resolve(Language::Rust, &values)
            .build_command("fn main() {}", &args(&["x"]));
        let script = &spec.argv[1];
        assert!(script.contains("edition = \"2024\""));
        assert!(script.contains("/opt/cargo run --quiet -- x;"));
        assert!(script.contains("\nCARGO_EOF\n"));
    }

    #[test]
    fn java_sniffs_public_class() {
        let source = "public class Hello {\n  public static void main(String[] a) {}\n}";
        assert_eq!(java_class_name(source), "Hello");
        assert_eq!(java_class_name("class Hidden {}"), "Main");

        let spec =
            LanguageSettings::resolve(Language::Java, &ConfigValues::new()).build_command(source, &[]);
        assert!(spec.argv[1].contains("\"$DIR/Hello.java\""));
        assert!(spec.argv[1].contains("java -cp \"$DIR\" Hello"));
    }

    #[test]
    fn custom_command_is_resolved() {
        let values = ConfigValues::new().with("go_custom_command", "tinygo run {file}");
        let settings = LanguageSettings::resolve(Language::Go, &values);
        assert_eq!(settings.custom_command(), Some("tinygo run {file}"));

        let blank = ConfigValues::new().with("go_custom_command", "  \n");
        let settings = LanguageSettings::resolve(Language::Go, &blank);
        assert_eq!(settings.custom_command(), None);
    }

    #[test]
    fn building_is_deterministic() {
        for language in Language::ALL {
            let settings = LanguageSettings::resolve(language, &ConfigValues::new());
            assert_eq!(settings.language(), language);
            assert_eq!(
                settings.build_command("code", &args(&["a"])),
                settings.build_command("code", &args(&["a"]))
            );
        }
    }
}
