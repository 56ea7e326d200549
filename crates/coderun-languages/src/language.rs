//! The closed set of supported languages.

use crate::field::ConfigField;

/// A supported language.
///
/// Adding a language means adding a variant here; every table below and the
/// command builder in [`crate::settings`] match exhaustively on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Shell,
    Ruby,
    Php,
    C,
    Cpp,
    Go,
    Rust,
    Java,
}

impl Language {
    /// Every language, in registration order.
    pub const ALL: [Language; 11] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Shell,
        Language::Ruby,
        Language::Php,
        Language::C,
        Language::Cpp,
        Language::Go,
        Language::Rust,
        Language::Java,
    ];

    /// Identifiers (code fence tags) selecting this language. The first one
    /// is canonical. All lowercase.
    pub fn ids(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["python", "py"],
            Language::JavaScript => &["javascript", "js", "node"],
            Language::TypeScript => &["typescript", "ts"],
            Language::Shell => &["bash", "sh", "shell", "zsh"],
            Language::Ruby => &["ruby", "rb"],
            Language::Php => &["php"],
            Language::C => &["c"],
            Language::Cpp => &["cpp", "c++", "cxx"],
            Language::Go => &["go", "golang"],
            Language::Rust => &["rust", "rs"],
            Language::Java => &["java"],
        }
    }

    /// Canonical identifier.
    pub fn id(self) -> &'static str {
        self.ids()[0]
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Shell => "Shell",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Java => "Java",
        }
    }

    /// Source file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Shell => "sh",
            Language::Ruby => "rb",
            Language::Php => "php",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Rust => "rs",
            Language::Java => "java",
        }
    }

    /// Configuration fields, in display order.
    pub fn config_fields(self) -> &'static [ConfigField] {
        match self {
            Language::Python => &[fields::PYTHON_CUSTOM_COMMAND, fields::PYTHON_COMMAND],
            Language::JavaScript => &[fields::JAVASCRIPT_CUSTOM_COMMAND, fields::NODE_COMMAND],
            Language::TypeScript => &[fields::TYPESCRIPT_CUSTOM_COMMAND, fields::TS_NODE_COMMAND],
            Language::Shell => &[fields::SHELL_CUSTOM_COMMAND, fields::SHELL_COMMAND],
            Language::Ruby => &[fields::RUBY_CUSTOM_COMMAND, fields::RUBY_COMMAND],
            Language::Php => &[fields::PHP_CUSTOM_COMMAND, fields::PHP_COMMAND],
            Language::C => &[fields::C_CUSTOM_COMMAND, fields::C_COMPILER, fields::C_FLAGS],
            Language::Cpp => &[
                fields::CPP_CUSTOM_COMMAND,
                fields::CPP_COMPILER,
                fields::CPP_FLAGS,
            ],
            Language::Go => &[fields::GO_CUSTOM_COMMAND, fields::GO_COMMAND],
            Language::Rust => &[
                fields::RUST_CUSTOM_COMMAND,
                fields::CARGO_COMMAND,
                fields::RUST_EDITION,
            ],
            Language::Java => &[
                fields::JAVA_CUSTOM_COMMAND,
                fields::JAVAC_COMMAND,
                fields::JAVA_COMMAND,
            ],
        }
    }

    /// The field holding this language's custom command template.
    pub fn custom_command_field(self) -> &'static ConfigField {
        match self {
            Language::Python => &fields::PYTHON_CUSTOM_COMMAND,
            Language::JavaScript => &fields::JAVASCRIPT_CUSTOM_COMMAND,
            Language::TypeScript => &fields::TYPESCRIPT_CUSTOM_COMMAND,
            Language::Shell => &fields::SHELL_CUSTOM_COMMAND,
            Language::Ruby => &fields::RUBY_CUSTOM_COMMAND,
            Language::Php => &fields::PHP_CUSTOM_COMMAND,
            Language::C => &fields::C_CUSTOM_COMMAND,
            Language::Cpp => &fields::CPP_CUSTOM_COMMAND,
            Language::Go => &fields::GO_CUSTOM_COMMAND,
            Language::Rust => &fields::RUST_CUSTOM_COMMAND,
            Language::Java => &fields::JAVA_CUSTOM_COMMAND,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Field declarations for every language.
pub mod fields {
    use crate::field::ConfigField;

    macro_rules! custom_command {
        ($name:ident, $key:literal, $lang:literal, $example:literal) => {
            pub const $name: ConfigField = ConfigField {
                key: $key,
                label: "Custom command (optional)",
                help: concat!(
                    "Custom shell command to run ",
                    $lang,
                    " code. Leave empty to use the default behavior.\n\n",
                    "Available variables:\n",
                    "  {file} - path to temp file with your code\n",
                    "  {args} - command-line arguments\n",
                    "  {dir} - directory containing temp file\n\n",
                    "Example: ",
                    $example
                ),
                default: "",
                multiline: true,
            };
        };
    }

    macro_rules! tool {
        ($name:ident, $key:literal, $label:literal, $help:literal, $default:literal) => {
            pub const $name: ConfigField = ConfigField {
                key: $key,
                label: $label,
                help: $help,
                default: $default,
                multiline: false,
            };
        };
    }

    custom_command!(PYTHON_CUSTOM_COMMAND, "python_custom_command", "Python", "uv run {file} {args}");
    tool!(
        PYTHON_COMMAND,
        "python_command",
        "Python command",
        "The command used to execute Python code (e.g. python3, python, or a full path)",
        "python3"
    );

    custom_command!(
        JAVASCRIPT_CUSTOM_COMMAND,
        "javascript_custom_command",
        "JavaScript",
        "bun run {file} {args}"
    );
    tool!(
        NODE_COMMAND,
        "node_command",
        "Node.js command",
        "The command used to execute JavaScript code (e.g. node, nodejs, or a full path)",
        "node"
    );

    custom_command!(
        TYPESCRIPT_CUSTOM_COMMAND,
        "typescript_custom_command",
        "TypeScript",
        "deno run {file} {args}"
    );
    tool!(
        TS_NODE_COMMAND,
        "ts_node_command",
        "ts-node command",
        "The command used to execute TypeScript (e.g. ts-node, npx ts-node, or a full path)",
        "ts-node"
    );

    custom_command!(SHELL_CUSTOM_COMMAND, "shell_custom_command", "shell", "zsh {file} {args}");
    tool!(
        SHELL_COMMAND,
        "shell_command",
        "Shell command",
        "The shell used to execute scripts (e.g. /bin/bash, /bin/zsh, or /bin/sh)",
        "/bin/bash"
    );

    custom_command!(RUBY_CUSTOM_COMMAND, "ruby_custom_command", "Ruby", "bundle exec ruby {file} {args}");
    tool!(
        RUBY_COMMAND,
        "ruby_command",
        "Ruby command",
        "The command used to execute Ruby code (e.g. ruby, or a full path)",
        "ruby"
    );

    custom_command!(PHP_CUSTOM_COMMAND, "php_custom_command", "PHP", "php -d display_errors=1 {file} {args}");
    tool!(
        PHP_COMMAND,
        "php_command",
        "PHP command",
        "The command used to execute PHP code (e.g. php, or a full path)",
        "php"
    );

    custom_command!(
        C_CUSTOM_COMMAND,
        "c_custom_command",
        "C",
        "clang -O2 {file} -o {file}.out && {file}.out {args}"
    );
    tool!(
        C_COMPILER,
        "c_compiler",
        "C compiler",
        "The C compiler to use (e.g. gcc, clang, or a full path)",
        "gcc"
    );
    tool!(
        C_FLAGS,
        "c_flags",
        "C compiler flags",
        "Additional flags passed to the compiler (e.g. -std=c11 -O2)",
        "-std=c11"
    );

    custom_command!(
        CPP_CUSTOM_COMMAND,
        "cpp_custom_command",
        "C++",
        "clang++ -std=c++20 {file} -o {file}.out && {file}.out {args}"
    );
    tool!(
        CPP_COMPILER,
        "cpp_compiler",
        "C++ compiler",
        "The C++ compiler to use (e.g. g++, clang++, or a full path)",
        "g++"
    );
    tool!(
        CPP_FLAGS,
        "cpp_flags",
        "C++ compiler flags",
        "Additional flags passed to the compiler (e.g. -std=c++17 -O2)",
        "-std=c++17"
    );

    custom_command!(GO_CUSTOM_COMMAND, "go_custom_command", "Go", "cd {dir} && go run {file} {args}");
    tool!(
        GO_COMMAND,
        "go_command",
        "Go command",
        "The Go command to use (e.g. go, or a full path)",
        "go"
    );

    custom_command!(
        RUST_CUSTOM_COMMAND,
        "rust_custom_command",
        "Rust",
        "rustc {file} -o {file}.out && {file}.out {args}"
    );
    tool!(
        CARGO_COMMAND,
        "cargo_command",
        "Cargo command",
        "The Cargo command to use (e.g. cargo, or a full path). Only used if custom command is empty.",
        "cargo"
    );
    tool!(
        RUST_EDITION,
        "rust_edition",
        "Rust edition",
        "Rust edition to use (e.g. 2021, 2018, 2015). Only used if custom command is empty.",
        "2021"
    );

    custom_command!(
        JAVA_CUSTOM_COMMAND,
        "java_custom_command",
        "Java",
        "cp {file} {dir}/Main.java && javac {dir}/Main.java && java -cp {dir} Main {args}"
    );
    tool!(
        JAVAC_COMMAND,
        "javac_command",
        "Java compiler",
        "The Java compiler to use (e.g. javac, or a full path). Only used if custom command is empty.",
        "javac"
    );
    tool!(
        JAVA_COMMAND,
        "java_command",
        "Java runtime",
        "The Java runtime to use (e.g. java, or a full path). Only used if custom command is empty.",
        "java"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_lowercase_and_non_empty() {
        for language in Language::ALL {
            assert!(!language.ids().is_empty(), "{language} has no ids");
            for id in language.ids() {
                assert_eq!(*id, id.to_lowercase(), "{language} id {id} is not lowercase");
            }
        }
    }

    #[test]
    fn every_language_declares_its_custom_command() {
        for language in Language::ALL {
            let custom = language.custom_command_field();
            assert!(custom.multiline);
            assert_eq!(custom.default, "");
            assert!(
                language.config_fields().contains(custom),
                "{language} does not list {}",
                custom.key
            );
        }
    }

    #[test]
    fn field_keys_are_unique() {
        let mut seen = HashSet::new();
        for language in Language::ALL {
            for field in language.config_fields() {
                assert!(seen.insert(field.key), "duplicate key {}", field.key);
            }
        }
    }

    #[test]
    fn custom_command_help_documents_placeholders() {
        let help = fields::RUST_CUSTOM_COMMAND.help;
        assert!(help.contains("{file}"));
        assert!(help.contains("{args}"));
        assert!(help.contains("{dir}"));
    }
}
