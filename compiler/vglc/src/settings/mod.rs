//! Host settings, parsed from command-line style flags.
//!
//! Flags:
//!
//! - `-v`, `-vv`, `--verbose`: raise log verbosity (repeatable)
//! - `-i`, `--interactive`: run as an interactive session
//! - `-l`, `--listvariables`: list global variables and functions
//! - `--trace`: log every executed instruction
//! - `--globals=N`: size of the globals frame
//! - `--max-depth=N|none`: override the call depth limit
//!
//! Anything not starting with `-` is an input. With no inputs the session is
//! interactive.

use std::fmt;

use vgl_vm::{ExecMode, InterpreterBuilder, DEFAULT_GLOBALS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub verbosity: u8,
    pub interactive: bool,
    pub list_variables: bool,
    pub trace_instructions: bool,
    /// Size of the globals frame, and so the number of global variables.
    pub globals: usize,
    /// `None` keeps the mode's limit; `Some(None)` removes the limit.
    pub max_call_depth: Option<Option<usize>>,
    pub inputs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            verbosity: 0,
            interactive: false,
            list_variables: false,
            trace_instructions: false,
            globals: DEFAULT_GLOBALS,
            max_call_depth: None,
            inputs: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsError {
    UnknownFlag(String),
    InvalidValue { flag: &'static str, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown option '{flag}'"),
            Self::InvalidValue { flag, value } => {
                write!(f, "invalid value '{value}' for {flag}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

fn parse_count(flag: &'static str, value: &str) -> Result<usize, SettingsError> {
    value.parse().map_err(|_| SettingsError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

impl Settings {
    pub fn parse<I, S>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Settings::default();
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--verbose" => settings.verbosity = settings.verbosity.saturating_add(1),
                "-i" | "--interactive" => settings.interactive = true,
                "-l" | "--listvariables" => settings.list_variables = true,
                "--trace" => settings.trace_instructions = true,
                _ => {
                    if let Some(vs) = arg.strip_prefix('-').filter(|rest| {
                        !rest.is_empty() && rest.chars().all(|c| c == 'v')
                    }) {
                        let n = u8::try_from(vs.len()).unwrap_or(u8::MAX);
                        settings.verbosity = settings.verbosity.saturating_add(n);
                    } else if let Some(n) = arg.strip_prefix("--globals=") {
                        settings.globals = parse_count("--globals", n)?;
                    } else if let Some(n) = arg.strip_prefix("--max-depth=") {
                        settings.max_call_depth = Some(if n == "none" {
                            None
                        } else {
                            Some(parse_count("--max-depth", n)?)
                        });
                    } else if arg.starts_with('-') {
                        return Err(SettingsError::UnknownFlag(arg.to_string()));
                    } else {
                        settings.inputs.push(arg.to_string());
                    }
                }
            }
        }
        if settings.inputs.is_empty() {
            settings.interactive = true;
        }
        Ok(settings)
    }

    pub fn mode(&self) -> ExecMode {
        if self.interactive {
            ExecMode::Interactive
        } else {
            ExecMode::Batch
        }
    }

    /// Interpreter configured from these settings.
    pub fn interpreter(&self) -> InterpreterBuilder {
        let builder = InterpreterBuilder::new()
            .mode(self.mode())
            .globals(self.globals)
            .trace_instructions(self.trace_instructions);
        match self.max_call_depth {
            Some(limit) => builder.max_call_depth(limit),
            None => builder,
        }
    }

    /// Log filter implied by the verbosity, used when no log environment
    /// variable is set.
    pub fn log_directive(&self) -> Option<&'static str> {
        match self.verbosity {
            0 => None,
            1 => Some("vglc=info"),
            2 => Some("vglc=debug,vgl_vm=debug"),
            _ => Some("trace"),
        }
    }
}
