use crate::error::{NcoError, Result};
use crate::lexer;
use crate::registry::{FlagRule, Operation, OptionRule};
use crate::request::{OptionValue, Request};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// A condition worth telling the caller about that does not stop the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The output overwrites one of the inputs while writing directly to disk
    /// without staging the file in RAM.
    InPlaceOverwrite { path: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::InPlaceOverwrite { path } => write!(
                f,
                "{path} is both input and output with --no_tmp_fl; \
                 add --create_ram or --open_ram to avoid corrupting it"
            ),
        }
    }
}

/// A fully synthesized external command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub operation: Operation,
    /// Executable name or explicit path.
    pub program: String,
    /// Complete argument vector: flags, raw options, inputs, output.
    pub args: Vec<String>,
    pub inputs: Vec<String>,
    pub output: Option<String>,
    pub working_dir: PathBuf,
    pub advisories: Vec<Advisory>,
}

impl Invocation {
    /// The flag part of the argument vector, without inputs and output.
    ///
    /// Empty if the fields were edited so that `args` is shorter than the positionals.
    pub fn flags(&self) -> &[String] {
        let positional = self.inputs.len() + usize::from(self.output.is_some());
        &self.args[..self.args.len().saturating_sub(positional)]
    }

    /// Renders the command the way it would be typed in a POSIX shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=.,:/+%@".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

// Literal patterns; building them cannot fail.
static DIRECT_WRITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--?no_tmp_fl$").expect("valid no_tmp_fl pattern"));

static RAM_STAGING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--?(create_ram|open_ram|diskless_all)$").expect("valid RAM staging pattern")
});

/// Builds the argument vector for `operation` from `request`.
///
/// Order is fixed: named-option flags in registry order, then raw option tokens as
/// written, then inputs in the given order, then the output. For switches that share
/// a token (`append`/`apn`) the token is emitted once if any of them is truthy.
///
/// Nothing is spawned here, so a configuration error never has side effects.
pub fn synthesize(
    operation: Operation,
    request: &Request,
    program: String,
    working_dir: PathBuf,
) -> Result<Invocation> {
    let spec = operation.spec();

    if let Some((key, _)) = request.values().find(|(key, _)| !spec.recognizes(key)) {
        return Err(NcoError::UnrecognizedOption {
            operation: spec.program,
            key: key.to_string(),
        });
    }

    let mut args = Vec::new();
    let mut emitted_switches: Vec<&'static str> = Vec::new();
    for rule in spec.rules() {
        if let Some(value) = request.get(rule.key) {
            emit(spec.program, rule, value, &mut args, &mut emitted_switches)?;
        }
    }

    let raw_tokens = match &request.raw {
        Some(raw) => lexer::split_into_tokens(raw)?,
        None => Vec::new(),
    };
    args.extend(raw_tokens.iter().cloned());

    let inputs = request.input.paths().to_vec();
    args.extend(inputs.iter().cloned());
    if let Some(output) = &request.output {
        args.push(output.clone());
    }

    let advisories = check_in_place(request, &raw_tokens);
    for advisory in &advisories {
        warn!(operation = spec.program, "{advisory}");
    }

    Ok(Invocation {
        operation,
        program,
        args,
        inputs,
        output: request.output.clone(),
        working_dir,
        advisories,
    })
}

fn emit(
    operation: &'static str,
    rule: &OptionRule,
    value: &OptionValue,
    args: &mut Vec<String>,
    emitted_switches: &mut Vec<&'static str>,
) -> Result<()> {
    let invalid = |reason: String| NcoError::InvalidOptionValue {
        operation,
        key: rule.key.to_string(),
        reason,
    };

    match rule.rule {
        FlagRule::Switch(token) => {
            if value.is_truthy() && !emitted_switches.contains(&token) {
                emitted_switches.push(token);
                args.push(token.to_string());
            }
        }
        FlagRule::Joined(prefix) => {
            for v in scalar_values(value).map_err(invalid)? {
                args.push(format!("{prefix}{v}"));
            }
        }
        FlagRule::Separate(flag) => {
            for v in scalar_values(value).map_err(invalid)? {
                args.push(flag.to_string());
                args.push(v);
            }
        }
        FlagRule::Choice { prefix, choices } => {
            for v in scalar_values(value).map_err(invalid)? {
                if !choices.contains(&v.as_str()) {
                    return Err(invalid(format!(
                        "`{v}` is not one of {}",
                        choices.join(", ")
                    )));
                }
                args.push(format!("{prefix}{v}"));
            }
        }
    }
    Ok(())
}

fn scalar_values(value: &OptionValue) -> std::result::Result<Vec<String>, String> {
    match value {
        OptionValue::Bool(b) => Err(format!("expected a value, got boolean {b}")),
        OptionValue::Int(n) => Ok(vec![n.to_string()]),
        OptionValue::Text(s) => Ok(vec![s.clone()]),
        OptionValue::List(v) => Ok(v.clone()),
    }
}

fn check_in_place(request: &Request, raw_tokens: &[String]) -> Vec<Advisory> {
    let Some(output) = &request.output else {
        return Vec::new();
    };
    if !request.input.paths().contains(output) {
        return Vec::new();
    }

    let keyword = |key: &str| request.get(key).is_some_and(OptionValue::is_truthy);
    let direct = keyword("no_tmp_fl") || raw_tokens.iter().any(|t| DIRECT_WRITE.is_match(t));
    let staged = keyword("create_ram")
        || keyword("open_ram")
        || raw_tokens.iter().any(|t| RAM_STAGING.is_match(t));

    if direct && !staged {
        vec![Advisory::InPlaceOverwrite {
            path: output.clone(),
        }]
    } else {
        Vec::new()
    }
}
