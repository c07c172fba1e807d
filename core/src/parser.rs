//! Single-pass command-line parser and constraint validation.
//!
//! Tokens are classified one at a time. A token starting with the prefix
//! character names an argument; anything else is a value for the argument
//! named last. Flags take no value, scalars take exactly one, lists take
//! every value up to the next name.
//!
//! Once every token is bound, each argument is checked in declaration order:
//! an enabled argument must be provided, and a disabled argument must not
//! have been named. A help-type argument ends parsing early and skips these
//! checks.
//!
//! Parsing is not transactional. Values bound before a failure stay bound.

use tracing::{debug, trace};

use crate::error::{ParseError, Result};
use crate::registry::Registry;
use crate::types::{RawValue, TypeKind, ValueSource};

/// What the next bare token would bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// No argument is waiting; a bare token is an error.
    Name,
    /// A scalar argument needs exactly one value.
    Value(usize),
    /// A list argument takes any number of values.
    Values(usize),
}

impl Registry {
    /// Parses `args` against the declared arguments.
    ///
    /// The first item is the program name and is skipped. The registry is
    /// [`reset`](Registry::reset) first, so a registry can parse more than
    /// once.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered: an unknown name, a
    /// stray or missing value, a value the argument's type rejects, a
    /// required argument left out, or an argument given while disabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{ParseError, Registry, BOOLEAN, TEXT};
    ///
    /// let mut registry = Registry::new();
    /// let name = registry.declare("A", "Name", &TEXT, None);
    /// let loud = registry.declare("C", "Shout", &BOOLEAN, Some("false"));
    ///
    /// registry.parse(["prog", "-A", "abc", "-C", "true"]).unwrap();
    /// assert_eq!(registry.get(name).map(String::as_str), Some("abc"));
    /// assert!(registry.is_set(loud));
    ///
    /// assert_eq!(
    ///     registry.parse(["prog", "-C", "true"]),
    ///     Err(ParseError::MissingRequired("-A".into()))
    /// );
    /// ```
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();

        let mut expect = Expect::Name;
        for token in args.into_iter().skip(1) {
            let token = token.as_ref();

            if token.starts_with(self.config.prefix) {
                let found = self.position(token);
                let is_help = found.is_some_and(|index| self.args[index].kind == TypeKind::Help);
                if let (Expect::Value(pending), false) = (expect, is_help) {
                    return Err(ParseError::MissingValue(self.args[pending].name.clone()));
                }
                let index =
                    found.ok_or_else(|| ParseError::UnknownArgument(token.to_string()))?;
                self.args[index].dirty = true;
                trace!(name = token, "Matched argument");

                let (kind, list) = (self.args[index].kind, self.args[index].list);
                expect = match kind {
                    TypeKind::Help => {
                        self.bind(index, token)?;
                        self.help_requested = true;
                        debug!(name = token, "Help requested, skipping validation");
                        return Ok(());
                    }
                    TypeKind::Flag => {
                        self.bind(index, token)?;
                        Expect::Name
                    }
                    TypeKind::Value if list => Expect::Values(index),
                    TypeKind::Value => Expect::Value(index),
                };
                continue;
            }

            expect = match expect {
                Expect::Name => return Err(ParseError::UnexpectedValue(token.to_string())),
                Expect::Value(index) => {
                    self.bind(index, token)?;
                    Expect::Name
                }
                Expect::Values(index) => {
                    self.bind(index, token)?;
                    Expect::Values(index)
                }
            };
        }

        if let Expect::Value(index) = expect {
            return Err(ParseError::MissingValue(self.args[index].name.clone()));
        }

        self.validate()
    }

    /// Parses the current process arguments.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Registry::parse).
    pub fn parse_env(&mut self) -> Result<()> {
        let args: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.parse(args)
    }

    /// Runs one token through the argument's type and marks it provided.
    fn bind(&mut self, index: usize, token: &str) -> Result<()> {
        let max_len = self.config.max_value_len;
        let arg = &mut self.args[index];
        let raw = RawValue {
            text: token,
            default: arg.default.as_deref(),
            source: ValueSource::CommandLine,
            max_len,
        };
        arg.store
            .bind(&raw)
            .map_err(|source| ParseError::InvalidValue {
                name: arg.name.clone(),
                value: token.to_string(),
                source,
            })?;
        arg.provided = true;
        trace!(name = %arg.name, value = token, "Bound value");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (index, arg) in self.args.iter().enumerate() {
            let enabled = self.enabled_at(index);
            if enabled && !arg.is_provided() {
                debug!(name = %arg.name, "Required argument missing");
                return Err(ParseError::MissingRequired(arg.name.clone()));
            }
            if !enabled && arg.dirty {
                debug!(name = %arg.name, "Argument given while disabled");
                return Err(ParseError::NoEffect(arg.name.clone()));
            }
        }
        Ok(())
    }
}
