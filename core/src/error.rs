//! Error types for argument declaration, value parsing, and command-line
//! parsing.
//!
//! Failures fall into three classes:
//!
//! - [`ConfigError`]: the caller declared arguments incorrectly. These are
//!   programmer errors; the panicking `declare*` methods abort with the
//!   message, the `try_declare*` methods hand it back.
//! - [`ValueError`]: a single piece of text could not be converted by a
//!   [`TypeDescriptor`](crate::TypeDescriptor).
//! - [`ParseError`]: the command line does not satisfy the declarations.
//!   Always recoverable; the caller decides what to do with the process.

use thiserror::Error;

/// Why a piece of text could not be turned into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Booleans accept exactly `true` or `false`.
    #[error("expected 'true' or 'false'")]
    InvalidBoolean,
    /// Text is not a base-10 integer.
    #[error("not a base-10 integer")]
    InvalidInteger,
    /// Text is a base-10 integer that does not fit the target type.
    #[error("integer out of range")]
    IntegerOutOfRange,
    /// Text is not a decimal number.
    #[error("not a decimal number")]
    InvalidNumber,
    /// Decimal number overflowed to infinity or is not finite.
    #[error("decimal number out of range")]
    NumberOutOfRange,
    /// A flag was configured with a default other than `true`/`false`.
    #[error("flag default must be 'true' or 'false', got '{0}'")]
    InvalidFlagDefault(String),
    /// Failure reported by a user-defined type.
    #[error("{0}")]
    Custom(String),
}

/// Mistakes in an argument declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Argument name is empty.
    #[error("argument name cannot be empty")]
    EmptyName,
    /// Prefixed argument name is longer than the configured maximum.
    #[error("argument name '{name}' is longer than {max} characters")]
    NameTooLong { name: String, max: usize },
    /// Another argument already uses this prefixed name.
    #[error("argument '{0}' is declared more than once")]
    DuplicateName(String),
    /// The configured hard cap on declared arguments was reached.
    #[error("too many arguments declared (limit is {0})")]
    TooManyArguments(usize),
    /// Flags negate their default, so one is mandatory.
    #[error("flag argument '{0}' must have a default value")]
    FlagWithoutDefault(String),
    /// Flag default was something other than `true`/`false`.
    #[error("flag argument '{name}' has default '{default}', expected 'true' or 'false'")]
    InvalidFlagDefault { name: String, default: String },
    /// Flags take no value token and cannot be accumulated.
    #[error("list argument '{0}' cannot be built from a flag type")]
    ListOfFlags(String),
    /// A list descriptor was handed to a scalar declaration.
    #[error("argument '{0}' uses a list type; declare it as a list")]
    ListTypeInScalarDeclaration(String),
    /// The default literal does not parse with the argument's own type.
    #[error("argument '{name}' has invalid default '{default}': {source}")]
    InvalidDefault {
        name: String,
        default: String,
        #[source]
        source: ValueError,
    },
    /// A parent handle does not belong to this registry session.
    #[error("parent handle does not belong to this registry")]
    StaleHandle,
}

/// Reasons a command line was rejected.
///
/// Every variant carries the argument name and, where there is one, the
/// offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A prefixed token matched no declared argument.
    #[error("argument '{0}' is unknown")]
    UnknownArgument(String),
    /// A bare token appeared with no argument waiting for it.
    #[error("value '{0}' was given without a preceding argument name")]
    UnexpectedValue(String),
    /// A scalar argument name was not followed by its value.
    #[error("argument '{0}' expects a value")]
    MissingValue(String),
    /// The argument's type rejected the token.
    #[error("invalid value for argument '{name}': '{value}' ({source})")]
    InvalidValue {
        name: String,
        value: String,
        #[source]
        source: ValueError,
    },
    /// An enabled argument ended the pass without a value.
    #[error("argument '{0}' is required but was not provided")]
    MissingRequired(String),
    /// An argument was given although its condition does not hold.
    #[error("argument '{0}' has no effect")]
    NoEffect(String),
}

impl ParseError {
    /// Name of the argument (or the stray token) the error is about.
    pub fn argument(&self) -> &str {
        match self {
            Self::UnknownArgument(name)
            | Self::UnexpectedValue(name)
            | Self::MissingValue(name)
            | Self::MissingRequired(name)
            | Self::NoEffect(name) => name,
            Self::InvalidValue { name, .. } => name,
        }
    }
}

/// Failures loading a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Values that parse but cannot be used.
    #[error("invalid parser config: {0}")]
    Invalid(String),
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
