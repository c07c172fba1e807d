//! Type descriptors: how text becomes a value of one semantic type.
//!
//! A [`TypeDescriptor`] is an immutable, copyable description shared by every
//! argument of that type. The registry never inspects values itself; it only
//! asks the descriptor to parse text. Defaults go through the same parse
//! function as command-line tokens, so a default always means exactly what
//! the same text would mean on the command line.
//!
//! The built-in descriptors are [`BOOLEAN`], [`INTEGER`], [`DOUBLE`],
//! [`TEXT`], [`FLAG`] and [`HELP`]. Domain types (enum-like choices and the
//! like) are added with [`TypeDescriptor::new`].

use std::fmt;
use std::num::IntErrorKind;

use crate::error::ValueError;

/// Where a piece of text handed to a parse function came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The default literal given at declaration time.
    Default,
    /// A token from the command line.
    CommandLine,
}

/// Input to a parse function.
#[derive(Debug, Clone, Copy)]
pub struct RawValue<'a> {
    /// The text to convert. For flags seen on the command line this is the
    /// argument's own name token and is ignored.
    pub text: &'a str,
    /// Default literal of the argument being parsed, if any.
    pub default: Option<&'a str>,
    /// Whether `text` is the default or a command-line token.
    pub source: ValueSource,
    /// Maximum number of bytes a text value may keep.
    pub max_len: usize,
}

/// Parse function stored in a [`TypeDescriptor`].
pub type ParseFn<T> = fn(&RawValue<'_>) -> Result<T, ValueError>;

/// How the parser treats tokens for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Consumes one value token per occurrence.
    Value,
    /// Consumes no value token; presence negates the default.
    Flag,
    /// A flag whose presence ends parsing successfully without validation.
    Help,
}

/// Describes one semantic value type.
///
/// # Examples
///
/// A user-defined type for an enum-like choice:
///
/// ```
/// use argbind_core::{RawValue, Registry, TypeDescriptor, ValueError};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Wave {
///     Sine,
///     Noise,
/// }
///
/// fn parse_wave(raw: &RawValue<'_>) -> Result<Wave, ValueError> {
///     match raw.text {
///         "sine" => Ok(Wave::Sine),
///         "noise" => Ok(Wave::Noise),
///         other => Err(ValueError::Custom(format!("unknown wave '{other}'"))),
///     }
/// }
///
/// const WAVE: TypeDescriptor<Wave> = TypeDescriptor::new("wave", "(sine|noise)", parse_wave);
///
/// let mut registry = Registry::new();
/// let wave = registry.declare("mode", "Wave generator", &WAVE, Some("sine"));
/// registry.parse(["prog", "-mode", "noise"]).unwrap();
/// assert_eq!(registry.get(wave), Some(&Wave::Noise));
/// ```
pub struct TypeDescriptor<T> {
    name: &'static str,
    format_hint: &'static str,
    kind: TypeKind,
    allow_multiple: bool,
    parse: ParseFn<T>,
}

impl<T> TypeDescriptor<T> {
    /// Creates a descriptor for a value-taking type.
    pub const fn new(name: &'static str, format_hint: &'static str, parse: ParseFn<T>) -> Self {
        Self::with_kind(name, format_hint, TypeKind::Value, parse)
    }

    const fn with_kind(
        name: &'static str,
        format_hint: &'static str,
        kind: TypeKind,
        parse: ParseFn<T>,
    ) -> Self {
        Self {
            name,
            format_hint,
            kind,
            allow_multiple: false,
            parse,
        }
    }

    /// Semantic name, e.g. `"integer"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable format hint shown in help, e.g. `"(number)"`.
    pub fn format_hint(&self) -> &'static str {
        self.format_hint
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// `true` for types that consume no value token (flags and help).
    pub fn is_flag(&self) -> bool {
        matches!(self.kind, TypeKind::Flag | TypeKind::Help)
    }

    pub fn is_help(&self) -> bool {
        self.kind == TypeKind::Help
    }

    /// `true` if this descriptor backs a list argument.
    pub fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// Adapts this descriptor into "list of T", or `None` for flag types.
    pub fn try_list_of(&self) -> Option<Self> {
        if self.is_flag() {
            return None;
        }
        Some(Self {
            allow_multiple: true,
            ..*self
        })
    }

    /// Adapts this descriptor into "list of T".
    ///
    /// # Panics
    ///
    /// Panics for flag types; a flag consumes no token, so there is nothing
    /// to accumulate.
    pub fn list_of(&self) -> Self {
        match self.try_list_of() {
            Some(list) => list,
            None => panic!("'{}' is a flag type and cannot back a list", self.name),
        }
    }

    /// Runs the parse function.
    pub fn parse(&self, raw: &RawValue<'_>) -> Result<T, ValueError> {
        (self.parse)(raw)
    }
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypeDescriptor<T> {}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("format_hint", &self.format_hint)
            .field("kind", &self.kind)
            .field("allow_multiple", &self.allow_multiple)
            .finish()
    }
}

/// `true` or `false`, case-sensitive.
pub const BOOLEAN: TypeDescriptor<bool> =
    TypeDescriptor::new("boolean", "(false|true)", parse_bool);

/// Base-10 signed integer.
pub const INTEGER: TypeDescriptor<i64> = TypeDescriptor::new("integer", "(number)", parse_integer);

/// Base-10 floating point number.
pub const DOUBLE: TypeDescriptor<f64> =
    TypeDescriptor::new("double", "(decimal number)", parse_double);

/// Text, truncated to the configured maximum value length.
pub const TEXT: TypeDescriptor<String> = TypeDescriptor::new("text", "(text)", parse_text);

/// Boolean switch; presence flips the declared default.
pub const FLAG: TypeDescriptor<bool> =
    TypeDescriptor::with_kind("flag", "", TypeKind::Flag, parse_flag);

/// Help switch; presence stops parsing and skips validation.
pub const HELP: TypeDescriptor<bool> =
    TypeDescriptor::with_kind("help", "", TypeKind::Help, parse_flag);

fn parse_bool(raw: &RawValue<'_>) -> Result<bool, ValueError> {
    match raw.text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ValueError::InvalidBoolean),
    }
}

fn parse_integer(raw: &RawValue<'_>) -> Result<i64, ValueError> {
    raw.text.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::IntegerOutOfRange,
        _ => ValueError::InvalidInteger,
    })
}

fn parse_double(raw: &RawValue<'_>) -> Result<f64, ValueError> {
    let value = raw
        .text
        .parse::<f64>()
        .map_err(|_| ValueError::InvalidNumber)?;
    if !value.is_finite() {
        return Err(ValueError::NumberOutOfRange);
    }
    Ok(value)
}

fn parse_text(raw: &RawValue<'_>) -> Result<String, ValueError> {
    let mut end = raw.text.len().min(raw.max_len);
    // Never split a multi-byte character.
    while !raw.text.is_char_boundary(end) {
        end -= 1;
    }
    Ok(raw.text[..end].to_string())
}

fn parse_flag(raw: &RawValue<'_>) -> Result<bool, ValueError> {
    let default = match raw.source {
        ValueSource::Default => raw.text,
        ValueSource::CommandLine => raw.default.unwrap_or_default(),
    };
    let value = match default {
        "true" => true,
        "false" => false,
        other => return Err(ValueError::InvalidFlagDefault(other.to_string())),
    };
    match raw.source {
        ValueSource::Default => Ok(value),
        ValueSource::CommandLine => Ok(!value),
    }
}
