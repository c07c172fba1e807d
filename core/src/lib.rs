//! Declare typed command-line arguments, parse `argv` against them, and
//! validate required and conditional constraints.
//!
//! This crate is built around a [`Registry`]:
//!
//! - [`Registry::declare`] registers a named argument with a
//!   [`TypeDescriptor`] and an optional default, and returns a typed
//!   [`Arg`] handle.
//! - [`Registry::declare_list`] registers an argument that collects every
//!   value after its name into a [`ListArg`].
//! - [`Registry::declare_conditional`] registers an argument that only
//!   applies while a [`Condition`] on another argument holds.
//! - [`Registry::parse`] binds the command line and checks that every
//!   enabled argument has a value and no disabled one was given.
//! - [`Registry::render_help`] lists the declarations.
//!
//! Built-in types are [`BOOLEAN`], [`INTEGER`], [`DOUBLE`], [`TEXT`],
//! [`FLAG`] (presence flips its default) and [`HELP`] (presence skips
//! validation). Tunables such as the prefix character live in
//! [`ParserConfig`].
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! let mut registry = Registry::new();
//! let outfile = registry.declare("out", "Output file path", &TEXT, Some("test.ppm"));
//! let gain = registry.declare("gain", "Gain of the amplifier", &INTEGER, Some("0"));
//! let root = registry.declare("R", "Run as root", &FLAG, Some("false"));
//! let inputs = registry.declare_list("I", "Input files", &TEXT);
//!
//! registry
//!     .parse(["synth", "-gain", "3", "-R", "-I", "a.wav", "b.wav"])
//!     .unwrap();
//!
//! assert_eq!(registry.get(outfile).unwrap(), "test.ppm");
//! assert_eq!(registry.get(gain), Some(&3));
//! assert!(registry.is_set(root));
//! assert_eq!(registry.values(inputs).len(), 2);
//!
//! let err = registry.parse(["synth", "-gain", "loud"]).unwrap_err();
//! assert_eq!(err.to_string(), "invalid value for argument '-gain': 'loud' (not a base-10 integer)");
//! ```

mod config;
mod error;
mod help;
mod parser;
mod registry;
mod store;
mod types;

pub use config::{
    DEFAULT_LIST_CAPACITY, DEFAULT_MAX_DESCRIPTION_LEN, DEFAULT_MAX_NAME_LEN,
    DEFAULT_MAX_VALUE_LEN, ParserConfig,
};
pub use error::{ConfigError, ParseError, Result, SettingsError, ValueError};
pub use registry::{Arg, ArgId, ArgumentInfo, Condition, Handle, ListArg, Predicate, Registry};
pub use types::{
    BOOLEAN, DOUBLE, FLAG, HELP, INTEGER, ParseFn, RawValue, TEXT, TypeDescriptor, TypeKind,
    ValueSource,
};
