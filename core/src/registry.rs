//! The argument registry: declarations, typed handles, and enablement.
//!
//! A [`Registry`] owns every declared argument in declaration order. Each
//! declaration returns a typed handle ([`Arg`] or [`ListArg`]) that stays
//! valid until [`Registry::cleanup`] starts a fresh session. Conditional
//! arguments point at their parent by index, so the registry can grow
//! freely.
//!
//! # Examples
//!
//! ```
//! use argbind_core::{Condition, Registry, FLAG, TEXT};
//!
//! let mut registry = Registry::new();
//! let stdin_key = registry.declare("K", "Read the key from stdin", &FLAG, Some("false"));
//! let key = registry.declare_conditional(
//!     Condition::when(stdin_key, move |r| !r.is_set(stdin_key)).describe("When -K is false"),
//!     "k",
//!     "16 byte key",
//!     &TEXT,
//!     None,
//! );
//!
//! registry.parse(["tea", "-k", "secret"]).unwrap();
//! assert_eq!(registry.get(key).map(String::as_str), Some("secret"));
//!
//! // With -K the key argument is switched off, and giving it is an error.
//! assert!(registry.parse(["tea", "-K", "-k", "secret"]).is_err());
//! assert!(registry.parse(["tea", "-K"]).is_ok());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::ConfigError;
use crate::store::{List, Scalar, ValueStore};
use crate::types::{TypeDescriptor, TypeKind};

/// Enablement predicate for a conditional argument.
pub type Predicate = Box<dyn Fn(&Registry) -> bool>;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Untyped identity of a declared argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgId {
    registry: u64,
    index: usize,
    generation: u64,
}

/// Anything that identifies a declared argument.
pub trait Handle {
    fn id(&self) -> ArgId;
}

/// Handle to a single-valued argument holding a `T`.
pub struct Arg<T> {
    id: ArgId,
    _marker: PhantomData<fn() -> T>,
}

/// Handle to a list argument holding zero or more `T`.
pub struct ListArg<T> {
    id: ArgId,
    _marker: PhantomData<fn() -> T>,
}

macro_rules! impl_handle {
    ($handle:ident) => {
        impl<T> $handle<T> {
            fn new(id: ArgId) -> Self {
                Self {
                    id,
                    _marker: PhantomData,
                }
            }
        }

        impl<T> Handle for $handle<T> {
            fn id(&self) -> ArgId {
                self.id
            }
        }

        impl<T> Clone for $handle<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $handle<T> {}

        impl<T> PartialEq for $handle<T> {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl<T> Eq for $handle<T> {}

        impl<T> fmt::Debug for $handle<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("index", &self.id.index)
                    .field("generation", &self.id.generation)
                    .finish()
            }
        }
    };
}

impl_handle!(Arg);
impl_handle!(ListArg);

/// Activation condition for a conditional argument.
///
/// Built with [`Condition::when`] for a single-valued parent,
/// [`Condition::non_empty`] for a list parent, or [`Condition::predicate`]
/// when no single argument drives the condition.
pub struct Condition {
    parent: Option<ArgId>,
    predicate: Option<Predicate>,
    description: Option<String>,
}

impl Condition {
    /// Enabled while `predicate` holds and `parent` is itself enabled and
    /// has a value.
    pub fn when<P>(parent: Arg<P>, predicate: impl Fn(&Registry) -> bool + 'static) -> Self {
        Self {
            parent: Some(parent.id),
            predicate: Some(Box::new(predicate)),
            description: None,
        }
    }

    /// Enabled while the `parent` list holds at least one value.
    pub fn non_empty<P>(parent: ListArg<P>) -> Self {
        Self {
            parent: Some(parent.id),
            predicate: None,
            description: None,
        }
    }

    /// Enabled while `predicate` holds, with no parent argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{Condition, Registry, FLAG, TEXT};
    ///
    /// let mut registry = Registry::new();
    /// let quiet = registry.declare("q", "Quiet", &FLAG, Some("false"));
    /// let log = registry.declare("l", "Log file", &TEXT, Some("out.log"));
    /// registry.declare_conditional(
    ///     Condition::predicate(move |r| !r.is_set(quiet) && r.get(log).is_some()),
    ///     "v",
    ///     "Verbose",
    ///     &FLAG,
    ///     Some("false"),
    /// );
    ///
    /// assert!(registry.parse(["prog", "-v"]).is_ok());
    /// assert!(registry.parse(["prog", "-q", "-v"]).is_err());
    /// ```
    pub fn predicate(predicate: impl Fn(&Registry) -> bool + 'static) -> Self {
        Self {
            parent: None,
            predicate: Some(Box::new(predicate)),
            description: None,
        }
    }

    /// Attaches a human-readable description, e.g. `"When -e is false"`.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("parent", &self.parent)
            .field("has_predicate", &self.predicate.is_some())
            .field("description", &self.description)
            .finish()
    }
}

pub(crate) struct Enablement {
    pub(crate) parent: Option<usize>,
    /// `None` with a parent means the parent is a list and must be non-empty.
    pub(crate) predicate: Option<Predicate>,
    pub(crate) description: Option<String>,
}

/// One declared argument and its owned value store.
pub(crate) struct ArgumentDescriptor {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) default: Option<String>,
    pub(crate) type_name: &'static str,
    pub(crate) format_hint: &'static str,
    pub(crate) kind: TypeKind,
    pub(crate) list: bool,
    /// Lists only: at least one value is needed while enabled.
    pub(crate) non_empty: bool,
    pub(crate) store: Box<dyn ValueStore>,
    /// Scalars only: a value is bound, from the default or the command line.
    pub(crate) provided: bool,
    pub(crate) dirty: bool,
    pub(crate) enablement: Option<Enablement>,
}

impl ArgumentDescriptor {
    pub(crate) fn is_provided(&self) -> bool {
        if self.list {
            !self.non_empty || self.store.len() > 0
        } else {
            self.provided
        }
    }

    fn is_required(&self) -> bool {
        if self.list {
            self.non_empty
        } else {
            self.default.is_none()
        }
    }
}

/// Read-only view of one declared argument, for help output and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentInfo<'a> {
    /// Prefixed name, e.g. `-A`.
    pub name: &'a str,
    pub description: &'a str,
    /// Semantic type name, e.g. `integer`.
    pub type_name: &'static str,
    pub format_hint: &'static str,
    pub default: Option<&'a str>,
    pub is_flag: bool,
    pub is_help: bool,
    pub is_list: bool,
    pub is_conditional: bool,
    /// Human-readable activation condition, if one was given.
    pub condition: Option<&'a str>,
    /// Needs a value whenever it is enabled.
    pub required: bool,
    pub enabled: bool,
    pub provided: bool,
    pub dirty: bool,
    /// Number of values currently held.
    pub value_count: usize,
}

/// Ordered collection of declared arguments.
///
/// The registry is the whole parse session: declare arguments, call
/// [`parse`](Registry::parse), read values through the handles, and call
/// [`cleanup`](Registry::cleanup) to start over.
pub struct Registry {
    pub(crate) config: ParserConfig,
    pub(crate) args: Vec<ArgumentDescriptor>,
    pub(crate) help_requested: bool,
    id: u64,
    generation: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with default tunables.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates an empty registry with the given tunables.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            args: Vec::new(),
            help_requested: false,
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Number of declared arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// `true` if the last [`parse`](Registry::parse) stopped at a help-type
    /// argument.
    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// Declares a single-valued argument.
    ///
    /// `name` is given without the prefix. A `None` default makes the
    /// argument required. Flags need a default of `"true"` or `"false"`.
    ///
    /// # Panics
    ///
    /// Panics with the [`ConfigError`] message if the declaration is invalid;
    /// see [`try_declare`](Registry::try_declare).
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{Registry, INTEGER};
    ///
    /// let mut registry = Registry::new();
    /// let gain = registry.declare("B", "Gain", &INTEGER, Some("13"));
    /// registry.parse(["prog"]).unwrap();
    /// assert_eq!(registry.get(gain), Some(&13));
    /// ```
    pub fn declare<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        default: Option<&str>,
    ) -> Arg<T> {
        unwrap_declaration(self.try_declare(name, description, ty, default))
    }

    /// Fallible form of [`declare`](Registry::declare).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty, overlong or duplicate name, a
    /// full registry, a list descriptor, a missing or invalid flag default,
    /// or a default that does not parse.
    pub fn try_declare<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        default: Option<&str>,
    ) -> Result<Arg<T>, ConfigError> {
        self.insert_scalar(name, description, ty, default, None)
            .map(Arg::new)
    }

    /// Declares a list argument that collects every value token after its
    /// name, in command-line order.
    ///
    /// Lists have no default and accept zero values unless
    /// [`require_non_empty`](Registry::require_non_empty) is called.
    ///
    /// # Panics
    ///
    /// Panics with the [`ConfigError`] message if the declaration is invalid;
    /// see [`try_declare_list`](Registry::try_declare_list).
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{Registry, INTEGER};
    ///
    /// let mut registry = Registry::new();
    /// let nums = registry.declare_list("B", "Numbers", &INTEGER);
    /// registry.parse(["prog", "-B", "1", "2", "3"]).unwrap();
    /// assert_eq!(registry.values(nums), &[1, 2, 3]);
    /// ```
    pub fn declare_list<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
    ) -> ListArg<T> {
        unwrap_declaration(self.try_declare_list(name, description, ty))
    }

    /// Fallible form of [`declare_list`](Registry::declare_list).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ListOfFlags`] for flag types, and the name and
    /// capacity errors of [`try_declare`](Registry::try_declare).
    pub fn try_declare_list<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
    ) -> Result<ListArg<T>, ConfigError> {
        self.insert_list(name, description, ty, None)
            .map(ListArg::new)
    }

    /// Declares a single-valued argument that only applies while
    /// `condition` holds.
    ///
    /// While enabled it behaves like any other argument (required unless it
    /// has a default). While disabled it must not appear on the command line.
    ///
    /// # Panics
    ///
    /// Panics with the [`ConfigError`] message if the declaration is invalid.
    pub fn declare_conditional<T: 'static>(
        &mut self,
        condition: Condition,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        default: Option<&str>,
    ) -> Arg<T> {
        unwrap_declaration(self.try_declare_conditional(
            condition,
            name,
            description,
            ty,
            default,
        ))
    }

    /// Fallible form of [`declare_conditional`](Registry::declare_conditional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleHandle`] if the parent belongs to an
    /// earlier session, and otherwise the errors of
    /// [`try_declare`](Registry::try_declare).
    pub fn try_declare_conditional<T: 'static>(
        &mut self,
        condition: Condition,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        default: Option<&str>,
    ) -> Result<Arg<T>, ConfigError> {
        let enablement = self.enablement(condition)?;
        self.insert_scalar(name, description, ty, default, Some(enablement))
            .map(Arg::new)
    }

    /// Declares a list argument that only applies while `condition` holds.
    ///
    /// # Panics
    ///
    /// Panics with the [`ConfigError`] message if the declaration is invalid.
    pub fn declare_conditional_list<T: 'static>(
        &mut self,
        condition: Condition,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
    ) -> ListArg<T> {
        unwrap_declaration(self.try_declare_conditional_list(condition, name, description, ty))
    }

    /// Fallible form of
    /// [`declare_conditional_list`](Registry::declare_conditional_list).
    ///
    /// # Errors
    ///
    /// Same as [`try_declare_list`](Registry::try_declare_list), plus
    /// [`ConfigError::StaleHandle`].
    pub fn try_declare_conditional_list<T: 'static>(
        &mut self,
        condition: Condition,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
    ) -> Result<ListArg<T>, ConfigError> {
        let enablement = self.enablement(condition)?;
        self.insert_list(name, description, ty, Some(enablement))
            .map(ListArg::new)
    }

    /// Makes a list argument need at least one value while enabled.
    ///
    /// Handles from an earlier session are ignored.
    pub fn require_non_empty<T>(&mut self, list: ListArg<T>) {
        if let Some(index) = self.resolve(list.id) {
            self.args[index].non_empty = true;
        }
    }

    /// Current value of a single-valued argument, or `None` if nothing is
    /// bound (or the handle is from an earlier session).
    pub fn get<T: 'static>(&self, arg: Arg<T>) -> Option<&T> {
        let index = self.resolve(arg.id)?;
        self.args[index]
            .store
            .as_any()
            .downcast_ref::<Scalar<T>>()?
            .get()
    }

    /// `true` if a boolean or flag argument currently holds `true`.
    pub fn is_set(&self, arg: Arg<bool>) -> bool {
        self.get(arg).copied().unwrap_or(false)
    }

    /// Values collected by a list argument, in command-line order.
    pub fn values<T: 'static>(&self, list: ListArg<T>) -> &[T] {
        self.resolve(list.id)
            .and_then(|index| self.args[index].store.as_any().downcast_ref::<List<T>>())
            .map(List::values)
            .unwrap_or(&[])
    }

    /// First argument whose prefixed name equals `token`.
    pub fn find_by_name(&self, token: &str) -> Option<ArgumentInfo<'_>> {
        self.position(token).map(|index| self.info_at(index))
    }

    /// The argument a handle refers to.
    pub fn find_by_handle(&self, handle: &impl Handle) -> Option<ArgumentInfo<'_>> {
        self.resolve(handle.id()).map(|index| self.info_at(index))
    }

    /// Every declared argument, in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = ArgumentInfo<'_>> + '_ {
        (0..self.args.len()).map(|index| self.info_at(index))
    }

    /// Whether the argument currently applies.
    ///
    /// Unconditional arguments are always enabled. A child of a list is
    /// enabled while the list is non-empty. A child of a single-valued
    /// argument is enabled while the parent is enabled and provided and the
    /// predicate holds. A parent-less condition is enabled while its
    /// predicate holds.
    pub fn is_enabled(&self, handle: &impl Handle) -> bool {
        self.resolve(handle.id())
            .is_some_and(|index| self.enabled_at(index))
    }

    pub fn is_provided(&self, handle: &impl Handle) -> bool {
        self.resolve(handle.id())
            .is_some_and(|index| self.args[index].is_provided())
    }

    /// Whether the argument's name appeared during the last parse.
    pub fn is_dirty(&self, handle: &impl Handle) -> bool {
        self.resolve(handle.id())
            .is_some_and(|index| self.args[index].dirty)
    }

    /// Prepares for a new parse pass without forgetting declarations.
    ///
    /// Clears dirty markers, empties lists, re-applies defaults and unbinds
    /// required values. [`parse`](Registry::parse) calls this itself.
    pub fn reset(&mut self) {
        let max_len = self.config.max_value_len;
        for arg in &mut self.args {
            arg.dirty = false;
            arg.store.reset(arg.default.as_deref(), max_len);
            arg.provided = arg.default.is_some();
        }
        self.help_requested = false;
    }

    /// Drops every declaration and value.
    ///
    /// The registry behaves like a new one afterwards, and handles from the
    /// old session no longer resolve.
    pub fn cleanup(&mut self) {
        debug!(count = self.args.len(), "Cleaning up argument registry");
        self.args.clear();
        self.help_requested = false;
        self.generation += 1;
    }

    pub(crate) fn position(&self, token: &str) -> Option<usize> {
        self.args.iter().position(|arg| arg.name == token)
    }

    pub(crate) fn enabled_at(&self, index: usize) -> bool {
        let Some(enablement) = &self.args[index].enablement else {
            return true;
        };
        match (enablement.parent, &enablement.predicate) {
            (Some(parent), None) => self.args[parent].store.len() > 0,
            // parents are always declared earlier, so this terminates
            (Some(parent), Some(predicate)) => {
                self.args[parent].is_provided() && self.enabled_at(parent) && predicate(self)
            }
            (None, Some(predicate)) => predicate(self),
            (None, None) => true,
        }
    }

    fn resolve(&self, id: ArgId) -> Option<usize> {
        (id.registry == self.id && id.generation == self.generation && id.index < self.args.len())
            .then_some(id.index)
    }

    fn info_at(&self, index: usize) -> ArgumentInfo<'_> {
        let arg = &self.args[index];
        ArgumentInfo {
            name: &arg.name,
            description: &arg.description,
            type_name: arg.type_name,
            format_hint: arg.format_hint,
            default: arg.default.as_deref(),
            is_flag: arg.kind != TypeKind::Value,
            is_help: arg.kind == TypeKind::Help,
            is_list: arg.list,
            is_conditional: arg.enablement.is_some(),
            condition: arg
                .enablement
                .as_ref()
                .and_then(|enablement| enablement.description.as_deref()),
            required: arg.is_required(),
            enabled: self.enabled_at(index),
            provided: arg.is_provided(),
            dirty: arg.dirty,
            value_count: arg.store.len(),
        }
    }

    fn enablement(&self, condition: Condition) -> Result<Enablement, ConfigError> {
        let parent = match condition.parent {
            Some(id) => Some(self.resolve(id).ok_or(ConfigError::StaleHandle)?),
            None => None,
        };
        Ok(Enablement {
            parent,
            predicate: condition.predicate,
            description: condition.description,
        })
    }

    fn insert_scalar<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        default: Option<&str>,
        enablement: Option<Enablement>,
    ) -> Result<ArgId, ConfigError> {
        let name = self.check_name(name)?;
        if ty.allow_multiple() {
            return Err(ConfigError::ListTypeInScalarDeclaration(name));
        }
        if ty.is_flag() {
            match default {
                None => return Err(ConfigError::FlagWithoutDefault(name)),
                Some("true" | "false") => {}
                Some(other) => {
                    return Err(ConfigError::InvalidFlagDefault {
                        name,
                        default: other.to_string(),
                    });
                }
            }
        }
        let store = Scalar::new(*ty, default, self.config.max_value_len).map_err(|source| {
            ConfigError::InvalidDefault {
                name: name.clone(),
                default: default.unwrap_or_default().to_string(),
                source,
            }
        })?;
        let description = self.clip_description(description);
        Ok(self.push(ArgumentDescriptor {
            name,
            description,
            default: default.map(String::from),
            type_name: ty.name(),
            format_hint: ty.format_hint(),
            kind: ty.kind(),
            list: false,
            non_empty: false,
            store: Box::new(store),
            provided: default.is_some(),
            dirty: false,
            enablement,
        }))
    }

    fn insert_list<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
        ty: &TypeDescriptor<T>,
        enablement: Option<Enablement>,
    ) -> Result<ArgId, ConfigError> {
        let name = self.check_name(name)?;
        let Some(list_ty) = ty.try_list_of() else {
            return Err(ConfigError::ListOfFlags(name));
        };
        let store = List::with_capacity(list_ty, self.config.list_capacity);
        let description = self.clip_description(description);
        Ok(self.push(ArgumentDescriptor {
            name,
            description,
            default: None,
            type_name: list_ty.name(),
            format_hint: list_ty.format_hint(),
            kind: list_ty.kind(),
            list: true,
            non_empty: false,
            store: Box::new(store),
            provided: false,
            dirty: false,
            enablement,
        }))
    }

    /// Validates a bare name and returns it with the prefix applied.
    fn check_name(&self, name: &str) -> Result<String, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let prefixed = format!("{}{}", self.config.prefix, name);
        if prefixed.chars().count() > self.config.max_name_len {
            return Err(ConfigError::NameTooLong {
                name: prefixed,
                max: self.config.max_name_len,
            });
        }
        if self.position(&prefixed).is_some() {
            return Err(ConfigError::DuplicateName(prefixed));
        }
        if let Some(max) = self.config.max_arguments {
            if self.args.len() >= max {
                return Err(ConfigError::TooManyArguments(max));
            }
        }
        Ok(prefixed)
    }

    fn clip_description(&self, description: &str) -> String {
        description
            .chars()
            .take(self.config.max_description_len)
            .collect()
    }

    fn push(&mut self, arg: ArgumentDescriptor) -> ArgId {
        debug!(
            name = %arg.name,
            type_name = arg.type_name,
            list = arg.list,
            conditional = arg.enablement.is_some(),
            "Declared argument"
        );
        self.args.push(arg);
        ArgId {
            registry: self.id,
            index: self.args.len() - 1,
            generation: self.generation,
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("arguments", &self.arguments().collect::<Vec<_>>())
            .field("help_requested", &self.help_requested)
            .finish()
    }
}

fn unwrap_declaration<H>(result: Result<H, ConfigError>) -> H {
    match result {
        Ok(handle) => handle,
        Err(err) => panic!("invalid argument declaration: {err}"),
    }
}
