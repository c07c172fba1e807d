//! Usage listing built from the registry.
//!
//! Always-enabled arguments are listed first under `Usage:`, conditional
//! ones after them under `Conditional arguments:` with their condition.

use std::io::{self, Write};

use colored::Colorize;

use crate::registry::{ArgumentInfo, Registry};

impl Registry {
    /// Writes the usage listing to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{Registry, INTEGER};
    ///
    /// let mut registry = Registry::new();
    /// registry.declare("B", "Gain of the amplifier", &INTEGER, Some("0"));
    ///
    /// let mut out = Vec::new();
    /// registry.render_help(&mut out).unwrap();
    /// let text = String::from_utf8(out).unwrap();
    /// assert!(text.starts_with("Usage:\n"));
    /// assert!(text.contains("(Default set to '0')"));
    /// ```
    pub fn render_help(&self, out: &mut impl Write) -> io::Result<()> {
        // styled even when stdout is not a terminal
        if self.config.use_color {
            colored::control::set_override(true);
        }

        let (conditional, plain): (Vec<_>, Vec<_>) =
            self.arguments().partition(|info| info.is_conditional);

        writeln!(out, "Usage:")?;
        for info in &plain {
            self.write_line(out, info)?;
        }

        if !conditional.is_empty() {
            writeln!(out)?;
            writeln!(out, "Conditional arguments:")?;
            for info in &conditional {
                self.write_line(out, info)?;
            }
        }
        Ok(())
    }

    /// Writes the usage listing to standard error.
    ///
    /// # Errors
    ///
    /// Propagates write failures on standard error.
    pub fn print_help(&self) -> io::Result<()> {
        let stderr = io::stderr();
        let mut lock = stderr.lock();
        self.render_help(&mut lock)
    }

    fn write_line(&self, out: &mut impl Write, info: &ArgumentInfo<'_>) -> io::Result<()> {
        let name = format!("{:<10}", info.name);
        let requirement = match (info.default, info.required) {
            (Some(default), _) => format!("(Default set to '{default}')"),
            (None, false) => "(Optional)".to_string(),
            (None, true) => "(Required)".to_string(),
        };

        if self.config.use_color {
            write!(
                out,
                "  {}\t{:<20} {} {}",
                name.bold(),
                info.format_hint,
                info.description,
                requirement.yellow()
            )?;
        } else {
            write!(
                out,
                "  {name}\t{:<20} {} {requirement}",
                info.format_hint, info.description
            )?;
        }
        match info.condition {
            Some(condition) => writeln!(out, " [{condition}]"),
            None => writeln!(out),
        }
    }
}
