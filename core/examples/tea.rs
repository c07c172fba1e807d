//! Argument setup for a file encryption tool.
//!
//! Shows flags, a list argument, a help switch, and conditional arguments
//! that switch each other on and off.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argbind-core --example tea -- -e -I notes.txt todo.txt -k 0123456789abcdef
//! cargo run -p argbind-core --example tea -- -h
//! ```

use std::process::ExitCode;

use argbind_core::{Condition, FLAG, HELP, Registry, TEXT};

fn usage(registry: &Registry) {
    eprintln!("Tiny Encryption Algorithm implementation, with 128 bit key.");
    eprintln!("Performs encryption/decryption of multiple files.");
    if let Err(err) = registry.print_help() {
        eprintln!("ERROR: failed to print help: {err}");
    }
}

fn main() -> ExitCode {
    let mut registry = Registry::new();

    let encrypt = registry.declare("e", "Encrypt files, decrypt otherwise", &FLAG, Some("false"));
    let key_from_stdin = registry.declare("K", "16 byte key (from stdin)", &FLAG, Some("false"));
    let infiles = registry.declare_list("I", "Files that need to be processed", &TEXT);
    registry.require_non_empty(infiles);

    let to_stdout = registry.declare_conditional(
        Condition::when(encrypt, move |r| !r.is_set(encrypt)).describe("When -e is false"),
        "N",
        "Display output to stdout",
        &FLAG,
        Some("false"),
    );
    let post_delete = registry.declare_conditional(
        Condition::when(to_stdout, move |r| !r.is_set(to_stdout)).describe("When -N is false"),
        "D",
        "Deletes input files after encryption/decryption",
        &FLAG,
        Some("false"),
    );
    let verbose = registry.declare_conditional(
        Condition::predicate(move |r| !r.is_set(to_stdout)).describe("When -N is false"),
        "v",
        "Verbose",
        &FLAG,
        Some("false"),
    );
    let help = registry.declare("h", "Display this help message", &HELP, Some("false"));
    let key = registry.declare_conditional(
        Condition::when(key_from_stdin, move |r| !r.is_set(key_from_stdin))
            .describe("When -K is false"),
        "k",
        "16 byte key (as argument)",
        &TEXT,
        None,
    );

    if let Err(err) = registry.parse_env() {
        eprintln!("ERROR: {err}");
        usage(&registry);
        return ExitCode::FAILURE;
    }

    if registry.is_set(help) {
        usage(&registry);
        return ExitCode::SUCCESS;
    }

    let mode = if registry.is_set(encrypt) { "Encrypt" } else { "Decrypt" };
    println!("Mode: {mode}");
    println!("Post deletion: {}", registry.is_set(post_delete));
    println!("Verbose: {}", registry.is_set(verbose));
    println!("Key from stdin: {}", registry.is_set(key_from_stdin));
    if let Some(key) = registry.get(key) {
        println!("Key provided (as parameter): {key}");
    }
    if registry.is_enabled(&to_stdout) {
        println!("Decrypt and display: {}", registry.is_set(to_stdout));
    }
    let files = registry.values(infiles);
    println!("Number of input files: {}", files.len());
    for file in files {
        println!("* {file}");
    }

    registry.cleanup();
    ExitCode::SUCCESS
}
