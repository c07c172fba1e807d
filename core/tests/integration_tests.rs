use argbind_core::{
    BOOLEAN, Condition, DOUBLE, FLAG, HELP, INTEGER, ParseError, ParserConfig, RawValue, Registry,
    TEXT, TypeDescriptor, ValueError,
};

/// Registry with a small text limit so truncation is easy to observe.
fn small_registry() -> Registry {
    Registry::with_config(ParserConfig {
        max_value_len: 10,
        ..ParserConfig::default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sine,
    Am,
    Noise,
}

fn parse_mode(raw: &RawValue<'_>) -> Result<Mode, ValueError> {
    match raw.text {
        "sine" => Ok(Mode::Sine),
        "am" => Ok(Mode::Am),
        "noise" => Ok(Mode::Noise),
        other => Err(ValueError::Custom(format!("invalid mode: '{other}'"))),
    }
}

const MODE: TypeDescriptor<Mode> = TypeDescriptor::new("mode", "(sine|am|noise)", parse_mode);

// ---------------------------------------------------------------------------
// Required and default values
// ---------------------------------------------------------------------------

#[test]
fn required_arguments_not_met() {
    let mut registry = Registry::new();
    registry.declare("A", "1st arg", &TEXT, None);
    registry.declare("B", "2nd arg", &INTEGER, None);
    registry.declare("C", "3rd arg", &BOOLEAN, None);
    registry.declare("D", "4th arg", &DOUBLE, None);

    let result = registry.parse(["dummy", "-A", "abc", "-C", "true", "-D", "12.84"]);
    assert_eq!(result, Err(ParseError::MissingRequired("-B".into())));

    registry
        .parse(["dummy", "-A", "abc", "-B", "1", "-C", "true", "-D", "12.84"])
        .unwrap();
}

#[test]
fn default_values() {
    let mut registry = Registry::new();
    let a = registry.declare("A", "1st arg", &TEXT, Some("bcd"));
    let b = registry.declare("B", "2nd arg", &INTEGER, Some("13"));
    let c = registry.declare("C", "3rd arg", &BOOLEAN, Some("false"));
    let d = registry.declare("D", "4th arg", &DOUBLE, Some("18.52"));

    registry.parse(["dummy"]).unwrap();

    assert_eq!(registry.get(a).unwrap(), "bcd");
    assert_eq!(registry.get(b), Some(&13));
    assert!(registry.is_provided(&b));
    assert!(!registry.is_dirty(&b));
    assert_eq!(registry.get(c), Some(&false));
    assert!((registry.get(d).unwrap() - 18.52).abs() < 0.001);
}

#[test]
fn default_value_override() {
    let mut registry = Registry::new();
    let a = registry.declare("A", "1st arg", &TEXT, Some("bcd"));
    let b = registry.declare("B", "2nd arg", &INTEGER, Some("13"));
    let c = registry.declare("C", "3rd arg", &BOOLEAN, Some("false"));
    let d = registry.declare("D", "4th arg", &DOUBLE, Some("18.52"));

    registry
        .parse(["dummy", "-A", "def", "-B", "23", "-C", "true", "-D", "220.72"])
        .unwrap();

    assert_eq!(registry.get(a).unwrap(), "def");
    assert_eq!(registry.get(b), Some(&23));
    assert_eq!(registry.get(c), Some(&true));
    assert!((registry.get(d).unwrap() - 220.72).abs() < 0.001);
}

#[test]
fn defaults_parse_like_command_line_values() {
    for text in ["0", "42", "13", "9223372036854775807"] {
        let mut defaulted = Registry::new();
        let from_default = defaulted.declare("B", "b", &INTEGER, Some(text));
        defaulted.parse(["dummy"]).unwrap();

        let mut given = Registry::new();
        let from_cli = given.declare("B", "b", &INTEGER, None);
        given.parse(["dummy", "-B", text]).unwrap();

        assert_eq!(defaulted.get(from_default), given.get(from_cli));
    }

    let mut defaulted = small_registry();
    let from_default = defaulted.declare("A", "a", &TEXT, Some("123456789ABCD"));
    let mut given = small_registry();
    let from_cli = given.declare("A", "a", &TEXT, None);
    given.parse(["dummy", "-A", "123456789ABCD"]).unwrap();
    assert_eq!(defaulted.get(from_default), given.get(from_cli));
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[test]
fn argument_value_length_clamping() {
    let mut registry = small_registry();
    let a = registry.declare("A", "1st arg", &TEXT, None);
    registry.parse(["dummy", "-A", "123456789ABCD"]).unwrap();

    let value = registry.get(a).unwrap();
    assert_eq!(value, "123456789A");
    assert_eq!(value.len(), 10);
}

#[test]
fn list_keeps_command_line_order() {
    let mut registry = Registry::new();
    let b = registry.declare_list("B", "numbers", &INTEGER);
    registry.parse(["dummy", "-B", "1", "2", "3"]).unwrap();
    assert_eq!(registry.values(b), &[1, 2, 3]);
}

#[test]
fn list_grows_past_initial_capacity() {
    let mut registry = Registry::new();
    let b = registry.declare_list("B", "numbers", &INTEGER);
    let tokens: Vec<String> = (0..25).map(|n| n.to_string()).collect();
    let argv = ["dummy", "-B"]
        .into_iter()
        .map(String::from)
        .chain(tokens.iter().cloned());
    registry.parse(argv).unwrap();
    assert_eq!(registry.values(b), (0..25).collect::<Vec<i64>>().as_slice());
}

#[test]
fn custom_type() {
    let mut registry = Registry::new();
    let mode = registry.declare("mode", "Mode of wave generation", &MODE, Some("sine"));
    registry.parse(["dummy"]).unwrap();
    assert_eq!(registry.get(mode), Some(&Mode::Sine));

    registry.parse(["dummy", "-mode", "am"]).unwrap();
    assert_eq!(registry.get(mode), Some(&Mode::Am));

    let err = registry.parse(["dummy", "-mode", "square"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for argument '-mode': 'square' (invalid mode: 'square')"
    );

    let modes = registry.declare_list("modes", "Modes to cycle", &MODE);
    registry
        .parse(["dummy", "-modes", "noise", "sine"])
        .unwrap();
    assert_eq!(registry.values(modes), &[Mode::Noise, Mode::Sine]);
}

// ---------------------------------------------------------------------------
// Parse failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_argument_always_fails() {
    let mut registry = Registry::new();
    registry.declare("A", "1st arg", &TEXT, Some("x"));
    registry.declare("H", "Help arg", &HELP, Some("false"));

    assert_eq!(
        registry.parse(["dummy", "-Z"]),
        Err(ParseError::UnknownArgument("-Z".into()))
    );
    assert_eq!(
        registry.parse(["dummy", "-A", "y", "-Z", "-H"]),
        Err(ParseError::UnknownArgument("-Z".into()))
    );
}

#[test]
fn help_argument_present() {
    let mut registry = Registry::new();
    registry.declare("A", "1st arg", &TEXT, None);
    registry.declare("B", "2nd arg", &INTEGER, None);
    registry.declare("C", "3rd arg", &BOOLEAN, None);
    registry.declare("D", "4th arg", &DOUBLE, None);
    registry.declare("H", "Help arg", &HELP, Some("false"));

    registry.parse(["dummy", "-A", "abc", "-H"]).unwrap();
    assert!(registry.help_requested());
}

// ---------------------------------------------------------------------------
// Conditional arguments
// ---------------------------------------------------------------------------

struct Tea {
    registry: Registry,
}

impl Tea {
    fn new() -> Self {
        let mut registry = Registry::new();
        let encrypt = registry.declare("e", "Encrypt files, decrypt otherwise", &FLAG, Some("false"));
        let key_from_stdin = registry.declare("K", "16 byte key (from stdin)", &FLAG, Some("false"));
        registry.declare_list("I", "Files that need to be processed", &TEXT);
        let to_stdout = registry.declare_conditional(
            Condition::when(encrypt, move |r| !r.is_set(encrypt)).describe("When -e is false"),
            "N",
            "Display output to stdout",
            &FLAG,
            Some("false"),
        );
        registry.declare_conditional(
            Condition::when(to_stdout, move |r| !r.is_set(to_stdout)).describe("When -N is false"),
            "D",
            "Deletes input files after encryption/decryption",
            &FLAG,
            Some("false"),
        );
        registry.declare_conditional(
            Condition::predicate(move |r| !r.is_set(to_stdout)).describe("When -N is false"),
            "v",
            "Verbose",
            &FLAG,
            Some("false"),
        );
        registry.declare("h", "Display this help message", &HELP, Some("false"));
        registry.declare_conditional(
            Condition::when(key_from_stdin, move |r| !r.is_set(key_from_stdin))
                .describe("When -K is false"),
            "k",
            "16 byte key (as argument)",
            &TEXT,
            None,
        );
        Self { registry }
    }

    fn parse(&mut self, args: &[&str]) -> Result<(), ParseError> {
        self.registry
            .parse(std::iter::once("tea").chain(args.iter().copied()))
    }
}

#[test]
fn disabled_conditional_argument_has_no_effect() {
    let mut tea = Tea::new();
    assert_eq!(
        tea.parse(&["-e", "-N", "-k", "key"]),
        Err(ParseError::NoEffect("-N".into()))
    );
    tea.parse(&["-e", "-k", "key"]).unwrap();
}

#[test]
fn enabled_conditional_argument_is_required() {
    let mut tea = Tea::new();
    assert_eq!(
        tea.parse(&["-I", "a.txt"]),
        Err(ParseError::MissingRequired("-k".into()))
    );
    tea.parse(&["-I", "a.txt", "-k", "key"]).unwrap();
    tea.parse(&["-I", "a.txt", "-K"]).unwrap();
}

#[test]
fn conditional_chain() {
    let mut tea = Tea::new();
    // -D depends on -N being false, which depends on -e being false.
    tea.parse(&["-D", "-K"]).unwrap();
    assert_eq!(
        tea.parse(&["-N", "-D", "-K"]),
        Err(ParseError::NoEffect("-D".into()))
    );
    assert_eq!(
        tea.parse(&["-e", "-D", "-K"]),
        Err(ParseError::NoEffect("-D".into()))
    );
}

#[test]
fn predicate_condition_reads_value_only() {
    let mut tea = Tea::new();
    tea.parse(&["-v", "-K"]).unwrap();
    // -N is switched off by -e but still holds its default, so -v stays enabled.
    tea.parse(&["-e", "-v", "-K"]).unwrap();
    assert_eq!(
        tea.parse(&["-N", "-v", "-K"]),
        Err(ParseError::NoEffect("-v".into()))
    );
}

#[test]
fn help_skips_conditional_checks() {
    let mut tea = Tea::new();
    tea.parse(&["-e", "-N", "-h"]).unwrap();
    assert!(tea.registry.help_requested());
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn cleanup_then_redeclare_matches_fresh_registry() {
    let mut reused = Registry::new();
    let old = reused.declare("B", "old", &INTEGER, Some("99"));
    reused.declare("X", "gone", &TEXT, None);
    reused.parse(["dummy", "-B", "5", "-X", "y"]).unwrap();
    reused.cleanup();

    let mut fresh = Registry::new();

    for registry in [&mut reused, &mut fresh] {
        let b = registry.declare("B", "2nd arg", &INTEGER, Some("13"));
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_name("-X").is_none());
        assert_eq!(
            registry.parse(["dummy", "-X", "y"]),
            Err(ParseError::UnknownArgument("-X".into()))
        );
        registry.parse(["dummy"]).unwrap();
        assert_eq!(registry.get(b), Some(&13));
    }

    assert_eq!(reused.get(old), None);
    assert_eq!(
        reused.arguments().collect::<Vec<_>>(),
        fresh.arguments().collect::<Vec<_>>()
    );
}

#[test]
fn arguments_enumerate_in_declaration_order() {
    let tea = Tea::new();
    let names: Vec<&str> = tea.registry.arguments().map(|info| info.name).collect();
    assert_eq!(names, ["-e", "-K", "-I", "-N", "-D", "-v", "-h", "-k"]);

    let key = tea.registry.find_by_name("-k").unwrap();
    assert!(key.is_conditional);
    assert_eq!(key.condition, Some("When -K is false"));
    assert!(key.required);
    assert_eq!(key.format_hint, "(text)");
}
