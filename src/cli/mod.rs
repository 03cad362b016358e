//! SV-020: CLI subcommands: init, resolve, render, check, functions.

use crate::core::types::VarsFile;
use crate::core::{parser, FailurePolicy, VarError, Variables};
use crate::functions::builtins;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter vars.yaml
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Resolve each TEXT argument and print the result
    Resolve {
        /// Text containing ${NAME} or ${func(args)} placeholders
        #[arg(required = true)]
        text: Vec<String>,

        #[command(flatten)]
        source: VarSource,

        /// Print JSON objects instead of plain text
        #[arg(long)]
        json: bool,

        /// Report every failure instead of exiting on the first
        #[arg(long)]
        keep_going: bool,
    },

    /// Resolve a template file line by line
    Render {
        /// Template file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: VarSource,

        /// Report every failure instead of exiting on the first
        #[arg(long)]
        keep_going: bool,
    },

    /// Validate a vars.yaml and resolve every variable it defines
    Check {
        /// Path to vars.yaml
        #[arg(short, long, default_value = "vars.yaml")]
        file: PathBuf,

        /// Also import the process environment (file definitions win)
        #[arg(long)]
        env: bool,
    },

    /// List builtin functions
    Functions,
}

/// Where the variable table comes from.
#[derive(Args, Debug, Default, Clone)]
pub struct VarSource {
    /// Path to vars.yaml
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Import the process environment (file definitions win)
    #[arg(long)]
    pub env: bool,

    /// Override a variable (NAME=VALUE), repeatable
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Resolve {
            text,
            source,
            json,
            keep_going,
        } => cmd_resolve(&text, &source, json, policy_for(keep_going)),
        Commands::Render {
            input,
            output,
            source,
            keep_going,
        } => cmd_render(&input, output.as_deref(), &source, policy_for(keep_going)),
        Commands::Check { file, env } => cmd_check(&file, env),
        Commands::Functions => cmd_functions(),
    }
}

fn policy_for(keep_going: bool) -> FailurePolicy {
    if keep_going {
        FailurePolicy::Propagate
    } else {
        FailurePolicy::Exit
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let vars_path = path.join("vars.yaml");
    if vars_path.exists() {
        return Err(format!("{} already exists", vars_path.display()));
    }

    let template = r#"version: "1.0"
description: "Variables for shvar"

variables:
  OBJ_DIR: build/obj
  name: example
  # target resolves to build/obj/EXAMPLE
  target: ${OBJ_DIR}/${str.upper(${name})}
"#;
    std::fs::write(&vars_path, template)
        .map_err(|e| format!("cannot write {}: {}", vars_path.display(), e))?;

    println!("Initialized shvar variables at {}", vars_path.display());
    Ok(())
}

/// Split `NAME=VALUE`; the value may itself contain `=`.
fn parse_assignment(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("invalid assignment '{}', expected NAME=VALUE", raw))
}

/// Parse and validate a vars file, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<VarsFile, String> {
    let vars_file = parser::parse_vars_file(file)?;
    let errors = parser::validate_vars(&vars_file);
    if errors.is_empty() {
        return Ok(vars_file);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

/// Build the variable table from the command-line sources.
fn build_vars(source: &VarSource) -> Result<Variables, String> {
    let vars_file = source.file.as_deref().map(parse_and_validate).transpose()?;
    assemble_vars(vars_file.as_ref(), source.env, &source.set)
}

/// File definitions first, then environment names the file left undefined,
/// then `--set` overrides.
fn assemble_vars(
    vars_file: Option<&VarsFile>,
    env: bool,
    set: &[String],
) -> Result<Variables, String> {
    let mut vars = Variables::new();
    if let Some(vars_file) = vars_file {
        parser::load_into(vars_file, &mut vars).map_err(|e| e.to_string())?;
    }
    if env {
        let imported = vars.add_env_missing();
        tracing::debug!(imported, "environment imported");
    }
    for raw in set {
        let (name, value) = parse_assignment(raw)?;
        vars.replace(name, value);
    }
    tracing::debug!(count = vars.len(), "variable table ready");
    Ok(vars)
}

fn error_json(err: &VarError) -> serde_json::Value {
    serde_json::json!({
        "kind": err.kind,
        "code": err.kind.code(),
        "message": err.message,
        "history": err.history,
    })
}

fn cmd_resolve(
    texts: &[String],
    source: &VarSource,
    json: bool,
    policy: FailurePolicy,
) -> Result<(), String> {
    let vars = build_vars(source)?;
    let mut failed = 0;

    for text in texts {
        if json {
            // The error object is always printed; Exit stops after the first one.
            match vars.resolve(text) {
                Ok(output) => {
                    println!("{}", serde_json::json!({ "input": text, "output": output }));
                }
                Err(e) => {
                    failed += 1;
                    println!("{}", serde_json::json!({ "input": text, "error": error_json(&e) }));
                    if policy == FailurePolicy::Exit {
                        break;
                    }
                }
            }
            continue;
        }
        match policy.apply(vars.resolve(text)) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                failed += 1;
                eprintln!("{}", e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} resolution error(s)", failed));
    }
    Ok(())
}

/// Resolve each line of `template` independently. Failed lines are kept
/// verbatim and reported with their 1-based line number.
fn render_text(
    template: &str,
    vars: &Variables,
    policy: FailurePolicy,
) -> (String, Vec<(usize, VarError)>) {
    let mut out = Vec::new();
    let mut failures = Vec::new();
    for (n, line) in template.lines().enumerate() {
        match policy.apply(vars.resolve(line)) {
            Ok(resolved) => out.push(resolved),
            Err(e) => {
                out.push(line.to_string());
                failures.push((n + 1, e));
            }
        }
    }
    let mut rendered = out.join("\n");
    if template.ends_with('\n') {
        rendered.push('\n');
    }
    (rendered, failures)
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    source: &VarSource,
    policy: FailurePolicy,
) -> Result<(), String> {
    let vars = build_vars(source)?;
    let template = std::fs::read_to_string(input)
        .map_err(|e| format!("failed to read {}: {}", input.display(), e))?;

    let (rendered, failures) = render_text(&template, &vars, policy);
    if !failures.is_empty() {
        for (line, e) in &failures {
            eprintln!("{}:{}: {}", input.display(), line, e);
        }
        return Err(format!("{} line(s) failed to resolve", failures.len()));
    }

    match output {
        Some(path) => std::fs::write(path, &rendered)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Resolve every variable in the file, collecting `(name, error)` failures.
fn check_vars(vars: &Variables, names: &[String]) -> Vec<(String, VarError)> {
    names
        .iter()
        .filter_map(|name| {
            vars.resolve(&format!("${{{}}}", name))
                .err()
                .map(|e| (name.clone(), e))
        })
        .collect()
}

fn cmd_check(file: &Path, env: bool) -> Result<(), String> {
    let vars_file = parse_and_validate(file)?;
    let vars = assemble_vars(Some(&vars_file), env, &[])?;
    let names: Vec<String> = vars_file.variables.keys().cloned().collect();

    let failures = check_vars(&vars, &names);
    if failures.is_empty() {
        println!("OK: {} variables resolve", names.len());
        return Ok(());
    }
    for (name, e) in &failures {
        eprintln!("  ERROR: {}: {}", name, e);
    }
    Err(format!("{} variable(s) failed to resolve", failures.len()))
}

fn cmd_functions() -> Result<(), String> {
    let table = builtins();
    let width = table.names().map(str::len).max().unwrap_or(0);
    for (name, entry) in table.iter() {
        println!(
            "  {:width$}  ({}) {}",
            name,
            entry.arity.descriptor(),
            entry.arity,
            width = width
        );
    }
    println!();
    println!("{} functions", table.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VarErrorKind;

    fn write_vars(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("vars.yaml");
        std::fs::write(&path, format!("version: \"1.0\"\nvariables:\n{}", body)).unwrap();
        path
    }

    #[test]
    fn test_sv020_init() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let path = dir.path().join("vars.yaml");
        assert!(path.exists());

        let vars = build_vars(&VarSource {
            file: Some(path),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(vars.resolve("${target}").unwrap(), "build/obj/EXAMPLE");
    }

    #[test]
    fn test_sv020_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let err = cmd_init(dir.path()).unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn test_sv020_parse_assignment() {
        assert_eq!(parse_assignment("a=b").unwrap(), ("a", "b"));
        assert_eq!(parse_assignment("a=b=c").unwrap(), ("a", "b=c"));
        assert_eq!(parse_assignment("a=").unwrap(), ("a", ""));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_sv020_set_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vars(dir.path(), "  name: widget\n");
        let vars = build_vars(&VarSource {
            file: Some(path),
            env: false,
            set: vec!["name=gadget".to_string(), "extra=1".to_string()],
        })
        .unwrap();
        assert_eq!(vars.lookup("name"), Some("gadget"));
        assert_eq!(vars.lookup("extra"), Some("1"));
    }

    #[test]
    fn test_sv020_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vars(dir.path(), "  \"bad name\": x\n");
        let err = build_vars(&VarSource {
            file: Some(path),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, "validation failed");
    }

    #[test]
    fn test_sv020_resolve_counts_failures() {
        let source = VarSource {
            set: vec!["dog1=shatzi".to_string()],
            ..Default::default()
        };
        let texts = vec!["${dog1}".to_string(), "${cat}".to_string(), "${x".to_string()];
        let err = cmd_resolve(&texts, &source, false, FailurePolicy::Propagate).unwrap_err();
        assert_eq!(err, "2 resolution error(s)");
        let ok = vec!["${str.upper(${dog1})}".to_string()];
        cmd_resolve(&ok, &source, true, FailurePolicy::Propagate).unwrap();
    }

    #[test]
    fn test_sv020_resolve_json_stops_after_first_error() {
        let source = VarSource {
            set: vec!["dog1=shatzi".to_string()],
            ..Default::default()
        };
        // Exit policy with --json reports the error object and returns
        // instead of exiting the process from inside the loop.
        let texts = vec!["${nope}".to_string(), "${cat}".to_string(), "${dog1}".to_string()];
        let err = cmd_resolve(&texts, &source, true, FailurePolicy::Exit).unwrap_err();
        assert_eq!(err, "1 resolution error(s)");
        let err = cmd_resolve(&texts, &source, true, FailurePolicy::Propagate).unwrap_err();
        assert_eq!(err, "2 resolution error(s)");
    }

    #[test]
    fn test_sv020_file_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vars(dir.path(), "  PATH: /opt/tools/bin\n  tool: ${PATH}/cc\n");
        let vars = build_vars(&VarSource {
            file: Some(path),
            env: true,
            set: vec![],
        })
        .unwrap();
        assert_eq!(vars.resolve("${tool}").unwrap(), "/opt/tools/bin/cc");
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(vars.lookup("HOME"), Some(home.as_str()));
        }
    }

    #[test]
    fn test_sv020_check_with_env_shares_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vars(dir.path(), "  PATH: /opt/tools/bin\n  cc: ${PATH}/cc\n");
        cmd_check(&path, true).unwrap();
    }

    #[test]
    fn test_sv020_assemble_reuses_parsed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vars(dir.path(), "  a: x\n  b: ${a}/y\n");
        let vars_file = parse_and_validate(&path).unwrap();
        // Once parsed, the table no longer depends on the file on disk.
        std::fs::remove_file(&path).unwrap();
        let vars = assemble_vars(Some(&vars_file), false, &["a=z".to_string()]).unwrap();
        assert_eq!(vars.resolve("${b}").unwrap(), "z/y");
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_sv020_render_text() {
        let mut vars = Variables::new();
        vars.add("dog1", "shatzi").unwrap();
        let template = "name: ${dog1}\nbad: ${cat}\nplain\n";
        let (rendered, failures) = render_text(template, &vars, FailurePolicy::Propagate);
        assert_eq!(rendered, "name: shatzi\nbad: ${cat}\nplain\n");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 2);
        assert_eq!(failures[0].1.kind, VarErrorKind::UndefinedVariable);
    }

    #[test]
    fn test_sv020_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "dir=${OBJ_DIR}\nfile=${pathtool.no_extension(${src})}.o").unwrap();
        let source = VarSource {
            set: vec!["OBJ_DIR=build".to_string(), "src=main.c".to_string()],
            ..Default::default()
        };
        cmd_render(&input, Some(&output), &source, FailurePolicy::Propagate).unwrap();
        let rendered = std::fs::read_to_string(&output).unwrap();
        assert_eq!(rendered, "dir=build\nfile=main.o");
    }

    #[test]
    fn test_sv020_render_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "${missing}\n").unwrap();
        let err = cmd_render(&input, None, &VarSource::default(), FailurePolicy::Propagate)
            .unwrap_err();
        assert!(err.contains("1 line(s)"));
    }

    #[test]
    fn test_sv020_check() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_vars(dir.path(), "  a: x\n  b: ${a}/y\n");
        cmd_check(&good, false).unwrap();

        let bad_dir = tempfile::tempdir().unwrap();
        let bad = write_vars(bad_dir.path(), "  a: ${b}\n  b: ${a}\n  c: ${nope}\n");
        let err = cmd_check(&bad, false).unwrap_err();
        assert_eq!(err, "3 variable(s) failed to resolve");
    }

    #[test]
    fn test_sv020_check_vars_kinds() {
        let mut vars = Variables::new();
        vars.add("loop", "${loop}").unwrap();
        vars.add("ok", "fine").unwrap();
        let failures = check_vars(&vars, &["loop".to_string(), "ok".to_string()]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "loop");
        assert_eq!(failures[0].1.kind, VarErrorKind::Recursion);
    }

    #[test]
    fn test_sv020_error_json() {
        let err = Variables::new().resolve("${nope}").unwrap_err();
        let json = error_json(&err);
        assert_eq!(json["kind"], "undefined_variable");
        assert_eq!(json["code"], 3);
        assert_eq!(json["history"][0], "${nope}");
    }

    #[test]
    fn test_sv020_functions_lists() {
        cmd_functions().unwrap();
    }
}
