//! SV-012: Path builtins: cwd, join, split, normalize, absolutize.
//!
//! Paths are handled as POSIX text: `/` is the only separator and
//! normalization is lexical except for `realpath`.

use super::{check_args, Arity, FunctionError, FunctionResult, FunctionTable, Value};
use std::path::Path;

pub fn register(table: &mut FunctionTable) {
    table.register("os.getcwd", Arity::None, getcwd);
    table.register("cwd", Arity::None, getcwd);
    table.register("os.path.abspath", Arity::Single, abspath);
    table.register("os.path.join", Arity::Variadic, join);
    table.register("os.path.dirname", Arity::Single, dirname);
    table.register("os.path.basename", Arity::Single, basename);
    table.register("os.path.getsize", Arity::Single, getsize);
    table.register("os.path.isdir", Arity::Single, isdir);
    table.register("os.path.normcase", Arity::Single, normcase);
    table.register("os.path.normpath", Arity::Single, normpath);
    table.register("os.path.realpath", Arity::Single, realpath);
    table.register("pathtool.extension", Arity::Single, extension);
    table.register("pathtool.no_extension", Arity::Single, no_extension);
}

fn current_dir() -> Result<String, FunctionError> {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .map_err(|e| FunctionError::io(".", &e))
}

/// Join with POSIX rules: an absolute component discards everything before it.
pub fn join_paths<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for part in parts {
        let part = part.as_ref();
        if part.starts_with('/') {
            out = part.to_string();
        } else if out.is_empty() || out.ends_with('/') {
            out.push_str(part);
        } else {
            out.push('/');
            out.push_str(part);
        }
    }
    out
}

/// Lexical normalization: collapse `//`, `.` and `a/..`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    // Exactly two leading slashes are preserved; three or more collapse to one.
    let leading = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };
    let mut comps: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                if comps.last().is_some_and(|last| *last != "..") {
                    comps.pop();
                } else if leading.is_empty() {
                    comps.push(comp);
                }
            }
            _ => comps.push(comp),
        }
    }
    let joined = format!("{}{}", leading, comps.join("/"));
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Index just past the last `/`, or 0.
fn split_point(path: &str) -> usize {
    path.rfind('/').map(|i| i + 1).unwrap_or(0)
}

/// `(root, ext)` where a leading dot in the file name never starts an extension.
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = split_point(path);
    let Some(dot) = path.rfind('.') else {
        return (path, "");
    };
    if dot <= name_start {
        return (path, "");
    }
    if path[name_start..dot].chars().all(|c| c == '.') {
        return (path, "");
    }
    (&path[..dot], &path[dot..])
}

fn absolutize(path: &str) -> Result<String, FunctionError> {
    if path.starts_with('/') {
        return Ok(normalize(path));
    }
    let cwd = current_dir()?;
    Ok(normalize(&join_paths(&[cwd.as_str(), path])))
}

fn getcwd(args: &[String]) -> FunctionResult {
    check_args(args, 0, 0)?;
    Ok(current_dir()?.into())
}

fn abspath(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(absolutize(&args[0])?.into())
}

fn join(args: &[String]) -> FunctionResult {
    check_args(args, 1, usize::MAX)?;
    Ok(join_paths(args).into())
}

fn dirname(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    let path = args[0].as_str();
    let head = &path[..split_point(path)];
    // Trailing slashes go, unless the head is nothing but slashes.
    let head = if head.chars().all(|c| c == '/') {
        head
    } else {
        head.trim_end_matches('/')
    };
    Ok(head.into())
}

fn basename(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    let path = args[0].as_str();
    Ok(path[split_point(path)..].into())
}

fn getsize(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    let meta = std::fs::metadata(&args[0]).map_err(|e| FunctionError::io(&args[0], &e))?;
    Ok(Value::Int(meta.len() as i64))
}

fn isdir(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(Path::new(&args[0]).is_dir().into())
}

/// Identity on POSIX.
fn normcase(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(args[0].clone().into())
}

fn normpath(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(normalize(&args[0]).into())
}

/// Resolves symlinks; paths that do not exist fall back to `abspath`.
fn realpath(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    match std::fs::canonicalize(&args[0]) {
        Ok(p) => Ok(p.to_string_lossy().to_string().into()),
        Err(_) => Ok(absolutize(&args[0])?.into()),
    }
}

fn extension(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(split_extension(&args[0]).1.into())
}

fn no_extension(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(split_extension(&args[0]).0.into())
}
