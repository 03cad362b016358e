//! SV-013: Filesystem stat accessors.

use super::{check_args, Arity, FunctionError, FunctionResult, FunctionTable, Value};
use std::time::UNIX_EPOCH;

pub fn register(table: &mut FunctionTable) {
    table.register("stat.st_mtime", Arity::Single, st_mtime);
    table.register("stat.st_size", Arity::Single, st_size);
}

fn metadata(path: &str) -> Result<std::fs::Metadata, FunctionError> {
    std::fs::metadata(path).map_err(|e| FunctionError::io(path, &e))
}

/// Modification time as float seconds since the epoch.
fn st_mtime(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    let path = args[0].as_str();
    let modified = metadata(path)?
        .modified()
        .map_err(|e| FunctionError::io(path, &e))?;
    let secs = match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    };
    Ok(Value::Float(secs))
}

fn st_size(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(Value::Int(metadata(&args[0])?.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_sv013_st_size() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "hello world").unwrap();
        let args = vec![file.to_string_lossy().to_string()];
        assert_eq!(st_size(&args).unwrap(), Value::Int(11));
    }

    #[test]
    fn test_sv013_st_mtime_recent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        let args = vec![file.to_string_lossy().to_string()];
        let Value::Float(secs) = st_mtime(&args).unwrap() else {
            panic!("expected float mtime");
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs_f64();
        assert!(secs > 0.0 && secs <= now + 1.0);
    }

    #[test]
    fn test_sv013_missing_path() {
        let args = vec!["/definitely/not/here".to_string()];
        let err = st_size(&args).unwrap_err();
        assert!(err.to_string().starts_with("/definitely/not/here:"));
        assert!(st_mtime(&args).is_err());
    }
}
