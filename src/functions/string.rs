//! SV-011: String builtins: case, predicates, search, strip, join, replace.

use super::{check_args, Arity, FunctionError, FunctionResult, FunctionTable, Value};

pub fn register(table: &mut FunctionTable) {
    table.register("str.upper", Arity::Single, upper);
    table.register("str.lower", Arity::Single, lower);
    table.register("str.endswith", Arity::Pair, endswith);
    table.register("str.startswith", Arity::Pair, startswith);
    table.register("str.find", Arity::Pair, find);
    table.register("str.isalpha", Arity::Single, isalpha);
    table.register("str.isalnum", Arity::Single, isalnum);
    table.register("str.isascii", Arity::Single, isascii);
    table.register("str.isdecimal", Arity::Single, isdecimal);
    table.register("str.isdigit", Arity::Single, isdigit);
    table.register("str.islower", Arity::Single, islower);
    table.register("str.isupper", Arity::Single, isupper);
    table.register("str.join", Arity::SeparatorAndList, join);
    table.register("str.lstrip", Arity::Single, lstrip);
    table.register("str.rstrip", Arity::Single, rstrip);
    table.register("str.strip", Arity::Single, strip);
    table.register("str.removeprefix", Arity::Pair, removeprefix);
    table.register("str.removesuffix", Arity::Pair, removesuffix);
    table.register("str.replace", Arity::Pair, replace);
    table.register("len", Arity::Single, len);
}

fn upper(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(args[0].to_uppercase().into())
}

fn lower(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(args[0].to_lowercase().into())
}

fn endswith(args: &[String]) -> FunctionResult {
    check_args(args, 2, 2)?;
    Ok(args[0].ends_with(args[1].as_str()).into())
}

fn startswith(args: &[String]) -> FunctionResult {
    check_args(args, 2, 2)?;
    Ok(args[0].starts_with(args[1].as_str()).into())
}

/// Character index of the first occurrence, or -1.
fn find(args: &[String]) -> FunctionResult {
    check_args(args, 2, 2)?;
    let hay = &args[0];
    let index = match hay.find(args[1].as_str()) {
        Some(byte) => hay[..byte].chars().count() as i64,
        None => -1,
    };
    Ok(Value::Int(index))
}

/// Non-empty and every char satisfies `pred`.
fn all_nonempty(s: &str, pred: impl Fn(char) -> bool) -> bool {
    !s.is_empty() && s.chars().all(pred)
}

/// Zero of every contiguous `0..=9` run in general category Nd.
const DECIMAL_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6,
    0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Digits outside Nd: superscripts, subscripts, circled and other compatibility forms.
const DIGIT_RANGES: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
    ('\u{10A40}', '\u{10A43}'),
    ('\u{10E60}', '\u{10E68}'),
    ('\u{11052}', '\u{1105A}'),
    ('\u{1F100}', '\u{1F10A}'),
];

fn is_decimal_char(c: char) -> bool {
    let cp = c as u32;
    DECIMAL_ZEROS.iter().any(|&zero| (zero..zero + 10).contains(&cp))
}

fn is_digit_char(c: char) -> bool {
    is_decimal_char(c) || DIGIT_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn isalpha(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(all_nonempty(&args[0], char::is_alphabetic).into())
}

fn isalnum(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(all_nonempty(&args[0], char::is_alphanumeric).into())
}

/// Empty text counts as ASCII.
fn isascii(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(args[0].is_ascii().into())
}

fn isdecimal(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(all_nonempty(&args[0], is_decimal_char).into())
}

fn isdigit(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(all_nonempty(&args[0], is_digit_char).into())
}

/// At least one cased char, and none of the opposite case.
fn cased_only(s: &str, wanted: fn(char) -> bool, other: fn(char) -> bool) -> bool {
    s.chars().any(wanted) && !s.chars().any(other)
}

fn islower(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(cased_only(&args[0], char::is_lowercase, char::is_uppercase).into())
}

fn isupper(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(cased_only(&args[0], char::is_uppercase, char::is_lowercase).into())
}

/// `str.join(sep, a, b, ...)`. A lone item is joined per character.
fn join(args: &[String]) -> FunctionResult {
    check_args(args, 2, usize::MAX)?;
    let sep = args[0].as_str();
    let joined = match &args[1..] {
        [single] => single
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join(sep),
        items => items.join(sep),
    };
    Ok(joined.into())
}

/// Optional second argument lists the chars to strip instead of whitespace.
fn strip_with(args: &[String], left: bool, right: bool) -> FunctionResult {
    check_args(args, 1, 2)?;
    let s = args[0].as_str();
    let out = match args.get(1) {
        Some(chars) => {
            let pred = |c: char| chars.contains(c);
            match (left, right) {
                (true, true) => s.trim_matches(pred),
                (true, false) => s.trim_start_matches(pred),
                _ => s.trim_end_matches(pred),
            }
        }
        None => match (left, right) {
            (true, true) => s.trim(),
            (true, false) => s.trim_start(),
            _ => s.trim_end(),
        },
    };
    Ok(out.into())
}

fn strip(args: &[String]) -> FunctionResult {
    strip_with(args, true, true)
}

fn lstrip(args: &[String]) -> FunctionResult {
    strip_with(args, true, false)
}

fn rstrip(args: &[String]) -> FunctionResult {
    strip_with(args, false, true)
}

fn removeprefix(args: &[String]) -> FunctionResult {
    check_args(args, 2, 2)?;
    let s = args[0].as_str();
    Ok(s.strip_prefix(args[1].as_str()).unwrap_or(s).into())
}

fn removesuffix(args: &[String]) -> FunctionResult {
    check_args(args, 2, 2)?;
    let s = args[0].as_str();
    Ok(s.strip_suffix(args[1].as_str()).unwrap_or(s).into())
}

/// `str.replace(s, old, new[, count])`; a negative count replaces all.
fn replace(args: &[String]) -> FunctionResult {
    check_args(args, 3, 4)?;
    let (s, from, to) = (&args[0], args[1].as_str(), args[2].as_str());
    let count = match args.get(3) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|e| FunctionError::InvalidArgument {
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        None => -1,
    };
    let out = match usize::try_from(count) {
        Ok(n) => s.replacen(from, to, n),
        Err(_) => s.replace(from, to),
    };
    Ok(out.into())
}

/// Length in characters.
fn len(args: &[String]) -> FunctionResult {
    check_args(args, 1, 1)?;
    Ok(Value::Int(args[0].chars().count() as i64))
}
