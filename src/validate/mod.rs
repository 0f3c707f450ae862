//! Field validation rules.
//!
//! Every rule returns the list of violation messages (empty = valid) and
//! never touches its input. [`fatal`] turns a non-empty list into an error
//! of the caller's chosen kind.

use std::path::Path;

use crate::error::{BridgeError, Result};

/// A named field and its raw value, as handed to the group rules.
pub type Field<'a> = (&'a str, Option<&'a str>);

/// A value is missing when absent or blank after trimming.
pub fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Every field must be present. Reports all missing names in one message.
pub fn require_all(fields: &[Field<'_>], tool: &str) -> Vec<String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| is_missing(*value))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        return vec![];
    }
    vec![format!(
        "[{}] - required parameters for {} are missing",
        missing.join(","),
        tool
    )]
}

/// At least one group must be complete.
pub fn require_one_of(groups: &[&[Field<'_>]], tool: &str) -> Vec<String> {
    let satisfied = groups
        .iter()
        .any(|group| !group.is_empty() && group.iter().all(|(_, v)| !is_missing(*v)));
    if satisfied {
        return vec![];
    }
    let names: Vec<String> = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect();
    vec![format!(
        "[{}] - at least one of these parameters for {} is required",
        names.join("|"),
        tool
    )]
}

/// Case-insensitive membership in a fixed token set.
pub fn enum_member(value: &str, allowed: &[&str], field: &str) -> Vec<String> {
    let token = value.trim();
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(token)) {
        return vec![];
    }
    let mut message = format!(
        "Invalid value `{}` for {}, expected one of: {}",
        token,
        field,
        allowed.join(", ")
    );
    if let Some(suggestion) = closest_match(token, allowed) {
        message.push_str(&format!(" (did you mean {suggestion}?)"));
    }
    vec![message]
}

/// Present values must parse as a non-negative integer no larger than
/// `u32::MAX`.
pub fn numeric(value: Option<&str>, field: &str) -> Vec<String> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return vec![];
    };
    match v.parse::<u64>() {
        Ok(n) if n > u64::from(u32::MAX) => {
            vec![format!("Invalid value for `{field}`: must not exceed {}", u32::MAX)]
        }
        Ok(_) => vec![],
        Err(_) => vec![format!("Invalid value for `{field}`")],
    }
}

/// Both fields set at once is a violation.
pub fn mutually_exclusive(first: (&str, bool), second: (&str, bool)) -> Vec<String> {
    if first.1 && second.1 {
        vec![format!(
            "Invalid parameters: {} and {} cannot be set together",
            first.0, second.0
        )]
    } else {
        vec![]
    }
}

/// A present value must name an existing filesystem path.
pub fn path_exists(value: Option<&str>, label: &str) -> Vec<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if !Path::new(v).exists() => {
            vec![format!("Invalid {label}: {v} does not exist")]
        }
        _ => vec![],
    }
}

/// Fail with `kind` carrying the joined violations, if there are any.
pub fn fatal(violations: Vec<String>, kind: fn(String) -> BridgeError) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(kind(violations.join("; ")))
    }
}

/// Split a comma-separated list of enum tokens into canonical upper case.
///
/// Blank entries are dropped, duplicates keep their first position and
/// any unknown token is an [`BridgeError::InvalidValue`].
pub fn parse_token_list(raw: &str, allowed: &[&str], field: &str) -> Result<Vec<String>> {
    let mut tokens: Vec<String> = Vec::new();
    let mut violations = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let found = enum_member(token, allowed, field);
        if !found.is_empty() {
            violations.extend(found);
            continue;
        }
        let canonical = token.to_uppercase();
        if !tokens.contains(&canonical) {
            tokens.push(canonical);
        }
    }
    fatal(violations, BridgeError::InvalidValue)?;
    if tokens.is_empty() {
        return Err(BridgeError::InvalidValue(format!(
            "Invalid value for `{field}`: no values given"
        )));
    }
    Ok(tokens)
}

fn closest_match<'a>(token: &str, allowed: &[&'a str]) -> Option<&'a str> {
    let upper = token.to_uppercase();
    allowed
        .iter()
        .map(|candidate| (levenshtein::levenshtein(&upper, candidate), *candidate))
        .filter(|(distance, _)| *distance > 0 && *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
