//! Constraint grammar shared by Poetry manifests and PEP 440 `requires_python`
//!
//! Handles:
//! - Any: `*` or an empty string
//! - Caret: `^1.2.3` (Poetry)
//! - Tilde: `~1.2.3` (Poetry) and compatible release `~=1.2.3` (PEP 440)
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `!=1.2.3`
//! - Exact: `1.2.3`, `=1.2.3`, `==1.2.3`
//! - Wildcard: `1.2.*`, `==1.2.*`, `!=1.2.*`
//! - Conjunction with `,` or whitespace, disjunction with `||` or `|`

use crate::domain::{Comparator, Operator, Version, VersionConstraint};
use crate::error::ConstraintError;
use regex::Regex;
use std::sync::LazyLock;

static OR_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|\|?\s*").unwrap());

// `>= 1.2` is written by hand often enough to accept
static OPERATOR_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(===|==|~=|!=|>=|<=|\^|~|>|<|=)\s+").unwrap());

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(===|==|~=|!=|>=|<=|\^|~|>|<|=)?(.+)$").unwrap());

/// Parses a constraint expression
pub fn parse_constraint(text: &str) -> Result<VersionConstraint, ConstraintError> {
    let trimmed = text.trim();

    if trimmed.is_empty() || trimmed == "*" {
        return Ok(VersionConstraint::any());
    }

    let mut alternatives = Vec::new();
    for alternative in OR_SPLIT_RE.split(trimmed) {
        if alternative.trim().is_empty() {
            return Err(ConstraintError::invalid_constraint(
                trimmed,
                "empty alternative",
            ));
        }

        let normalized = OPERATOR_SPACE_RE.replace_all(alternative.trim(), "${1}");
        let mut comparators = Vec::new();
        for term in normalized
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            comparators.extend(parse_term(trimmed, term)?);
        }
        alternatives.push(comparators);
    }

    Ok(VersionConstraint::new(trimmed, alternatives))
}

fn parse_term(raw: &str, term: &str) -> Result<Vec<Comparator>, ConstraintError> {
    let caps = TERM_RE
        .captures(term)
        .ok_or_else(|| ConstraintError::invalid_constraint(raw, format!("bad term '{}'", term)))?;
    let op = caps.get(1).map_or("", |m| m.as_str());
    let version_text = caps.get(2).map_or("", |m| m.as_str());

    if version_text == "*" {
        return match op {
            "" | "=" | "==" => Ok(Vec::new()),
            _ => Err(ConstraintError::invalid_constraint(
                raw,
                format!("'{}' cannot be combined with '*'", op),
            )),
        };
    }

    if let Some(prefix) = version_text.strip_suffix(".*") {
        let prefix = parse_version(raw, prefix)?;
        return match op {
            "" | "=" | "==" => Ok(vec![Comparator::new(Operator::Wildcard, prefix)]),
            "!=" => Ok(vec![Comparator::new(Operator::NotWildcard, prefix)]),
            // `>=3.6.*` shows up in old requires_python metadata
            ">=" | ">" | "<=" | "<" => ordered(raw, op, prefix),
            _ => Err(ConstraintError::invalid_constraint(
                raw,
                format!("'{}' cannot be used with a wildcard", op),
            )),
        };
    }

    let version = parse_version(raw, version_text)?;
    match op {
        "^" => {
            let upper = caret_upper_bound(raw, &version)?;
            Ok(vec![
                Comparator::new(Operator::GreaterOrEqual, version),
                Comparator::new(Operator::Less, upper),
            ])
        }
        "~" => {
            let index = if version.release().len() >= 2 { 1 } else { 0 };
            let upper = bump(raw, &version, index)?;
            Ok(vec![
                Comparator::new(Operator::GreaterOrEqual, version),
                Comparator::new(Operator::Less, upper),
            ])
        }
        "~=" => {
            let len = version.release().len();
            if len < 2 {
                return Err(ConstraintError::invalid_constraint(
                    raw,
                    "'~=' needs at least two release components",
                ));
            }
            let upper = bump(raw, &version, len - 2)?;
            Ok(vec![
                Comparator::new(Operator::GreaterOrEqual, version),
                Comparator::new(Operator::Less, upper),
            ])
        }
        "" | "=" | "==" | "===" => Ok(vec![Comparator::new(Operator::Equal, version)]),
        "!=" => Ok(vec![Comparator::new(Operator::NotEqual, version)]),
        _ => ordered(raw, op, version),
    }
}

fn ordered(raw: &str, op: &str, version: Version) -> Result<Vec<Comparator>, ConstraintError> {
    let op = match op {
        ">=" => Operator::GreaterOrEqual,
        ">" => Operator::Greater,
        "<=" => Operator::LessOrEqual,
        "<" => Operator::Less,
        other => {
            return Err(ConstraintError::invalid_constraint(
                raw,
                format!("unknown operator '{}'", other),
            ))
        }
    };
    Ok(vec![Comparator::new(op, version)])
}

/// Upper bound of a caret range: the left-most non-zero component is locked
fn caret_upper_bound(raw: &str, version: &Version) -> Result<Version, ConstraintError> {
    let release = version.release();
    let index = release
        .iter()
        .position(|&part| part != 0)
        .unwrap_or(release.len() - 1);
    bump(raw, version, index)
}

fn bump(raw: &str, version: &Version, index: usize) -> Result<Version, ConstraintError> {
    version
        .bumped(index)
        .ok_or_else(|| ConstraintError::invalid_constraint(raw, "version component too large"))
}

fn parse_version(raw: &str, text: &str) -> Result<Version, ConstraintError> {
    Version::parse(text).map_err(|e| ConstraintError::invalid_constraint(raw, e.to_string()))
}
