//! `svn:externals` property parsing (spec §6).
//!
//! Not part of either subsystem proper — the core's involvement is limited
//! to the line grammar and the path/URL validation it leans on `PathAlgebra`
//! for. The repository access layer and working-copy checkout logic that
//! actually fetch externals are out of scope.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::path::relpath::RelpathBuf;
use crate::path::uri::UriBuf;

/// One parsed line of a `svn:externals` property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDef {
    pub target: RelpathBuf,
    pub revision: Option<u64>,
    pub url: UriBuf,
}

static REVISION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-r\s*(\d+)$").unwrap());

/// `parse_externals(value, parent_path) -> [ExternalDef]`: splits `value`
/// into lines, skips blank lines and `#`-comments, and parses each
/// remaining line as `TARGET_DIR URL`, `TARGET_DIR -rN URL`, or
/// `TARGET_DIR -r N URL`. Any other shape is an
/// [`CoreError::InvalidExternalsDescription`] naming the offending line and
/// `parent_path`.
pub fn parse_externals(value: &str, parent_path: &str) -> CoreResult<Vec<ExternalDef>> {
    let mut out = Vec::new();
    for line in value.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        out.push(parse_line(line, parent_path)?);
    }
    Ok(out)
}

fn parse_line(line: &str, parent_path: &str) -> CoreResult<ExternalDef> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let reject = || CoreError::InvalidExternalsDescription {
        line: line.to_string(),
        parent: parent_path.to_string(),
    };

    let (target_tok, revision, url_tok) = match tokens.as_slice() {
        [target, url] => (*target, None, *url),
        [target, flag, url] => {
            let rev = REVISION_PATTERN
                .captures(flag)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .ok_or_else(reject)?;
            (*target, Some(rev), *url)
        }
        [target, flag, num, url] if *flag == "-r" => {
            let rev = num.parse::<u64>().map_err(|_| reject())?;
            (*target, Some(rev), *url)
        }
        _ => return Err(reject()),
    };

    let target = validate_single_component(target_tok).ok_or_else(reject)?;
    log::debug!("parsed external: {} -> {}", target, url_tok);
    Ok(ExternalDef {
        target,
        revision,
        url: UriBuf::from_str(url_tok),
    })
}

/// `TARGET_DIR` must canonicalize to a single relative path component: no
/// embedded separators, no `.`/empty segments.
fn validate_single_component(s: &str) -> Option<RelpathBuf> {
    let candidate = RelpathBuf::from_str(s);
    if candidate.is_empty() || candidate.components().count() != 1 {
        return None;
    }
    Some(candidate)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_line() {
        let defs = parse_externals("vendor http://host/repo/vendor", "/trunk").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].target.as_str(), "vendor");
        assert_eq!(defs[0].revision, None);
        assert_eq!(defs[0].url.as_str(), "http://host/repo/vendor");
    }

    #[test]
    fn revision_attached() {
        let defs = parse_externals("vendor -r42 http://host/repo/vendor", "/trunk").unwrap();
        assert_eq!(defs[0].revision, Some(42));
    }

    #[test]
    fn revision_spaced() {
        let defs = parse_externals("vendor -r 42 http://host/repo/vendor", "/trunk").unwrap();
        assert_eq!(defs[0].revision, Some(42));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let defs = parse_externals(
            "\n# comment\nvendor http://host/repo/vendor\n",
            "/trunk",
        )
        .unwrap();
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn multiple_lines() {
        let defs = parse_externals(
            "a http://host/a\nb -r5 http://host/b",
            "/trunk",
        )
        .unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].target.as_str(), "b");
    }

    #[test]
    fn rejects_malformed_line() {
        let err = parse_externals("this line has too many tokens to match any shape", "/trunk")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidExternalsDescription { .. }));
    }

    #[test]
    fn rejects_multi_component_target() {
        let err = parse_externals("a/b http://host/repo", "/trunk").unwrap_err();
        assert!(matches!(err, CoreError::InvalidExternalsDescription { .. }));
    }
}
