//! Root-containment checks and target-set condensing (spec §4.3).
//!
//! `is_under_root` is the one place this crate resolves `..` segments: a
//! literal `..` component in a dirent is meaningful to the filesystem (it
//! walks up a directory) in a way it isn't for a symbolic relpath, so a
//! "does this stay inside its root" check has to actually fold it rather
//! than treat it as an opaque segment the way `canonicalize` does.
use crate::error::CoreResult;
use crate::path::dirent::{Dirent, DirentBuf, Platform};

/// Outcome of folding a relative path onto a root and checking it doesn't
/// escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnderRootOutcome {
    /// The folded path stays within `root`; carries the resulting dirent.
    Contained(DirentBuf),
    /// Folding `relative` onto `root` walked above `root` itself.
    Escaped,
}

/// `is_under_root(root, relative) -> Contained(path) | Escaped`: joins
/// `relative` onto `root` one segment at a time, resolving `.` and `..`
/// structurally, and fails closed the moment the walk would climb above
/// `root`.
pub fn is_under_root(root: &Dirent, relative: &str, platform: Platform) -> UnderRootOutcome {
    let mut segments: Vec<String> = root
        .as_str()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let floor = segments.len();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.len() <= floor {
                    return UnderRootOutcome::Escaped;
                }
                segments.pop();
            }
            other => segments.push(other.to_string()),
        }
    }
    let rooted = root.is_absolute(platform);
    let joined = segments.join("/");
    let full = if rooted {
        format!("/{}", joined)
    } else {
        joined
    };
    UnderRootOutcome::Contained(DirentBuf::from_str(&full, platform))
}

/// `condense_targets(targets, remove_redundancies) -> (common_base, relative_suffixes)`:
/// absolutizes each target against the current directory (spec §4.3 step 1),
/// then folds the absolutized targets down to their longest common ancestor
/// and returns each target's path relative to it. If `remove_redundancies` is
/// set, drops any target that is itself a descendant of another retained
/// target, and drops any target equal to the common base.
pub fn condense_targets(
    targets: &[DirentBuf],
    remove_redundancies: bool,
    platform: Platform,
) -> CoreResult<(DirentBuf, Vec<DirentBuf>)> {
    let targets: Vec<DirentBuf> = targets
        .iter()
        .map(|t| t.get_absolute(platform))
        .collect::<CoreResult<_>>()?;
    let Some(first) = targets.first() else {
        return Ok((DirentBuf::new(), Vec::new()));
    };
    let mut common: DirentBuf = first.clone();
    for t in &targets[1..] {
        common = Dirent::longest_ancestor(&common, t, platform).to_owned();
    }

    let kept: Vec<&DirentBuf> = if remove_redundancies {
        targets
            .iter()
            .filter(|t| t.as_str() != common.as_str())
            .filter(|t| {
                !targets
                    .iter()
                    .any(|other| other.as_str() != t.as_str() && other.is_ancestor(t, platform))
            })
            .collect()
    } else {
        targets.iter().collect()
    };

    let relatives = kept
        .iter()
        .map(|t| common.skip_ancestor(t, platform).to_owned())
        .collect();
    Ok((common, relatives))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn under_root_simple() {
        let root = DirentBuf::from_str("/repo/wc", Platform::Posix);
        match is_under_root(&root, "foo/bar", Platform::Posix) {
            UnderRootOutcome::Contained(p) => assert_eq!(p.as_str(), "/repo/wc/foo/bar"),
            UnderRootOutcome::Escaped => panic!("should be contained"),
        }
    }

    #[test]
    fn under_root_resolves_dotdot_inside() {
        let root = DirentBuf::from_str("/repo/wc", Platform::Posix);
        match is_under_root(&root, "foo/../bar", Platform::Posix) {
            UnderRootOutcome::Contained(p) => assert_eq!(p.as_str(), "/repo/wc/bar"),
            UnderRootOutcome::Escaped => panic!("should be contained"),
        }
    }

    #[test]
    fn under_root_escapes() {
        let root = DirentBuf::from_str("/repo/wc", Platform::Posix);
        match is_under_root(&root, "../../etc/passwd", Platform::Posix) {
            UnderRootOutcome::Escaped => {}
            UnderRootOutcome::Contained(p) => panic!("should have escaped, got {:?}", p),
        }
    }

    #[test]
    fn condense_finds_common_ancestor() {
        let targets = vec![
            DirentBuf::from_str("/repo/a/b", Platform::Posix),
            DirentBuf::from_str("/repo/a/c", Platform::Posix),
        ];
        let (common, relatives) = condense_targets(&targets, false, Platform::Posix).unwrap();
        assert_eq!(common.as_str(), "/repo/a");
        assert_eq!(relatives[0].as_str(), "b");
        assert_eq!(relatives[1].as_str(), "c");
    }

    #[test]
    fn condense_drops_redundant_descendants() {
        let targets = vec![
            DirentBuf::from_str("/x/a", Platform::Posix),
            DirentBuf::from_str("/x/a/b", Platform::Posix),
            DirentBuf::from_str("/x/c", Platform::Posix),
        ];
        let (common, relatives) = condense_targets(&targets, true, Platform::Posix).unwrap();
        assert_eq!(common.as_str(), "/x");
        let suffixes: Vec<&str> = relatives.iter().map(|r| r.as_str()).collect();
        assert_eq!(suffixes, vec!["a", "c"]);
    }

    #[test]
    fn condense_absolutizes_relative_targets() {
        let targets = vec![
            DirentBuf::from_str("a", Platform::Posix),
            DirentBuf::from_str("b", Platform::Posix),
        ];
        let (common, relatives) = condense_targets(&targets, false, Platform::Posix).unwrap();
        assert!(common.is_absolute(Platform::Posix));
        let suffixes: Vec<&str> = relatives.iter().map(|r| r.as_str()).collect();
        assert_eq!(suffixes, vec!["a", "b"]);
    }

    #[test]
    fn get_absolute_leaves_absolute_paths_alone() {
        let d = DirentBuf::from_str("/repo/wc", Platform::Posix);
        let resolved = d.get_absolute(Platform::Posix).unwrap();
        assert_eq!(resolved.as_str(), "/repo/wc");
    }

    #[test]
    fn get_absolute_resolves_relative_against_cwd() {
        let d = DirentBuf::from_str("foo/bar", Platform::Posix);
        let resolved = d.get_absolute(Platform::Posix).unwrap();
        assert!(resolved.is_absolute(Platform::Posix));
        assert!(resolved.as_str().ends_with("foo/bar"));
    }
}
