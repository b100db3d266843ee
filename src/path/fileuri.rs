//! `file://` URI <-> local dirent conversion (spec §4.4).
//!
//! POSIX dirents map onto `file:///absolute/path`, lowercase-host-less.
//! DOS dirents are trickier: a drive letter has to live inside the URI
//! path (`file:///C:/foo`, the classic three-slash form), and a UNC host
//! becomes the URI's authority (`file://host/share/foo`).
use crate::error::CoreError;
use crate::path::dirent::{Dirent, DirentBuf, Platform};
use crate::path::uri::{Uri, UriBuf};

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn percent_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = String::with_capacity(segment.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(h), Some(l)) = (bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                if let (Some(hv), Some(lv)) = (hex_val(h), hex_val(l)) {
                    out.push(((hv << 4) | lv) as char);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// `uri_from_file_dirent(dirent) -> file_uri`: always produces an
/// absolute, canonical `file://` URI from an absolute dirent.
pub fn uri_from_file_dirent(dirent: &Dirent, platform: Platform) -> Result<UriBuf, CoreError> {
    if !dirent.is_absolute(platform) {
        return Err(CoreError::IllegalUrl {
            input: dirent.as_str().to_string(),
            reason: "dirent must be absolute to convert to a file:// URI",
        });
    }
    let encoded_path: Vec<String> = match platform {
        Platform::Posix => dirent
            .as_str()
            .trim_start_matches('/')
            .split('/')
            .map(percent_encode)
            .collect(),
        Platform::Dos => {
            if let Some(rest) = dirent.as_str().strip_prefix("//") {
                // UNC: host becomes authority, not part of the URI path.
                let mut it = rest.splitn(2, '/');
                let host = it.next().unwrap_or("");
                let share_path = it.next().unwrap_or("");
                let segments: Vec<String> = share_path.split('/').filter(|s| !s.is_empty()).map(percent_encode).collect();
                return Ok(UriBuf::from_str(&format!(
                    "file://{}/{}",
                    host.to_ascii_lowercase(),
                    segments.join("/")
                )));
            }
            // The drive marker's trailing `:` is kept literal rather than
            // percent-encoded, matching the classic `file:///C:/foo` form.
            dirent
                .as_str()
                .split('/')
                .enumerate()
                .map(|(i, seg)| {
                    if i == 0 && is_drive_segment(seg) {
                        seg.to_string()
                    } else {
                        percent_encode(seg)
                    }
                })
                .collect()
        }
    };
    Ok(UriBuf::from_str(&format!(
        "file:///{}",
        encoded_path.join("/")
    )))
}

/// `dirent_from_file_uri(file_uri) -> dirent`: inverse of
/// [`uri_from_file_dirent`]. Fails if the scheme isn't `file`, or (on DOS)
/// the path's first segment isn't a recognizable drive letter and the
/// authority isn't a usable UNC host.
pub fn dirent_from_file_uri(uri: &Uri, platform: Platform) -> Result<DirentBuf, CoreError> {
    if uri.scheme() != Some("file") {
        return Err(CoreError::IllegalUrl {
            input: uri.as_str().to_string(),
            reason: "not a file:// URI",
        });
    }
    let authority = uri.authority().unwrap_or("");
    let path_start = "file://".len() + authority.len();
    let raw_path = &uri.as_str()[path_start..];
    let segments: Vec<String> = raw_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode(s))
        .collect();

    match platform {
        Platform::Posix => {
            if !authority.is_empty() && authority != "localhost" {
                return Err(CoreError::IllegalUrl {
                    input: uri.as_str().to_string(),
                    reason: "POSIX dirents have no UNC form; host must be empty or localhost",
                });
            }
            Ok(DirentBuf::from_str(
                &format!("/{}", segments.join("/")),
                platform,
            ))
        }
        Platform::Dos => {
            if !authority.is_empty() && authority != "localhost" {
                return Ok(DirentBuf::from_str(
                    &format!("//{}/{}", authority, segments.join("/")),
                    platform,
                ));
            }
            match segments.first() {
                Some(first) if is_drive_segment(first) => {
                    let drive = first.replace('|', ":").to_ascii_uppercase();
                    let rest = &segments[1..];
                    let mut full = drive;
                    if !full.ends_with(':') {
                        return Err(CoreError::IllegalUrl {
                            input: uri.as_str().to_string(),
                            reason: "expected drive letter segment",
                        });
                    }
                    full.push('/');
                    full.push_str(&rest.join("/"));
                    Ok(DirentBuf::from_str(&full, platform))
                }
                _ => Err(CoreError::IllegalUrl {
                    input: uri.as_str().to_string(),
                    reason: "file:// URI path has no recognizable DOS drive letter",
                }),
            }
        }
    }
}

fn is_drive_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && matches!(chars.next(), Some(':') | Some('|'))
        && chars.next().is_none()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn posix_roundtrip() {
        let d = DirentBuf::from_str("/foo/bar baz", Platform::Posix);
        let u = uri_from_file_dirent(&d, Platform::Posix).unwrap();
        assert_eq!(u.as_str(), "file:///foo/bar%20baz");
        let back = dirent_from_file_uri(&u, Platform::Posix).unwrap();
        assert_eq!(back.as_str(), d.as_str());
    }

    #[test]
    fn dos_drive_roundtrip() {
        let d = DirentBuf::from_str("C:/foo/bar", Platform::Dos);
        let u = uri_from_file_dirent(&d, Platform::Dos).unwrap();
        assert_eq!(u.as_str(), "file:///C:/foo/bar");
        let back = dirent_from_file_uri(&u, Platform::Dos).unwrap();
        assert_eq!(back.as_str(), "C:/foo/bar");
    }

    #[test]
    fn dos_unc_roundtrip() {
        let d = DirentBuf::from_str("//host/share/foo", Platform::Dos);
        let u = uri_from_file_dirent(&d, Platform::Dos).unwrap();
        assert_eq!(u.as_str(), "file://host/share/foo");
        let back = dirent_from_file_uri(&u, Platform::Dos).unwrap();
        assert_eq!(back.as_str(), "//host/share/foo");
    }

    #[test]
    fn dos_pipe_drive_marker_and_lowercase_letter_normalize() {
        let u = UriBuf::from_str("file:///C|/x%20y");
        let back = dirent_from_file_uri(&u, Platform::Dos).unwrap();
        assert_eq!(back.as_str(), "C:/x y");

        let lower = UriBuf::from_str("file:///c:/foo");
        let back = dirent_from_file_uri(&lower, Platform::Dos).unwrap();
        assert_eq!(back.as_str(), "C:/foo");
    }

    #[test]
    fn rejects_non_localhost_host_on_posix() {
        let u = UriBuf::from_str("file://evilhost/foo");
        assert!(dirent_from_file_uri(&u, Platform::Posix).is_err());
    }

    #[test]
    fn rejects_non_file_scheme() {
        let u = UriBuf::from_str("http://host/foo");
        assert!(dirent_from_file_uri(&u, Platform::Posix).is_err());
    }

    #[test]
    fn rejects_relative_dirent() {
        let d = DirentBuf::from_str("foo/bar", Platform::Posix);
        assert!(uri_from_file_dirent(&d, Platform::Posix).is_err());
    }
}
