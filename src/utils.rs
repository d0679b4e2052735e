use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Marker that opens or closes a fenced block, matched anywhere in a line.
pub const FENCE: &[u8] = b"```";

/// Level-2 heading whose text is an absolute-looking file path.
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^## /").expect("heading pattern is a valid regex"));

/// Returns the file path named by a heading line, or `None` if the line is not one.
///
/// The `## ` marker is removed and the remaining text trimmed, so
/// `"## /src/lib.rs  "` yields `"/src/lib.rs"`. Bytes that are not UTF-8 are
/// replaced rather than rejected.
pub fn heading_path(line: &[u8]) -> Option<String> {
    if !HEADING_RE.is_match(line) {
        return None;
    }
    let rest = line.strip_prefix(b"## ")?;
    Some(String::from_utf8_lossy(rest).trim().to_owned())
}

pub fn is_fence(line: &[u8]) -> bool {
    find_fence(line).is_some()
}

fn find_fence(line: &[u8]) -> Option<usize> {
    line.windows(FENCE.len()).position(|w| w == FENCE)
}

/// Info string following the fence marker, e.g. `go` for "```go".
pub fn fence_language(line: &[u8]) -> Option<String> {
    let start = find_fence(line)? + FENCE.len();
    let rest = &line[start..];
    let rest = &rest[rest.iter().take_while(|&&b| b == b'`').count()..];
    let lang = String::from_utf8_lossy(rest).trim().to_owned();
    if lang.is_empty() { None } else { Some(lang) }
}

/// Strips a trailing `\n` and then one `\r`, as line readers do for CRLF input.
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
