use std::fmt;

pub const START_MARKER: &str = "<!-- Cards -->";
pub const END_MARKER: &str = "<!-- Logic -->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMarker {
    Start,
    /// Start marker present, no end marker after it.
    End,
}

impl fmt::Display for MissingMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingMarker::Start => write!(f, "no {} marker", START_MARKER),
            MissingMarker::End => write!(f, "no {} marker after {}", END_MARKER, START_MARKER),
        }
    }
}

/// Replace everything between the first start marker and the next end marker.
///
/// Both markers are kept as-is; the fragment goes on its own lines between them.
pub fn splice_section(document: &str, fragment: &str) -> Result<String, MissingMarker> {
    let start = document.find(START_MARKER).ok_or(MissingMarker::Start)?;
    let body_start = start + START_MARKER.len();
    let end = document[body_start..]
        .find(END_MARKER)
        .map(|offset| body_start + offset)
        .ok_or(MissingMarker::End)?;

    let head = &document[..body_start];
    let tail = &document[end..];
    let mut out = String::with_capacity(head.len() + fragment.len() + tail.len() + 2);
    out.push_str(head);
    out.push('\n');
    out.push_str(fragment);
    out.push('\n');
    out.push_str(tail);
    Ok(out)
}

// ── Tests ──
