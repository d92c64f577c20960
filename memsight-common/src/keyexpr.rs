use crate::error::{Error, Result};

/// Default key expression prefix for all memsight data.
pub const KEY_PREFIX: &str = "memsight";

/// Characters with a special meaning inside Zenoh key expressions.
const RESERVED_CHARS: [char; 4] = ['*', '$', '?', '#'];

/// Build the key expression a metric batch is published on.
///
/// Key expressions follow the pattern `<prefix>/<namespace>/<source>`.
///
/// # Example
/// ```
/// use memsight_common::keyexpr::batch_key;
///
/// let key = batch_key("memsight", "System/Linux", "host01");
/// assert_eq!(key, "memsight/System/Linux/host01");
/// ```
pub fn batch_key(prefix: &str, namespace: &str, source: &str) -> String {
    format!("{}/{}/{}", prefix, namespace, source)
}

/// Build the key expression for agent status.
///
/// # Example
/// ```
/// use memsight_common::keyexpr::status_key;
///
/// assert_eq!(status_key("memsight"), "memsight/@/status");
/// ```
pub fn status_key(prefix: &str) -> String {
    format!("{}/@/status", prefix)
}

/// Check that a namespace can be embedded in a key expression.
///
/// A namespace may contain `/` separators but no empty chunks and none of
/// the reserved wildcard characters.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    validate_chunks("namespace", namespace)
}

/// Check that a key prefix can start every published key expression.
///
/// Same rules as [`validate_namespace`].
pub fn validate_key_prefix(prefix: &str) -> Result<()> {
    validate_chunks("key prefix", prefix)
}

fn validate_chunks(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::KeyExpr(format!("{} must not be empty", what)));
    }

    if value.split('/').any(str::is_empty) {
        return Err(Error::KeyExpr(format!(
            "{} '{}' contains an empty chunk",
            what, value
        )));
    }

    if let Some(c) = value.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(Error::KeyExpr(format!(
            "{} '{}' contains reserved character '{}'",
            what, value, c
        )));
    }

    Ok(())
}

/// Sanitize a string for use as a single key expression chunk.
/// Replaces problematic characters with underscores.
pub fn sanitize_key(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '/' | ' ' | '*' | '$' | '?' | '#' => {
                if !result.ends_with('_') && !result.is_empty() {
                    result.push('_');
                }
            }
            _ => result.push(c),
        }
    }
    result.trim_matches('_').to_string()
}

/// Split a batch key back into namespace and source.
///
/// Returns `None` if the key does not start with `prefix` or has no
/// namespace chunk.
pub fn parse_batch_key<'a>(prefix: &str, key: &'a str) -> Option<ParsedBatchKey<'a>> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('/')?;
    let (namespace, source) = rest.rsplit_once('/')?;

    if namespace.is_empty() || source.is_empty() || namespace == "@" {
        return None;
    }

    Some(ParsedBatchKey { namespace, source })
}

/// Parsed components of a batch key expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBatchKey<'a> {
    pub namespace: &'a str,
    pub source: &'a str,
}
