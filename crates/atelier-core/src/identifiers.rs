//! Handle and slug generation for new catalog entries.
//!
//! Handles combine a millisecond timestamp with a random token so that
//! independent writers never need a coordination round-trip to stay unique.
//! Slugs are the human-readable routing form of a title plus a short random
//! suffix.

use rand::Rng;

/// Prefix shared by every handle minted by [`new_handle`].
pub const HANDLE_PREFIX: &str = "product";

/// Stored slugs shorter than this are treated as missing and regenerated.
pub const MIN_SLUG_LEN: usize = 3;

const SLUG_SUFFIX_LEN: usize = 6;
const HANDLE_TOKEN_LEN: usize = 10;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mints a new catalog handle, e.g. `"product-m2x9k1c4-q8d0v7r2zt"`.
///
/// The timestamp segment orders handles by creation time; the random token
/// (36^10 possibilities) keeps handles minted in the same millisecond apart.
#[must_use]
pub fn new_handle() -> String {
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    format!(
        "{HANDLE_PREFIX}-{}-{}",
        to_base36(millis),
        random_token(HANDLE_TOKEN_LEN)
    )
}

/// Builds a URL-safe slug from `title` with a random 6-character suffix.
///
/// `"Silk Evening Gown!!"` becomes `"silk-evening-gown-"` followed by the
/// suffix. A title with no usable characters yields the bare suffix.
#[must_use]
pub fn slugify(title: &str) -> String {
    let base = slug_base(title);
    let suffix = random_token(SLUG_SUFFIX_LEN);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Deterministic slug for records whose stored slug is missing or too short.
///
/// Uses the title when it has any usable characters and borrows the last six
/// alphanumerics of the handle as the suffix, so repeated reads of the same
/// record always produce the same routable slug.
#[must_use]
pub fn fallback_slug(title: &str, handle: &str) -> String {
    let base = slug_base(title);
    if base.is_empty() {
        let from_handle = slug_base(handle);
        return if from_handle.len() >= MIN_SLUG_LEN {
            from_handle
        } else {
            HANDLE_PREFIX.to_owned()
        };
    }

    let tail: Vec<char> = handle
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let start = tail.len().saturating_sub(SLUG_SUFFIX_LEN);
    let suffix: String = tail[start..].iter().collect();

    if suffix.is_empty() {
        base
    } else {
        format!("{base}-{suffix}")
    }
}

/// Returns `true` if a stored slug is usable for routing as-is.
#[must_use]
pub fn is_plausible_slug(slug: &str) -> bool {
    slug.trim().len() >= MIN_SLUG_LEN
}

/// Lower-cases, drops non-word characters and joins word runs with single
/// hyphens. Leading and trailing hyphens never survive.
fn slug_base(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        #[allow(clippy::cast_possible_truncation)]
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
