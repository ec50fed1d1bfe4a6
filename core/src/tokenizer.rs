use std::collections::BTreeSet;

/// Split text into words on runs of the space character. Empty runs are skipped.
///
/// Only `' '` separates words; tabs and newlines never reach this point because
/// [`is_valid_word`] rejects them first.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(' ').filter(|w| !w.is_empty())
}

/// A word (or whole text) is valid when it carries no C0 control character.
pub fn is_valid_word(text: &str) -> bool {
    !text.bytes().any(|b| b < b' ')
}

/// Collect distinct, non-empty strings in sorted order.
pub fn unique_non_empty<I, S>(strings: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    strings
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| s.as_ref().to_string())
        .collect()
}
