use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_words};
use std::collections::HashSet;

/// Parsed query. Words borrow from the raw query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: Vec<&'a str>,
    pub minus_words: Vec<&'a str>,
}

struct QueryWord<'a> {
    data: &'a str,
    is_minus: bool,
}

fn parse_query_word(word: &str) -> Result<QueryWord<'_>> {
    match word.strip_prefix('-') {
        Some("") => Err(SearchError::invalid("no word after '-' in query")),
        Some(rest) if rest.starts_with('-') => {
            Err(SearchError::invalid(format!("double minus in query word {word:?}")))
        }
        Some(rest) => Ok(QueryWord { data: rest, is_minus: true }),
        None => Ok(QueryWord { data: word, is_minus: false }),
    }
}

/// Validate the whole query, then classify each word. Stop words are dropped
/// after the minus prefix is stripped, so `-and` is ignored like `and`.
fn classify<'a>(raw_query: &'a str, is_stop_word: &impl Fn(&str) -> bool) -> Result<Query<'a>> {
    if !is_valid_word(raw_query) {
        return Err(SearchError::invalid("query contains control characters"));
    }
    let mut query = Query::default();
    for word in split_words(raw_query) {
        let parsed = parse_query_word(word)?;
        if is_stop_word(parsed.data) {
            continue;
        }
        if parsed.is_minus {
            query.minus_words.push(parsed.data);
        } else {
            query.plus_words.push(parsed.data);
        }
    }
    Ok(query)
}

/// Parse a query into sorted, deduplicated plus and minus word lists.
pub fn parse_query<'a>(raw_query: &'a str, is_stop_word: impl Fn(&str) -> bool) -> Result<Query<'a>> {
    let mut query = classify(raw_query, &is_stop_word)?;
    for words in [&mut query.plus_words, &mut query.minus_words] {
        words.sort_unstable();
        words.dedup();
    }
    Ok(query)
}

/// Same as [`parse_query`] but leaves the word order unspecified.
/// Ranking only adds into a map keyed by document id, so order does not matter.
pub fn parse_query_without_sort<'a>(
    raw_query: &'a str,
    is_stop_word: impl Fn(&str) -> bool,
) -> Result<Query<'a>> {
    let mut query = classify(raw_query, &is_stop_word)?;
    for words in [&mut query.plus_words, &mut query.minus_words] {
        let mut seen = HashSet::with_capacity(words.len());
        words.retain(|w| seen.insert(*w));
    }
    Ok(query)
}
