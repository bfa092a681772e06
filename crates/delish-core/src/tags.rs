//! Tag normalisation and aggregation.

use std::collections::HashMap;

use crate::models::store::TagCount;

/// Trim labels, drop blanks and keep the first occurrence of each tag.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Count how many tag lists contain each tag.
///
/// Sorted by count descending, then tag ascending.
pub fn tally<'a, I>(tag_lists: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for tags in tag_lists {
        for tag in normalize_tags(tags) {
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    out
}
