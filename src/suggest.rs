use strsim::levenshtein;

/// Up to 3 candidates close to `needle` by edit distance, nearest first.
pub(crate) fn suggest<'a>(needle: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    if needle.is_empty() {
        return vec![];
    }

    let max_dist = match needle.len() {
        0..=3 => 1,
        4..=6 => 2,
        7..=10 => 3,
        _ => 4,
    };

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|&c| !c.is_empty() && c != needle)
        .map(|c| {
            // Case-only differences count as a single edit
            let dist = if c.eq_ignore_ascii_case(needle) {
                1
            } else {
                levenshtein(needle, c)
            };
            (dist, c)
        })
        .filter(|&(dist, _)| dist <= max_dist)
        .collect();

    scored.sort_by(|(da, a), (db, b)| da.cmp(db).then(a.len().cmp(&b.len())).then(a.cmp(b)));
    scored.dedup_by(|(_, a), (_, b)| a == b);

    scored.into_iter().take(3).map(|(_, s)| s).collect()
}

pub(crate) fn did_you_mean<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let v = suggest(needle, candidates);
    match v.len() {
        0 => None,
        1 => Some(format!("did you mean `{}`?", v[0])),
        _ => Some(format!(
            "did you mean one of: {}?",
            v.iter()
                .map(|s| format!("`{}`", s))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
