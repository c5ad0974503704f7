//! Minimal markup scanning helpers for the HTML and XML parsers.
//!
//! Deliberately naive and tailored to the fixed structure of provider
//! bulletins; case-insensitive on tag and attribute names. Not a general
//! HTML parser and not meant to be one.

/// Find the next complete `<open ...> ... </close>` block from `from`
/// onwards, case-insensitive. Returns (start, end) byte offsets of the
/// whole block including both tags.
pub(crate) fn next_tag_block_ci(
    s: &str,
    open_tag: &str,
    close_tag: &str,
    from: usize,
) -> Option<(usize, usize)> {
    // ASCII-only lowering keeps byte offsets stable in non-ASCII documents.
    let lc = s.to_ascii_lowercase();
    let open_lc = open_tag.to_ascii_lowercase();
    let close_lc = close_tag.to_ascii_lowercase();

    let start = lc.get(from..)?.find(&open_lc)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&close_lc)?;
    Some((start, open_end + end_rel + close_tag.len()))
}

/// All complete blocks of the named element in document order, exact on
/// the element name (`region` will not match `<regions>`), case-insensitive,
/// including self-closing forms.
pub(crate) fn element_blocks_ci<'a>(s: &'a str, name: &str) -> Vec<&'a str> {
    let lc = s.to_ascii_lowercase();
    let open = format!("<{}", name.to_ascii_lowercase());
    let close = format!("</{}>", name.to_ascii_lowercase());

    let mut blocks = Vec::new();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(&open) {
        let start = from + rel;
        let boundary = lc.as_bytes().get(start + open.len()).copied();
        if !matches!(boundary, Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')) {
            from = start + open.len();
            continue;
        }
        let open_end = match s[start..].find('>') {
            Some(i) => start + i + 1,
            None => break,
        };
        if s[start..open_end].ends_with("/>") {
            blocks.push(&s[start..open_end]);
            from = open_end;
            continue;
        }
        match lc[open_end..].find(&close) {
            Some(c) => {
                let end = open_end + c + close.len();
                blocks.push(&s[start..end]);
                from = end;
            }
            None => from = open_end,
        }
    }
    blocks
}

/// Inner content of a block like `<tag ...>INNER</tag>` (may still contain
/// nested tags).
pub(crate) fn inner_after_open_tag(block: &str) -> &str {
    let open_end = match block.find('>') {
        Some(i) => i,
        None => return "",
    };
    let close_start = match block.rfind('<') {
        Some(i) => i,
        None => return "",
    };
    if close_start > open_end {
        &block[open_end + 1..close_start]
    } else {
        ""
    }
}

/// Value of an attribute in the block's opening tag, case-insensitive on
/// the attribute name. Handles `name="v"`, `name='v'`, and bare `name=v`.
pub(crate) fn tag_attr(block: &str, name: &str) -> Option<String> {
    let open_end = block.find('>').unwrap_or(block.len());
    let tag = &block[..open_end];
    let tag_lc = tag.to_ascii_lowercase();
    let needle = format!("{}=", name.to_ascii_lowercase());

    let mut search_from = 0;
    loop {
        let rel = tag_lc[search_from..].find(&needle)?;
        let at = search_from + rel;
        // Attribute names are delimited by whitespace; skip substrings like
        // data-src when looking for src.
        let preceded_ok = at == 0
            || tag_lc[..at]
                .chars()
                .last()
                .is_some_and(|c| c.is_whitespace());
        if !preceded_ok {
            search_from = at + needle.len();
            continue;
        }
        let value_start = at + needle.len();
        let rest = &tag[value_start..];
        let mut chars = rest.chars();
        return Some(match chars.next() {
            Some(q @ ('"' | '\'')) => {
                let inner = &rest[1..];
                inner[..inner.find(q).unwrap_or(inner.len())].to_string()
            }
            Some(_) => rest
                .split(|c: char| c.is_whitespace() || c == '>')
                .next()
                .unwrap_or("")
                .trim_end_matches('/')
                .to_string(),
            None => String::new(),
        });
    }
}
