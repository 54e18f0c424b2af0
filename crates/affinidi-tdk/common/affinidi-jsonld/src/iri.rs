//! IRI helpers: absoluteness checks and base-relative resolution (RFC 3986 §5.2).

/// Check if a string looks like an absolute IRI (has a scheme).
pub fn is_absolute_iri(value: &str) -> bool {
    match value.find(':') {
        Some(colon_pos) => is_scheme(&value[..colon_pos]),
        None => false,
    }
}

/// Check if a string is a blank node identifier (`_:label`).
pub fn is_blank_node(value: &str) -> bool {
    value.starts_with("_:")
}

/// A scheme starts with a letter and contains only letters, digits, `+`, `-` and `.`.
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}

#[derive(Debug, Default, PartialEq)]
struct IriRef<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> IriRef<'a> {
    fn parse(iri: &'a str) -> Self {
        let (rest, fragment) = match iri.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (iri, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (scheme, rest) = match rest.find(':') {
            Some(pos) if is_scheme(&rest[..pos]) => (Some(&rest[..pos]), &rest[pos + 1..]),
            _ => (None, rest),
        };
        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                (Some(&after[..end]), &after[end..])
            }
            None => (None, rest),
        };

        IriRef {
            scheme,
            authority,
            path,
            query,
            fragment,
        }
    }
}

/// Resolve `relative` against `base`.
///
/// Dot segments are collapsed by hand so that excess `../` segments stop at
/// the root instead of leaking into the result. A base ending in `#` or an
/// empty reference is joined by plain concatenation.
pub fn resolve_base_relative(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return relative.to_string();
    }
    if relative.is_empty() || base.ends_with('#') {
        return format!("{base}{relative}");
    }

    let base_ref = IriRef::parse(base);

    if relative.starts_with('?') {
        let reference = IriRef::parse(relative);
        return recompose(
            base_ref.scheme,
            base_ref.authority,
            base_ref.path,
            reference.query,
            reference.fragment,
        );
    }

    let reference = IriRef::parse(relative);

    if reference.scheme.is_some() {
        let path = remove_dot_segments(reference.path);
        return recompose(
            reference.scheme,
            reference.authority,
            &path,
            reference.query,
            reference.fragment,
        );
    }

    let (authority, path, query) = if reference.authority.is_some() {
        (
            reference.authority,
            remove_dot_segments(reference.path),
            reference.query,
        )
    } else if reference.path.is_empty() {
        (
            base_ref.authority,
            base_ref.path.to_string(),
            reference.query.or(base_ref.query),
        )
    } else if reference.path.starts_with('/') {
        (
            base_ref.authority,
            remove_dot_segments(reference.path),
            reference.query,
        )
    } else {
        let merged = merge_paths(&base_ref, reference.path);
        (
            base_ref.authority,
            remove_dot_segments(&merged),
            reference.query,
        )
    };

    recompose(base_ref.scheme, authority, &path, query, reference.fragment)
}

fn merge_paths(base: &IriRef<'_>, relative_path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{relative_path}");
    }
    match base.path.rfind('/') {
        Some(pos) => format!("{}{relative_path}", &base.path[..=pos]),
        None => relative_path.to_string(),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let mut input = path.to_string();
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if input.starts_with("../") {
            input.replace_range(..3, "");
        } else if input.starts_with("./") {
            input.replace_range(..2, "");
        } else if input.starts_with("/./") {
            input.replace_range(..3, "/");
        } else if input == "/." {
            input = "/".to_string();
        } else if input.starts_with("/../") {
            input.replace_range(..4, "/");
            pop_last_segment(&mut output);
        } else if input == "/.." {
            input = "/".to_string();
            pop_last_segment(&mut output);
        } else if input == "." || input == ".." {
            input.clear();
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map(|pos| pos + start)
                .unwrap_or(input.len());
            output.push_str(&input[..end]);
            input.replace_range(..end, "");
        }
    }

    output
}

fn pop_last_segment(output: &mut String) {
    match output.rfind('/') {
        Some(pos) => output.truncate(pos),
        None => output.clear(),
    }
}

fn recompose(
    scheme: Option<&str>,
    authority: Option<&str>,
    path: &str,
    query: Option<&str>,
    fragment: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(scheme) = scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(path);
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
