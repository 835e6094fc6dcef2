use std::borrow::Cow;

use crate::api_view::ApiUrls;

/// `value` percent-encoded as a single path segment, so `/`, `?` and `#` cannot
/// change the target resource. `None` for `.` and `..`, which URL parsers resolve
/// as dot segments however they are encoded.
pub fn encode_segment(value: &str) -> Option<Cow<'_, str>> {
    if value == "." || value == ".." {
        return None;
    }
    Some(urlencoding::encode(value))
}

/// Substitute path segments: a segment equal to a key, or to `{key}`, is replaced by
/// the key's percent-encoded value. A value that cannot be a path segment leaves the
/// template segment in place. The result always ends with `/`.
///
/// `http://svc/book/{book_id}/` with `book_id=1` becomes `http://svc/book/1/`.
pub fn insert_params_to_path(url: &str, params: &[(&str, &str)]) -> String {
    let (prefix, path) = match url.split_once("://") {
        Some((scheme, rest)) => (format!("{scheme}://"), rest),
        None => (String::new(), url),
    };
    let lookup = |segment: &str| {
        params
            .iter()
            .find(|(k, _)| *k == segment)
            .or_else(|| {
                let bare = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))?;
                params.iter().find(|(k, _)| *k == bare)
            })
            .and_then(|(_, v)| encode_segment(v))
    };
    let replaced: Vec<Cow<'_, str>> =
        path.split('/').map(|seg| lookup(seg).unwrap_or(Cow::Borrowed(seg))).collect();
    let mut out = prefix + &replaced.join("/");
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Find the view whose detail path is templated on `key` (for example `author_id`) and
/// return its identity together with the absolute detail URL template.
pub fn related_object_url<'a, I>(views: I, key: &str) -> Option<(&'a str, String)>
where
    I: IntoIterator<Item = (&'a str, &'a ApiUrls)>,
{
    let placeholder = format!("{{{key}}}");
    views
        .into_iter()
        .find(|(_, urls)| urls.detail_path.contains(&placeholder))
        .map(|(identity, urls)| (identity, format!("{}{}", urls.base_url, urls.detail_path)))
}
