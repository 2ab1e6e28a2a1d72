//! Remote URL to checkout folder name mapping

/// Derive the checkout folder name from a remote URL.
///
/// Takes the final path segment with any `.git` suffix removed and
/// replaces every character other than alphanumerics, `-` and `_` with `_`.
///
/// `https://bitbucket.org/team/my.service.git` -> `my_service`
pub fn repo_folder_name(url: &str) -> String {
    let url = url.strip_suffix(".git").unwrap_or(url);
    let last = url.rsplit('/').next().unwrap_or(url);

    last.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
