/// Archive types published for each release.
const ARCHIVE_EXTENSIONS: [&str; 4] = [".tar.bz2", ".tar.gz", ".7z", ".zip"];

/// Directory holding a release's source archives. Betas live under a separate tree.
pub fn release_directory(artifactory_url: &str, release: &str) -> String {
    if is_beta(release) {
        format!("{}beta/{}/source/", artifactory_url, release)
    } else {
        format!("{}release/{}/source/", artifactory_url, release)
    }
}

fn is_beta(label: &str) -> bool {
    label.contains("beta")
}

/// Pick the downloadable archives out of a directory listing and make their URLs absolute.
/// Each URL is the directory without its trailing slash, a `/`, then the child URI as listed.
///
/// The directory also carries release candidates, betas and `.json` metadata; those are
/// skipped. Matching is plain substring matching, so any name containing `rc` is treated
/// as a release candidate.
pub fn filter_artifact_uris<'a, I>(directory: &str, release: &str, uris: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let beta = is_beta(release);
    let base = directory.trim_end_matches('/');

    uris.into_iter()
        .filter(|uri| {
            let excluded = (uri.contains("beta") && !beta)
                || uri.contains("rc")
                || uri.ends_with(".json");
            !excluded
        })
        .filter(|uri| ARCHIVE_EXTENSIONS.iter().any(|ext| uri.ends_with(ext)))
        .map(|uri| format!("{}/{}", base, uri))
        .collect()
}
