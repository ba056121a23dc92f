mod extract;
mod fetcher;

pub use extract::{extract_body, html_to_text};
pub use fetcher::ReleaseNotesFetcher;
