mod rendered_content;
mod version;
mod version_file;

pub use rendered_content::{RenderedContent, CONTENT_TYPE_HTML};
pub use version::{NewVersion, Version};
pub use version_file::{OperatingSystem, ReleaseDownload, VersionFile};
