use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("File location must be a valid path or URL: '{0}'")]
pub struct InvalidTarget(pub String);

/// What gets submitted for analysis: bytes from disk or a URL the service fetches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    LocalFile(PathBuf),
    RemoteUrl(Url),
}

impl SubmissionTarget {
    /// Existing local paths take precedence over anything URL-shaped.
    pub fn resolve(location: &str) -> Result<Self, InvalidTarget> {
        let path = Path::new(location);
        if path.is_file() {
            return Ok(SubmissionTarget::LocalFile(path.to_path_buf()));
        }

        match Url::parse(location.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Ok(SubmissionTarget::RemoteUrl(url))
            }
            _ => Err(InvalidTarget(location.to_string())),
        }
    }

    /// Short name used to key logs and summaries.
    pub fn display_name(&self) -> String {
        match self {
            SubmissionTarget::LocalFile(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            SubmissionTarget::RemoteUrl(url) => url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }
}

impl fmt::Display for SubmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionTarget::LocalFile(path) => write!(f, "{}", path.display()),
            SubmissionTarget::RemoteUrl(url) => write!(f, "{url}"),
        }
    }
}

impl std::str::FromStr for SubmissionTarget {
    type Err = InvalidTarget;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubmissionTarget::resolve(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_is_local() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let location = file.path().to_str().unwrap();
        assert_eq!(
            SubmissionTarget::resolve(location).unwrap(),
            SubmissionTarget::LocalFile(file.path().to_path_buf())
        );
    }

    #[test]
    fn http_and_https_are_remote() {
        for location in ["https://example.com/bills/HKE1.png", "http://example.com/a.pdf"] {
            match SubmissionTarget::resolve(location).unwrap() {
                SubmissionTarget::RemoteUrl(url) => assert_eq!(url.as_str(), location),
                other => panic!("expected url, got {other:?}"),
            }
        }
    }

    #[test]
    fn other_strings_are_invalid() {
        for location in ["", "no/such/file.pdf", "ftp://example.com/a.pdf", "not a url"] {
            assert_eq!(
                SubmissionTarget::resolve(location),
                Err(InvalidTarget(location.to_string()))
            );
        }
    }

    #[test]
    fn display_name_uses_last_segment() {
        let t = SubmissionTarget::resolve("https://example.com/bills/HKE1.png").unwrap();
        assert_eq!(t.display_name(), "HKE1.png");
        let t = SubmissionTarget::LocalFile(PathBuf::from("/tmp/bills/march.pdf"));
        assert_eq!(t.display_name(), "march.pdf");
    }
}
