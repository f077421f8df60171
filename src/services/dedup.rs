//! The probe-and-compare step that decides whether a fresh upload is needed.

/// What the store reported for the target key.
///
/// "Not found" and "forbidden" probe responses both collapse into
/// `exists: false`; some stores answer 403 to hide that an object exists, so
/// neither response can confirm anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectState {
    pub exists: bool,
    pub content_digest: Option<String>,
}

impl RemoteObjectState {
    pub fn absent() -> Self {
        Self {
            exists: false,
            content_digest: None,
        }
    }

    pub fn present(content_digest: Option<String>) -> Self {
        Self {
            exists: true,
            content_digest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    MustUpload,
    SkipUpload,
}

/// Decides whether the bundle has to be transferred.
///
/// A digest match with overwrite off is the only path that skips the
/// transfer; every other combination re-uploads rather than risk leaving a
/// stale deploy in place. A missing local digest can never match, so a failed
/// fingerprint degrades to an upload.
pub fn decide(
    remote: &RemoteObjectState,
    local_digest: Option<&str>,
    overwrite_existing: bool,
) -> UploadDecision {
    if !remote.exists {
        return UploadDecision::MustUpload;
    }

    let digests_match = match (remote.content_digest.as_deref(), local_digest) {
        (Some(remote), Some(local)) => remote == local,
        _ => false,
    };

    if digests_match && !overwrite_existing {
        UploadDecision::SkipUpload
    } else {
        UploadDecision::MustUpload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn absent_remote_always_uploads() {
        let remote = RemoteObjectState::absent();
        for overwrite in [false, true] {
            assert_eq!(
                decide(&remote, Some(DIGEST), overwrite),
                UploadDecision::MustUpload
            );
            assert_eq!(decide(&remote, None, overwrite), UploadDecision::MustUpload);
        }
    }

    #[test]
    fn matching_digest_skips_unless_overwrite() {
        let remote = RemoteObjectState::present(Some(DIGEST.to_string()));
        assert_eq!(
            decide(&remote, Some(DIGEST), false),
            UploadDecision::SkipUpload
        );
        assert_eq!(
            decide(&remote, Some(DIGEST), true),
            UploadDecision::MustUpload
        );
    }

    #[test]
    fn digest_mismatch_always_uploads() {
        let remote = RemoteObjectState::present(Some("0000".to_string()));
        for overwrite in [false, true] {
            assert_eq!(
                decide(&remote, Some(DIGEST), overwrite),
                UploadDecision::MustUpload
            );
        }
    }

    #[test]
    fn unknown_digests_never_match() {
        // Remote exists but reported no digest.
        let remote = RemoteObjectState::present(None);
        assert_eq!(
            decide(&remote, Some(DIGEST), false),
            UploadDecision::MustUpload
        );

        // Local fingerprint failed.
        let remote = RemoteObjectState::present(Some(DIGEST.to_string()));
        assert_eq!(decide(&remote, None, false), UploadDecision::MustUpload);
    }
}
