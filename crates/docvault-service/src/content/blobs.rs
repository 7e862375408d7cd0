//! Best-effort blob cleanup.

use tracing::{debug, warn};

use docvault_core::traits::ObjectStore;

/// Whether `content_ref` points at an object this store owns.
pub(crate) fn is_owned_key(content_ref: &str) -> bool {
    !(content_ref.starts_with("http://") || content_ref.starts_with("https://"))
}

/// Delete every owned object in `content_refs`. Failures are logged and skipped.
pub(crate) async fn release(objects: &dyn ObjectStore, content_refs: &[String]) {
    for key in content_refs.iter().filter(|r| is_owned_key(r)) {
        match objects.delete(key).await {
            Ok(()) => debug!(key = %key, "Blob deleted"),
            Err(e) => warn!(key = %key, error = %e, "Failed to delete blob"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_urls_are_not_owned() {
        assert!(is_owned_key("5f0c.pdf"));
        assert!(!is_owned_key("https://cdn.example.com/5f0c.pdf"));
    }
}
