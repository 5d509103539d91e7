//! Change detection against the last persisted image.

use sha2::{Digest as _, Sha256};

/// SHA-256 digest of a bank image.
pub type Digest = [u8; 32];

/// Computes the digest of `bytes`.
#[must_use]
pub fn digest(bytes: &[u8]) -> Digest {
    Sha256::digest(bytes).into()
}

/// Tracks whether the in-memory image diverges from what was last persisted.
///
/// Mutations only raise a cheap flag; the digest is recomputed lazily in
/// [`has_changed`](Self::has_changed), which lowers the flag again when the
/// mutation turned out to be a no-op.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    baseline: Option<Digest>,
    needs_check: bool,
}

impl ChangeDetector {
    /// Records `bytes` as the persisted state.
    pub fn mark_clean(&mut self, bytes: &[u8]) {
        self.baseline = Some(digest(bytes));
        self.needs_check = false;
    }

    /// Notes that the image may have changed.
    pub fn mark_dirty(&mut self) {
        self.needs_check = true;
    }

    /// Drops the baseline; the image counts as changed until the next save.
    pub fn forget_baseline(&mut self) {
        self.baseline = None;
        self.needs_check = true;
    }

    /// Returns the baseline digest, if one is known.
    #[must_use]
    pub fn baseline(&self) -> Option<&Digest> {
        self.baseline.as_ref()
    }

    /// Whether `bytes` differ from the baseline.
    pub fn has_changed(&mut self, bytes: &[u8]) -> bool {
        if !self.needs_check {
            return false;
        }
        if self.baseline == Some(digest(bytes)) {
            self.needs_check = false;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_after_mark_clean() {
        let mut detector = ChangeDetector::default();
        detector.mark_clean(b"abc");
        assert!(!detector.has_changed(b"something else entirely"));
        assert_eq!(detector.baseline(), Some(&digest(b"abc")));
    }

    #[test]
    fn noop_mutation_clears_flag() {
        let mut detector = ChangeDetector::default();
        detector.mark_clean(b"abc");
        detector.mark_dirty();
        assert!(!detector.has_changed(b"abc"));
        assert!(!detector.needs_check);
    }

    #[test]
    fn real_mutation_stays_dirty() {
        let mut detector = ChangeDetector::default();
        detector.mark_clean(b"abc");
        detector.mark_dirty();
        assert!(detector.has_changed(b"abd"));
        assert!(detector.has_changed(b"abd"));
        detector.mark_clean(b"abd");
        assert!(!detector.has_changed(b"abd"));
    }

    #[test]
    fn forgotten_baseline_is_dirty() {
        let mut detector = ChangeDetector::default();
        detector.mark_clean(b"abc");
        detector.forget_baseline();
        assert!(detector.has_changed(b"abc"));
    }

    #[test]
    fn digest_is_sha256() {
        let expected = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(digest(b"abc"), expected);
    }
}
