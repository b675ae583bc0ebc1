//! Frame authentication for the redirector
//!
//! A verifier decides whether a datagram may enter the show and returns the
//! part of it that holds the Art-Net frame.
//!
//! [`SharedKey`] appends an 8-byte tag after the frame: the first 8 bytes
//! of `SHA-256(SHA-256(key) || frame)`. This keeps casual senders and
//! misconfigured consoles out. It is NOT cryptographically strong: the tag
//! is truncated, there is no nonce and no replay protection, and anyone who
//! captures a tagged frame can resend it.

use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Bytes appended to every frame by [`SharedKey::seal`]
pub const TAG_LEN: usize = 8;

/// Decides whether an inbound datagram is accepted
pub trait FrameVerifier: Send + Sync + fmt::Debug {
    /// The Art-Net frame inside `datagram`, or `None` to drop it
    fn verify<'a>(&self, datagram: &'a [u8]) -> Option<&'a [u8]>;
}

/// Accepts every datagram as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl FrameVerifier for OpenAccess {
    fn verify<'a>(&self, datagram: &'a [u8]) -> Option<&'a [u8]> {
        Some(datagram)
    }
}

/// Pre-shared key checked through a trailing tag
#[derive(Clone)]
pub struct SharedKey {
    key_hash: [u8; 32],
}

impl SharedKey {
    /// Derive the verifier from the plaintext key; only its hash is kept
    pub fn new(key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        Self {
            key_hash: hasher.finalize().into(),
        }
    }

    /// Append the tag for this key to an Art-Net frame
    pub fn seal(&self, frame: &[u8]) -> Vec<u8> {
        let mut datagram = Vec::with_capacity(frame.len() + TAG_LEN);
        datagram.extend_from_slice(frame);
        datagram.extend_from_slice(&self.tag(frame));
        datagram
    }

    /// Short, non-secret identifier of the key for logs
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.key_hash[..4])
    }

    fn tag(&self, frame: &[u8]) -> [u8; TAG_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(self.key_hash);
        hasher.update(frame);
        let digest = hasher.finalize();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&digest[..TAG_LEN]);
        tag
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl FrameVerifier for SharedKey {
    fn verify<'a>(&self, datagram: &'a [u8]) -> Option<&'a [u8]> {
        let split = datagram.len().checked_sub(TAG_LEN)?;
        let (frame, tag) = datagram.split_at(split);
        let expected = self.tag(frame);

        if bool::from(expected[..].ct_eq(tag)) {
            Some(frame)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_access_passes_through() {
        let datagram = [1u8, 2, 3];
        assert_eq!(OpenAccess.verify(&datagram), Some(&datagram[..]));
    }

    #[test]
    fn test_seal_then_verify() {
        let key = SharedKey::new("stage-left");
        let sealed = key.seal(b"frame bytes");
        assert_eq!(sealed.len(), 11 + TAG_LEN);
        assert_eq!(key.verify(&sealed), Some(&b"frame bytes"[..]));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sealed = SharedKey::new("right").seal(b"frame");
        assert_eq!(SharedKey::new("wrong").verify(&sealed), None);
    }

    #[test]
    fn test_tampered_frame_rejected() {
        let key = SharedKey::new("key");
        let mut sealed = key.seal(b"frame");
        sealed[0] ^= 0x01;
        assert_eq!(key.verify(&sealed), None);
    }

    #[test]
    fn test_untagged_and_short_rejected() {
        let key = SharedKey::new("key");
        assert_eq!(key.verify(b"short"), None);
        assert_eq!(key.verify(b""), None);
        assert_eq!(key.verify(b"an untagged frame"), None);
    }

    #[test]
    fn test_debug_hides_key() {
        let key = SharedKey::new("super secret");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super secret"));
        assert!(debug.contains(&key.fingerprint()));
        assert_eq!(key.fingerprint().len(), 8);
    }
}
