//! Temporary artifact naming
//!
//! Temporary host files are named `<stem><suffix>` where the suffix is
//! lowercase hex drawn from an [`EntropySource`]. Randomness is injected
//! rather than global so tests can pin the suffix or make it fail.

use crate::error::BuildError;
use rand::RngCore;
use rand::rngs::OsRng;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default suffix length in hex characters
pub const DEFAULT_SUFFIX_LENGTH: usize = 10;

/// A source of random bytes
pub trait EntropySource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// The operating system's CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

pub struct ArtifactNamer {
    entropy: Box<dyn EntropySource>,
    suffix_length: usize,
}

impl ArtifactNamer {
    pub fn new(entropy: Box<dyn EntropySource>, suffix_length: usize) -> Self {
        ArtifactNamer {
            entropy,
            suffix_length,
        }
    }

    /// Generate a random lowercase hex suffix.
    ///
    /// Fails if the entropy source fails; never falls back to a
    /// predictable or empty suffix.
    pub fn suffix(&self) -> Result<String, BuildError> {
        let mut bytes = vec![0u8; self.suffix_length.div_ceil(2)];
        self.entropy
            .fill(&mut bytes)
            .map_err(BuildError::RandomSource)?;
        let mut suffix = hex::encode(bytes);
        suffix.truncate(self.suffix_length);
        Ok(suffix)
    }

    /// Append a fresh suffix to `stem`: `dir/app` -> `dir/app3f9a0c12be`
    pub fn name(&self, stem: &Path) -> Result<PathBuf, BuildError> {
        let suffix = self.suffix()?;
        let mut name = OsString::from(stem.as_os_str());
        name.push(suffix);
        Ok(PathBuf::from(name))
    }
}

impl Default for ArtifactNamer {
    fn default() -> Self {
        ArtifactNamer::new(Box::new(OsEntropy), DEFAULT_SUFFIX_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    /// Fills every byte with the same value
    struct FixedEntropy(u8);

    impl EntropySource for FixedEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(self.0);
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(io::Error::other("entropy pool unavailable")))
        }
    }

    #[test]
    fn test_suffix_format() {
        let namer = ArtifactNamer::new(Box::new(FixedEntropy(0xab)), 10);
        assert_eq!(namer.suffix().unwrap(), "ababababab");
    }

    #[test]
    fn test_odd_suffix_length_is_truncated() {
        let namer = ArtifactNamer::new(Box::new(FixedEntropy(0x0f)), 7);
        assert_eq!(namer.suffix().unwrap(), "0f0f0f0");
    }

    #[test]
    fn test_name_appends_to_stem() {
        let namer = ArtifactNamer::new(Box::new(FixedEntropy(0x12)), 10);
        let name = namer.name(Path::new("dir/app")).unwrap();
        assert_eq!(name, PathBuf::from("dir/app1212121212"));
    }

    #[test]
    fn test_os_suffix_is_lowercase_hex() {
        let namer = ArtifactNamer::default();
        let suffix = namer.suffix().unwrap();
        assert_eq!(suffix.len(), DEFAULT_SUFFIX_LENGTH);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_entropy_failure_is_reported() {
        let namer = ArtifactNamer::new(Box::new(BrokenEntropy), 10);
        let err = namer.name(Path::new("app")).unwrap_err();
        assert!(matches!(err, BuildError::RandomSource(_)));
        assert!(err.to_string().contains("entropy pool unavailable"));
    }

    #[test]
    fn test_no_collisions_in_ten_thousand_samples() {
        let namer = ArtifactNamer::default();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let name = namer.name(Path::new("main")).unwrap();
            assert!(seen.insert(name), "duplicate temporary name generated");
        }
    }
}
