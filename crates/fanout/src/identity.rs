//! Identities and batches - the targets of a bulk run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque token naming one target of a bulk operation.
///
/// What the token means is entirely up to the [`RemoteAction`]: a mailbox
/// UPN, a package id, a service name, a host name, a profile SID. The
/// driver only cares whether it is blank.
///
/// [`RemoteAction`]: crate::RemoteAction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from a raw token, as given by the source.
    ///
    /// No trimming is applied here; sources hand tokens over untouched so
    /// the driver can report blank entries instead of silently dropping
    /// them.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identity is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Identity {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// An ordered sequence of identities, processed in one run.
///
/// Insertion order is preserved and duplicates are kept: the source data is
/// trusted as given. A batch is built once at the start of a run and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    identities: Vec<Identity>,
}

impl Batch {
    /// Create a batch from a list of identities.
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    /// Number of identities in the batch, blank entries included.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the batch has no identities at all.
    ///
    /// An empty batch is fatal to the driver ([`BatchError::NoTargets`]):
    /// it almost always means a bad file path or an empty group upstream.
    ///
    /// [`BatchError::NoTargets`]: crate::BatchError::NoTargets
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Iterate identities in batch order.
    pub fn iter(&self) -> std::slice::Iter<'_, Identity> {
        self.identities.iter()
    }
}

impl FromIterator<Identity> for Batch {
    fn from_iter<T: IntoIterator<Item = Identity>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Batch {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Identity::from).collect())
    }
}

impl FromIterator<String> for Batch {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Identity::from).collect())
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Identity;
    type IntoIter = std::slice::Iter<'a, Identity>;

    fn into_iter(self) -> Self::IntoIter {
        self.identities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_blank_detection() {
        assert!(Identity::new("").is_blank());
        assert!(Identity::new("   ").is_blank());
        assert!(Identity::new("\t\n").is_blank());
        assert!(!Identity::new("user@contoso.com").is_blank());
        assert!(!Identity::new(" spaced ").is_blank());
    }

    #[test]
    fn batch_preserves_order_and_duplicates() {
        let batch: Batch = ["b", "a", "b"].into_iter().collect();
        let tokens: Vec<&str> = batch.iter().map(Identity::as_str).collect();
        assert_eq!(tokens, vec!["b", "a", "b"]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn empty_batch() {
        let batch = Batch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
