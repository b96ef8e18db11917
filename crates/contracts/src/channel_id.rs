//! ChannelId - Cheap-to-clone channel identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Identifier of one monitored frame channel.
///
/// Channel names are fixed at configuration time and cloned on every captured
/// message, so the identifier wraps `Arc<str>`: a clone only bumps a
/// reference count instead of allocating.
///
/// # Examples
/// ```
/// use contracts::ChannelId;
///
/// let id: ChannelId = "road_camera".into();
/// let tag = id.clone(); // O(1)
/// assert_eq!(tag, "road_camera");
/// ```
#[derive(Clone, Default)]
pub struct ChannelId(Arc<str>);

impl ChannelId {
    /// Create a new ChannelId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ChannelId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ChannelId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Borrow<str> lets HashMap/BTreeMap keyed by ChannelId be probed with &str.
impl Borrow<str> for ChannelId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ChannelId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({:?})", self.0)
    }
}

impl PartialEq for ChannelId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ChannelId {}

impl PartialEq<str> for ChannelId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for ChannelId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialOrd for ChannelId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChannelId {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Hash for ChannelId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for ChannelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn test_clone_shares_storage() {
        let id: ChannelId = "wide_camera".into();
        let other = id.clone();
        assert_eq!(id.as_str().as_ptr(), other.as_str().as_ptr());
    }

    #[test]
    fn test_str_equality() {
        let id: ChannelId = "road_camera".into();
        assert_eq!(id, "road_camera");
        assert_eq!(id, ChannelId::from("road_camera"));
        assert_ne!(id, ChannelId::from("driver_camera"));
    }

    #[test]
    fn test_map_probe_with_str() {
        let mut counts: HashMap<ChannelId, usize> = HashMap::new();
        counts.insert("road_camera".into(), 600);
        assert_eq!(counts.get("road_camera"), Some(&600));
    }

    #[test]
    fn test_ordering_in_sets() {
        let mut set = BTreeSet::new();
        set.insert(ChannelId::from("b"));
        set.insert(ChannelId::from("a"));
        let ordered: Vec<_> = set.iter().map(|c| c.as_str()).collect();
        assert_eq!(ordered, ["a", "b"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let id: ChannelId = "driver_camera".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"driver_camera\"");
        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
