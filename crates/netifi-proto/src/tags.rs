//! Tag map codec.
//!
//! Tags are string key/value pairs attached to setup and routing frames. On
//! the wire they are a flat run of `(i32 len, utf8 key, i32 len, utf8 value)`
//! pairs with no count and no terminator: the map runs to the end of the
//! frame, so the decoder must be told where the frame ends.
//!
//! Senders must emit keys in sorted order so every implementation produces the
//! same bytes for the same map. The codec writes pairs in the order it is
//! given and decodes them in wire order; it never re-sorts.

use std::collections::{BTreeMap, HashSet};

use bytes::BufMut;

use crate::{
    codec::{LENGTH_PREFIX_SIZE, Reader, prefixed_len, put_str},
    errors::{ProtocolError, Result},
};

/// Reserved tag carrying the destination name of a connecting client.
pub const DESTINATION_TAG: &str = "com.netifi.destination";

/// Ordered tag map with unique keys.
///
/// Maps built locally (via [`Tags::insert`], [`FromIterator`] or a
/// [`BTreeMap`]) are always sorted by key. Maps produced by [`decode_tags`]
/// keep the order found on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    /// Create an empty tag map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, keeping keys sorted. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();

        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, value));
        }

        let idx = self.entries.partition_point(|(k, _)| k.as_str() < key.as_str());
        self.entries.insert(idx, (key, value));
        None
    }

    /// Look up a tag value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no tags
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over tags in stored order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(as_pair)
    }

    /// True if keys are in ascending order
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].0 < pair[1].0)
    }

    /// Encoded size of the tag map
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.iter().map(|(k, v)| prefixed_len(k.len()) + prefixed_len(v.len())).sum()
    }

    /// Write every pair in stored order.
    pub fn encode(&self, dst: &mut impl BufMut) {
        encode_tags(self.iter(), dst);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self { entries: map.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(as_pair as fn(&'a (String, String)) -> (&'a str, &'a str))
    }
}

fn as_pair((key, value): &(String, String)) -> (&str, &str) {
    (key.as_str(), value.as_str())
}

/// Write key/value pairs in iteration order.
///
/// Callers supply pairs already sorted by key; the codec does not sort.
pub fn encode_tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>, dst: &mut impl BufMut) {
    for (key, value) in pairs {
        put_str(dst, key);
        put_str(dst, value);
    }
}

/// Read pairs until the cursor reaches `end`.
///
/// `end` is the frame length supplied out-of-band by the transport. A pair that
/// does not fit before `end` fails with [`ProtocolError::TruncatedTagMap`]; a
/// repeated key fails with [`ProtocolError::DuplicateKey`].
///
/// Runs in time linear in the number of pairs.
pub fn decode_tags<'a>(src: &mut Reader<'a>, end: usize) -> Result<Tags> {
    if end < src.position() || end > src.end() {
        return Err(ProtocolError::MalformedFrame {
            field: "tags",
            needed: end.saturating_sub(src.position()),
            remaining: src.remaining(),
        });
    }

    // Keys borrow from the frame buffer
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut tags = Tags::new();
    while src.position() < end {
        let offset = src.position();
        let key = read_tag_str(src, end, offset, "tag key")?;
        let value = read_tag_str(src, end, offset, "tag value")?;

        if !seen.insert(key) {
            return Err(ProtocolError::DuplicateKey(key.to_owned()));
        }
        tags.entries.push((key.to_owned(), value.to_owned()));
    }

    Ok(tags)
}

fn read_tag_str<'a>(
    src: &mut Reader<'a>,
    end: usize,
    offset: usize,
    field: &'static str,
) -> Result<&'a str> {
    let truncated = ProtocolError::TruncatedTagMap { offset, end };

    if end - src.position() < LENGTH_PREFIX_SIZE {
        return Err(truncated);
    }
    let len = src.read_len(field)?;
    if end - src.position() < len {
        return Err(truncated);
    }
    src.read_str(field, len)
}
