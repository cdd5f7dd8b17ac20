//! Content identity.
//!
//! Every entity kind digests its semantic fields (never cached or derived
//! values) with MD5 and exposes the digest as a name-based UUID. Two entities
//! parsed independently from different sources are equal exactly when their
//! source data is.

use crate::id::Id;
use chrono::{NaiveTime, Timelike};
use md5::{Digest, Md5};
use stopgrid_types::{Distance, Point};
use uuid::Uuid;

/// Bumped whenever the digested fields of any kind change.
const DIGEST_VERSION: u32 = 1;

/// Incremental digest of an entity's fields.
///
/// Variable-length values are length prefixed, so adjacent fields can never
/// run into each other.
pub struct ContentHasher {
    md5: Md5,
}

impl ContentHasher {
    pub fn new(kind: &str) -> Self {
        let mut hasher = Self { md5: Md5::new() };
        hasher.u32(DIGEST_VERSION);
        hasher.str(kind);
        hasher
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.md5.update((bytes.len() as u64).to_le_bytes());
        self.md5.update(bytes);
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }

    pub fn opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => self.flag(true).str(value),
            None => self.flag(false),
        }
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.md5.update(value.to_le_bytes());
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.md5.update([u8::from(value)]);
        self
    }

    pub fn id(&mut self, id: &Id) -> &mut Self {
        self.str(id.operator()).str(id.type_name()).str(id.local())
    }

    pub fn opt_id(&mut self, id: Option<&Id>) -> &mut Self {
        match id {
            Some(id) => self.flag(true).id(id),
            None => self.flag(false),
        }
    }

    /// Digests the decimal value, so coded and float points agree.
    pub fn point(&mut self, point: &Point) -> &mut Self {
        self.f64(point.lat()).f64(point.lon())
    }

    pub fn opt_distance(&mut self, distance: Option<Distance>) -> &mut Self {
        match distance {
            Some(distance) => {
                self.flag(true);
                self.md5.update(distance.millis().to_le_bytes());
                self
            }
            None => self.flag(false),
        }
    }

    pub fn opt_time(&mut self, time: Option<NaiveTime>) -> &mut Self {
        match time {
            Some(time) => self
                .flag(true)
                .u32(time.num_seconds_from_midnight())
                .u32(time.nanosecond()),
            None => self.flag(false),
        }
    }

    /// Nested content, digested through its own identity.
    pub fn content<T: ContentHash>(&mut self, value: &T) -> &mut Self {
        self.md5.update(value.content_id().as_bytes());
        self
    }

    pub fn seq<'a, T, I>(&mut self, values: I) -> &mut Self
    where
        T: ContentHash + 'a,
        I: ExactSizeIterator<Item = &'a T>,
    {
        self.md5.update((values.len() as u64).to_le_bytes());
        for value in values {
            self.content(value);
        }
        self
    }

    fn f64(&mut self, value: f64) -> &mut Self {
        let value = if value == 0.0 { 0.0 } else { value };
        self.md5.update(value.to_bits().to_le_bytes());
        self
    }

    pub fn finish(self) -> Uuid {
        uuid::Builder::from_md5_bytes(self.md5.finalize().into()).into_uuid()
    }
}

/// A value whose identity is the digest of its semantic fields.
pub trait ContentHash {
    /// Seeds the digest so different kinds never collide on equal fields.
    const KIND: &'static str;

    fn hash_fields(&self, hasher: &mut ContentHasher);

    fn content_id(&self) -> Uuid {
        let mut hasher = ContentHasher::new(Self::KIND);
        self.hash_fields(&mut hasher);
        hasher.finish()
    }
}

/// Equality and hashing through [`ContentHash::content_id`].
macro_rules! content_identity {
    ($($ty:ty),+ $(,)?) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::hash::ContentHash::content_id(self)
                    == $crate::hash::ContentHash::content_id(other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&$crate::hash::ContentHash::content_id(self), state);
            }
        }
    )+};
}

pub(crate) use content_identity;

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl ContentHash for Named {
        const KIND: &'static str = "Named";

        fn hash_fields(&self, hasher: &mut ContentHasher) {
            hasher.str(self.0);
        }
    }

    struct Other(&'static str);

    impl ContentHash for Other {
        const KIND: &'static str = "Other";

        fn hash_fields(&self, hasher: &mut ContentHasher) {
            hasher.str(self.0);
        }
    }

    #[test]
    fn test_stable_and_versioned() {
        let a = Named("Jernbanetorget").content_id();
        assert_eq!(a, Named("Jernbanetorget").content_id());
        assert_eq!(a.get_version(), Some(uuid::Version::Md5));
        assert_ne!(a, Named("Nationaltheatret").content_id());
        assert_ne!(a, Other("Jernbanetorget").content_id());
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        let mut h1 = ContentHasher::new("x");
        h1.str("ab").str("c");
        let mut h2 = ContentHasher::new("x");
        h2.str("a").str("bc");
        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn test_point_digest_ignores_representation() {
        let mut coded = ContentHasher::new("p");
        coded.point(&Point::new(59.91, 10.75).unwrap());
        let mut float = ContentHasher::new("p");
        float.point(&Point::float(59.91, 10.75));
        assert_eq!(coded.finish(), float.finish());
    }
}
