use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What produced a frame, derived from the annotation suffix some
/// stack collapsers append to the symbol (`_[k]`, `_[i]`, `_[j]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    User,
    Kernel,
    Inlined,
    Jit,
}

/// A reference-counted, immutable frame label.
///
/// Folding repeats the same symbol across thousands of records and every
/// call-tree node clones its name, so `.clone()` must be a pointer copy
/// rather than a heap allocation. Wraps `Arc<str>`.
///
/// Implements `PartialEq<&str>` so assertions like
/// `assert_eq!(node.name, "main")` work naturally.
#[derive(Debug, Clone, Eq)]
pub struct FrameName(Arc<str>);

impl FrameName {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The annotation kind encoded in the trailing `_[x]` suffix, if any.
    pub fn kind(&self) -> FrameKind {
        match self.annotation() {
            Some("k") => FrameKind::Kernel,
            Some("i") => FrameKind::Inlined,
            Some("j") => FrameKind::Jit,
            _ => FrameKind::User,
        }
    }

    /// The symbol without its annotation suffix, for display and hashing.
    pub fn display(&self) -> &str {
        match self.annotation() {
            Some(_) => &self.0[..self.0.len() - 4],
            None => &self.0,
        }
    }

    /// A coarse grouping key: the leading path component of the symbol.
    ///
    /// `std::vec::Vec::push` groups as `std`, `libc.so.6` as `libc`,
    /// `java/util/HashMap.get` as `java`. A symbol with no separator
    /// groups as itself.
    pub fn package(&self) -> &str {
        let name = self.display();
        let end = name
            .find("::")
            .or_else(|| name.find('/'))
            .or_else(|| name.find('.'))
            .unwrap_or(name.len());
        &name[..end]
    }

    fn annotation(&self) -> Option<&str> {
        // Byte-wise suffix match: the name may end in arbitrary UTF-8, so
        // offsets like len-4 are not guaranteed char boundaries until the
        // surrounding ASCII markers are confirmed.
        let s: &str = &self.0;
        let b = s.as_bytes();
        if b.len() >= 4
            && b[b.len() - 4] == b'_'
            && b[b.len() - 3] == b'['
            && b[b.len() - 1] == b']'
            && b[b.len() - 2].is_ascii_lowercase()
        {
            return Some(&s[s.len() - 2..s.len() - 1]);
        }
        None
    }
}

// --- Equality / ordering / hashing ---

impl PartialEq for FrameName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer means equal.
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PartialEq<str> for FrameName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for FrameName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Ord for FrameName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for FrameName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::hash::Hash for FrameName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

// --- Deref / Borrow / AsRef ---

impl std::ops::Deref for FrameName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FrameName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for FrameName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// --- Conversions ---

impl From<&str> for FrameName {
    #[inline]
    fn from(s: &str) -> Self {
        FrameName(Arc::from(s))
    }
}

impl From<String> for FrameName {
    #[inline]
    fn from(s: String) -> Self {
        FrameName(Arc::from(s.as_str()))
    }
}

impl std::fmt::Display for FrameName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// --- Serde (hand-rolled to avoid the `rc` feature flag) ---

impl Serialize for FrameName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FrameName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FrameName(Arc::from(s.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_allocation() {
        let a = FrameName::from("vfs_read");
        let b = a.clone();
        assert_eq!(&*a, &*b);
        assert_eq!(a, b);
    }

    #[test]
    fn kernel_annotation() {
        let f = FrameName::from("do_sys_open_[k]");
        assert_eq!(f.kind(), FrameKind::Kernel);
        assert_eq!(f.display(), "do_sys_open");
    }

    #[test]
    fn inlined_and_jit_annotations() {
        assert_eq!(FrameName::from("memcpy_[i]").kind(), FrameKind::Inlined);
        assert_eq!(FrameName::from("Ljava/lang;_[j]").kind(), FrameKind::Jit);
    }

    #[test]
    fn unannotated_is_user() {
        let f = FrameName::from("main");
        assert_eq!(f.kind(), FrameKind::User);
        assert_eq!(f.display(), "main");
    }

    #[test]
    fn short_name_is_not_annotated() {
        // Too short to carry a "_[x]" suffix.
        let f = FrameName::from("[k]");
        assert_eq!(f.kind(), FrameKind::User);
    }

    #[test]
    fn multibyte_symbols_near_the_suffix_do_not_panic() {
        // Ends in ']' with a multi-byte char straddling the would-be
        // suffix offset; must classify as plain user frames.
        for name in ["é]]]", "λ]", "日本語_[é]", "演算子[]"] {
            let f = FrameName::from(name);
            assert_eq!(f.kind(), FrameKind::User);
            assert_eq!(f.display(), name);
        }
    }

    #[test]
    fn multibyte_symbol_with_real_annotation() {
        let f = FrameName::from("計算_[k]");
        assert_eq!(f.kind(), FrameKind::Kernel);
        assert_eq!(f.display(), "計算");
    }

    #[test]
    fn package_grouping() {
        assert_eq!(FrameName::from("std::vec::Vec::push").package(), "std");
        assert_eq!(FrameName::from("libc.so.6").package(), "libc");
        assert_eq!(FrameName::from("java/util/HashMap.get").package(), "java");
        assert_eq!(FrameName::from("main").package(), "main");
    }

    #[test]
    fn package_ignores_annotation() {
        assert_eq!(FrameName::from("ext4_file_write_[k]").package(), "ext4_file_write");
    }

    #[test]
    fn hashmap_lookup_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(FrameName::from("key"), 42);
        assert_eq!(map.get("key"), Some(&42));
    }

    #[test]
    fn serde_roundtrip() {
        let f = FrameName::from("fold");
        let json = serde_json::to_string(&f).unwrap_or_default();
        assert_eq!(json, "\"fold\"");
        let back: FrameName = serde_json::from_str(&json).unwrap_or_else(|_| FrameName::from(""));
        assert_eq!(back, "fold");
    }

    #[test]
    fn ordering() {
        assert!(FrameName::from("alpha") < FrameName::from("beta"));
    }
}
