use std::collections::BTreeSet;
use std::fmt;

/// Cached version token of an entity, sent as an `If-Match` precondition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EntityTag {
    /// Nothing cached yet; the server decides.
    #[default]
    Unknown,
    /// Deliberately discarded so the next write overwrites remote state.
    Unconditional,
    Known(String),
}

impl EntityTag {
    /// Header value to send, if any. Both non-`Known` states omit it.
    pub fn if_match(&self) -> Option<&str> {
        match self {
            EntityTag::Known(tag) => Some(tag),
            EntityTag::Unknown | EntityTag::Unconditional => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EntityTag::Unknown)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityTag::Unknown => f.write_str("<unknown>"),
            EntityTag::Unconditional => f.write_str("<unconditional>"),
            EntityTag::Known(tag) => f.write_str(tag),
        }
    }
}

/// State shared by every entity: the borrowed transport, the names of
/// locally modified attributes, and the cached tag.
pub struct ApiObject<'a, A: ?Sized> {
    api: &'a A,
    pending: BTreeSet<&'static str>,
    loaded: bool,
    etag: EntityTag,
}

impl<'a, A: ?Sized> ApiObject<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            pending: BTreeSet::new(),
            loaded: false,
            etag: EntityTag::Unknown,
        }
    }

    pub fn api(&self) -> &'a A {
        self.api
    }

    pub fn pending(&self) -> &BTreeSet<&'static str> {
        &self.pending
    }

    pub fn mark_pending(&mut self, name: &'static str) {
        self.pending.insert(name);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fresh remote data replaced the local record.
    pub(crate) fn refreshed(&mut self) {
        self.pending.clear();
        self.loaded = true;
    }

    pub fn etag(&self) -> &EntityTag {
        &self.etag
    }

    pub(crate) fn set_etag(&mut self, etag: EntityTag) {
        self.etag = etag;
    }

    /// Precondition for a write: the cached tag when matching, otherwise
    /// `fallback`.
    pub(crate) fn precondition(&self, matching: bool, fallback: EntityTag) -> EntityTag {
        if matching { self.etag.clone() } else { fallback }
    }
}

impl<A: ?Sized> fmt::Debug for ApiObject<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiObject")
            .field("pending", &self.pending)
            .field("loaded", &self.loaded)
            .field("etag", &self.etag)
            .finish()
    }
}
