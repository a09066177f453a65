//! The object store an index summarizes.
//!
//! The store is the source of truth: it holds every calendar object under
//! its href and the index can always be rebuilt from it.

use std::collections::BTreeMap;

use kunai_rfc::rfc::ical::core::ICalendar;

/// A calendar object as held by an [`ObjectStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub href: String,
    pub ical: ICalendar,
}

impl StoredObject {
    #[must_use]
    pub fn new(href: impl Into<String>, ical: ICalendar) -> Self {
        Self {
            href: href.into(),
            ical,
        }
    }
}

/// Durable storage of calendar objects keyed by href.
pub trait ObjectStore {
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn list(&self) -> anyhow::Result<Vec<StoredObject>>;

    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn get(&self, href: &str) -> anyhow::Result<Option<StoredObject>>;

    /// ## Summary
    /// Stores `ical` under `href`, replacing any previous object.
    ///
    /// Returns the stored object, or `None` if the store accepted the write
    /// without materializing an object.
    ///
    /// ## Errors
    /// Returns an error if the object cannot be stored.
    fn upload(&mut self, href: &str, ical: ICalendar) -> anyhow::Result<Option<StoredObject>>;

    /// ## Summary
    /// Removes the object at `href`, or every object when `href` is `None`.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be written.
    fn remove(&mut self, href: Option<&str>) -> anyhow::Result<()>;

    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.list()?.is_empty())
    }
}

/// In-memory [`ObjectStore`], ordered by href.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: BTreeMap<String, ICalendar>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an object without going through an index, as another
    /// writer sharing the store would.
    pub fn insert_unindexed(&mut self, href: impl Into<String>, ical: ICalendar) {
        self.objects.insert(href.into(), ical);
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list(&self) -> anyhow::Result<Vec<StoredObject>> {
        Ok(self
            .objects
            .iter()
            .map(|(href, ical)| StoredObject::new(href.clone(), ical.clone()))
            .collect())
    }

    fn get(&self, href: &str) -> anyhow::Result<Option<StoredObject>> {
        Ok(self
            .objects
            .get(href)
            .map(|ical| StoredObject::new(href, ical.clone())))
    }

    fn upload(&mut self, href: &str, ical: ICalendar) -> anyhow::Result<Option<StoredObject>> {
        if href.is_empty() || href.contains('/') {
            anyhow::bail!("invalid object href {href:?}");
        }
        self.objects.insert(href.to_owned(), ical.clone());
        Ok(Some(StoredObject::new(href, ical)))
    }

    fn remove(&mut self, href: Option<&str>) -> anyhow::Result<()> {
        match href {
            Some(href) => {
                self.objects.remove(href);
            }
            None => self.objects.clear(),
        }
        Ok(())
    }

    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.objects.is_empty())
    }
}
