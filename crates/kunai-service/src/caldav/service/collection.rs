//! Calendar collection backed by an object store and a secondary index.
//!
//! Every write goes to the object store first and is then reflected in the
//! index. Filtered listings ask the index for candidate hrefs and load only
//! those objects from the store.

use std::path::Path;

use kunai_core::config::Settings;
use kunai_db::db::map::extract_record;
use kunai_db::db::query::predicate::Predicate;
use kunai_db::db::schema::FieldSchema;
use kunai_db::db::store::{IndexStore, ReindexSource};
use kunai_db::error::DbError;
use kunai_db::model::IndexRecord;
use kunai_rfc::rfc::dav::core::CalendarFilter;
use kunai_rfc::rfc::ical::core::ICalendar;

use super::filter::search_request;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{ObjectStore, StoredObject};

/// Rebuild source reading every object of a collection's store.
struct StoreSource<'a, S>(&'a S);

impl<S: ObjectStore> ReindexSource for StoreSource<'_, S> {
    fn is_empty(&self) -> anyhow::Result<bool> {
        self.0.is_empty()
    }

    fn records(&self, schema: &FieldSchema) -> anyhow::Result<Vec<IndexRecord>> {
        let mut records = Vec::new();
        for object in self.0.list()? {
            match extract_record(&object.href, &object.ical, schema) {
                Ok(record) => records.push(record),
                Err(DbError::NoIndexableComponent(href)) => {
                    tracing::warn!(%href, "Object has no indexable component, leaving it out of the index");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(records)
    }
}

#[derive(Debug)]
pub struct IndexedCollection<S> {
    store: S,
    index: IndexStore,
}

impl<S: ObjectStore> IndexedCollection<S> {
    /// ## Summary
    /// Creates a collection over `store` whose index lives in `folder`.
    ///
    /// Nothing is opened until the first operation.
    ///
    /// ## Errors
    /// Returns an error if the configured index fields are not a valid schema.
    pub fn new(store: S, folder: impl AsRef<Path>, settings: &Settings) -> ServiceResult<Self> {
        let index = IndexStore::from_config(folder, &settings.index)?;
        Ok(Self::with_index(store, index))
    }

    #[must_use]
    pub const fn with_index(store: S, index: IndexStore) -> Self {
        Self { store, index }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn index(&self) -> &IndexStore {
        &self.index
    }

    fn ensure_open(&mut self) -> ServiceResult<()> {
        let source = StoreSource(&self.store);
        self.index.open(&source)?;
        Ok(())
    }

    /// ## Summary
    /// Stores `ical` under `href` and indexes the stored object.
    ///
    /// ## Errors
    /// Returns an error if the store rejects the object, the index cannot be
    /// opened or written, or the object has no indexable component. Only a
    /// store rejection leaves the store untouched; otherwise the object is
    /// stored but not indexed until it is written again or the index is
    /// rebuilt.
    #[tracing::instrument(skip(self, ical))]
    pub fn write(&mut self, href: &str, ical: ICalendar) -> ServiceResult<Option<StoredObject>> {
        let Some(object) = self
            .store
            .upload(href, ical)
            .map_err(ServiceError::StoreError)?
        else {
            tracing::debug!("Store did not materialize the object, nothing to index");
            return Ok(None);
        };

        self.ensure_open()?;
        let record = extract_record(&object.href, &object.ical, self.index.schema())?;
        self.index.upsert(&record)?;

        Ok(Some(object))
    }

    /// ## Summary
    /// Stores every object, then indexes all of them in one transaction.
    ///
    /// Not atomic across the store and the index: on failure the error is
    /// returned at once and nothing from this call is indexed, while objects
    /// stored before the failure stay in the store.
    ///
    /// ## Errors
    /// Returns the first store, extraction or index error.
    #[tracing::instrument(skip(self, objects), fields(count = objects.len()))]
    pub fn bulk_write(
        &mut self,
        objects: Vec<(String, ICalendar)>,
    ) -> ServiceResult<Vec<StoredObject>> {
        let mut stored = Vec::with_capacity(objects.len());
        let mut records = Vec::with_capacity(objects.len());

        for (href, ical) in objects {
            let Some(object) = self
                .store
                .upload(&href, ical)
                .map_err(ServiceError::StoreError)?
            else {
                continue;
            };
            records.push(extract_record(&object.href, &object.ical, self.index.schema())?);
            stored.push(object);
        }

        self.ensure_open()?;
        self.index.bulk_load(&records)?;

        Ok(stored)
    }

    /// ## Summary
    /// Removes `href`, or every object when `href` is `None`, from the index
    /// and then from the store.
    ///
    /// ## Errors
    /// Returns an error if either removal fails.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, href: Option<&str>) -> ServiceResult<()> {
        self.ensure_open()?;
        self.index.delete(href)?;
        self.store.remove(href).map_err(ServiceError::StoreError)
    }

    /// ## Summary
    /// Returns the objects that may satisfy `filter`.
    ///
    /// When nothing in the filter can be answered from the index every
    /// object is returned. Otherwise only objects whose index record matches
    /// are loaded; an indexed href the store no longer holds is skipped.
    ///
    /// ## Errors
    /// Returns an error if the index query or a store read fails.
    #[tracing::instrument(skip(self, filter))]
    pub fn filtered_list(&mut self, filter: &CalendarFilter) -> ServiceResult<Vec<StoredObject>> {
        let request = search_request(filter);
        if request.is_empty() {
            tracing::debug!("Filter has no indexable conditions, listing every object");
            return self.store.list().map_err(ServiceError::StoreError);
        }

        self.ensure_open()?;
        let hrefs = self.index.search(&Predicate::translate(&request))?;
        tracing::debug!(candidates = hrefs.len(), "Index search complete");

        let mut objects = Vec::with_capacity(hrefs.len());
        for href in hrefs {
            match self.store.get(&href).map_err(ServiceError::StoreError)? {
                Some(object) => objects.push(object),
                None => tracing::warn!(%href, "Indexed object is missing from the store"),
            }
        }

        Ok(objects)
    }

    /// ## Summary
    /// Returns every index record, ordered by href.
    ///
    /// ## Errors
    /// Returns an error if the index cannot be opened or read.
    pub fn list_index(&mut self) -> ServiceResult<Vec<IndexRecord>> {
        self.ensure_open()?;
        Ok(self.index.list_all()?)
    }

    /// ## Summary
    /// Discards the index and rebuilds it from the current store contents.
    /// A failed rebuild keeps the previous index.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read or the index cannot be
    /// written.
    #[tracing::instrument(skip(self))]
    pub fn reindex(&mut self) -> ServiceResult<()> {
        self.ensure_open()?;
        let source = StoreSource(&self.store);
        self.index.rebuild(&source)?;
        Ok(())
    }

    /// ## Summary
    /// Releases the index connection; the next operation reopens it.
    ///
    /// ## Errors
    /// Returns an error if SQLite fails to close the connection.
    pub fn close(&mut self) -> ServiceResult<()> {
        Ok(self.index.close()?)
    }
}
