//! Read-path facade over [`ScanStore`], grouping the listing/detail queries
//! consumers (an HTTP layer, a CLI, a test harness) need without exposing
//! the full `*Ops` surface (spec.md §4.8).

use crate::error::ScanResult;
use crate::store::models::{Job, Page};
use crate::store::{JobFilter, PageFilter, Pagination, ScanStore};

pub struct ScanQuery<'a> {
    store: &'a ScanStore,
}

impl<'a> ScanQuery<'a> {
    #[must_use]
    pub fn new(store: &'a ScanStore) -> Self {
        Self { store }
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> ScanResult<(Vec<Job>, Pagination)> {
        self.store.jobs().list(filter).await
    }

    pub async fn get_job(&self, job_id: &str) -> ScanResult<Option<Job>> {
        self.store.jobs().get(job_id).await
    }

    pub async fn list_pages_for_job(&self, job_id: &str, filter: &PageFilter) -> ScanResult<(Vec<Page>, Pagination)> {
        self.store.pages().list_for_job(job_id, filter).await
    }

    pub async fn get_page_for_job(&self, job_id: &str, page_id: &str) -> ScanResult<Option<Page>> {
        self.store.pages().get_for_job(job_id, page_id).await
    }
}
