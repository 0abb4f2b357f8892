//! KeyStore wrappers for exercising the service's store interactions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use permseal_core::PermissionKeyRecord;
use permseal_store::{KeyStore, Result, StoreError};

/// Counts calls to each store operation.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    finds: AtomicUsize,
    retirements: AtomicUsize,
    inserts: AtomicUsize,
}

impl<S: KeyStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            retirements: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Calls to `find_active_keys`.
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Calls to `mark_inactive`.
    pub fn retirements(&self) -> usize {
        self.retirements.load(Ordering::SeqCst)
    }

    /// Calls to `insert`.
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Total write calls.
    pub fn writes(&self) -> usize {
        self.retirements() + self.inserts()
    }
}

#[async_trait]
impl<S: KeyStore> KeyStore for CountingStore<S> {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_active_keys().await
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        self.retirements.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_inactive(permission).await
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record).await
    }
}

/// Fails selected operations with [`StoreError::Unavailable`] while armed.
#[derive(Debug, Default)]
pub struct FailingStore<S> {
    inner: S,
    fail_reads: AtomicBool,
    fail_retirements: AtomicBool,
    fail_inserts: AtomicBool,
}

impl<S: KeyStore> FailingStore<S> {
    /// Wrap `inner` with every operation passing through.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_retirements: AtomicBool::new(false),
            fail_inserts: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_retirements(&self, on: bool) {
        self.fail_retirements.store(on, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, on: bool) {
        self.fail_inserts.store(on, Ordering::SeqCst);
    }

    /// Arm or disarm every operation.
    pub fn fail_all(&self, on: bool) {
        self.fail_reads(on);
        self.fail_retirements(on);
        self.fail_inserts(on);
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: KeyStore> KeyStore for FailingStore<S> {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.find_active_keys().await
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        Self::check(&self.fail_retirements, "mark_inactive")?;
        self.inner.mark_inactive(permission).await
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        Self::check(&self.fail_inserts, "insert")?;
        self.inner.insert(record).await
    }
}

/// Yields to the scheduler before each write, so concurrent callers
/// interleave between `mark_inactive` and `insert`.
#[derive(Debug, Default)]
pub struct YieldingStore<S> {
    inner: S,
}

impl<S: KeyStore> YieldingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: KeyStore> KeyStore for YieldingStore<S> {
    async fn find_active_keys(&self) -> Result<Vec<PermissionKeyRecord>> {
        self.inner.find_active_keys().await
    }

    async fn mark_inactive(&self, permission: &str) -> Result<()> {
        tokio::task::yield_now().await;
        self.inner.mark_inactive(permission).await
    }

    async fn insert(&self, record: &PermissionKeyRecord) -> Result<()> {
        tokio::task::yield_now().await;
        self.inner.insert(record).await
    }
}
