//! In-memory browser driver for tests

use crate::driver::{BrowserDriver, PageId, PageInfo};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wayfarer_core::resilience::default_strategies;
use wayfarer_core::{Error, Result, RetryExecutor, StrategyRegistry};

/// Scriptable driver that counts every call
#[derive(Default)]
pub(crate) struct FakeDriver {
    pages: Mutex<Vec<PageInfo>>,
    next_id: AtomicU32,
    calls: Mutex<HashMap<&'static str, u32>>,
    failures: Mutex<HashMap<&'static str, VecDeque<Error>>>,
    unhealthy: AtomicBool,
}

impl FakeDriver {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next call to `method` fail with `error`
    pub(crate) async fn fail_next(&self, method: &'static str, error: Error) {
        self.failures
            .lock()
            .await
            .entry(method)
            .or_default()
            .push_back(error);
    }

    /// Make the next `times` calls to `method` fail with recoverable errors
    pub(crate) async fn fail_times(&self, method: &'static str, times: u32) {
        for i in 0..times {
            self.fail_next(method, Error::recoverable(format!("{method} flaked ({i})")))
                .await;
        }
    }

    pub(crate) fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    pub(crate) async fn calls(&self, method: &str) -> u32 {
        self.calls.lock().await.get(method).copied().unwrap_or(0)
    }

    pub(crate) async fn pages(&self) -> Vec<PageInfo> {
        self.pages.lock().await.clone()
    }

    pub(crate) async fn open(&self, url: &str) -> PageId {
        let id = PageId::new(format!(
            "page-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        ));
        self.pages.lock().await.push(PageInfo {
            id: id.clone(),
            url: url.to_string(),
            title: String::new(),
        });
        id
    }

    async fn enter(&self, method: &'static str) -> Result<()> {
        *self.calls.lock().await.entry(method).or_default() += 1;
        match self
            .failures
            .lock()
            .await
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn require_page(&self, page: &PageId) -> Result<()> {
        if self.pages.lock().await.iter().any(|p| &p.id == page) {
            Ok(())
        } else {
            Err(Error::unrecoverable(format!("no such page: {page}")))
        }
    }
}

#[async_trait::async_trait]
impl BrowserDriver for FakeDriver {
    async fn create_page(&self, url: &str) -> Result<PageId> {
        self.enter("create_page").await?;
        Ok(self.open(url).await)
    }

    async fn navigate(&self, page: &PageId, url: &str) -> Result<()> {
        self.enter("navigate").await?;
        let mut pages = self.pages.lock().await;
        match pages.iter_mut().find(|p| &p.id == page) {
            Some(info) => {
                info.url = url.to_string();
                Ok(())
            }
            None => Err(Error::unrecoverable(format!("no such page: {page}"))),
        }
    }

    async fn execute_script(&self, page: &PageId, script: &str) -> Result<serde_json::Value> {
        self.enter("execute_script").await?;
        self.require_page(page).await?;
        Ok(serde_json::json!({ "script": script }))
    }

    async fn screenshot(&self, page: &PageId) -> Result<Vec<u8>> {
        self.enter("screenshot").await?;
        self.require_page(page).await?;
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn click(&self, page: &PageId, _selector: &str) -> Result<()> {
        self.enter("click").await?;
        self.require_page(page).await
    }

    async fn get_text(&self, page: &PageId, selector: &str) -> Result<String> {
        self.enter("get_text").await?;
        self.require_page(page).await?;
        Ok(format!("text of {selector}"))
    }

    async fn wait_for_element(
        &self,
        page: &PageId,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.enter("wait_for_element").await?;
        self.require_page(page).await
    }

    async fn list_pages(&self) -> Result<Vec<PageInfo>> {
        self.enter("list_pages").await?;
        Ok(self.pages().await)
    }

    async fn health_check(&self) -> Result<()> {
        self.enter("health_check").await?;
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(Error::recoverable("browser not responding"));
        }
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        self.enter("restart").await?;
        self.pages.lock().await.clear();
        self.set_unhealthy(false);
        Ok(())
    }
}

/// Default strategies with millisecond delays
pub(crate) fn fast_executor() -> RetryExecutor {
    let builder = default_strategies()
        .into_iter()
        .map(|s| {
            s.with_base_delay(Duration::from_millis(1))
                .with_max_delay(Duration::from_millis(2))
                .with_jitter(0.0)
        })
        .try_fold(StrategyRegistry::builder(), |b, s| b.register(s));

    match builder {
        Ok(builder) => RetryExecutor::new(Arc::new(builder.build())),
        Err(e) => unreachable!("default strategies must register: {e}"),
    }
}
