//! The catalog request client.
//!
//! [`CatalogClient`] owns its configuration, HTTP connection pool, rate
//! limiter, and in-flight table. Clones share all of them, so one client
//! built at startup can be handed to every caller that needs catalog data.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use flixdeck_core::config::Config;
use flixdeck_core::{Error, Result};

use crate::inflight::{InflightTable, Lookup, SharedResponse};
use crate::signal::AbortSignal;
use crate::url::{redact, ParamValue, Params, RequestDescriptor};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-call options for [`CatalogClient::fetch_resource`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters; absent values are dropped.
    pub params: Params,
    /// Overrides the configured default timeout.
    pub timeout: Option<Duration>,
    /// Caller-owned cancellation signal.
    pub signal: Option<AbortSignal>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(name, Some(value.into()));
        self
    }

    pub fn param_opt<V: Into<ParamValue>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.params.set(name, value.map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// De-duplicating, timeout-bounded client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    default_timeout: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
    inflight: InflightTable,
}

impl CatalogClient {
    /// Build a client from `config`. The API key is taken as-is; call
    /// [`Config::with_env`] first to pick it up from the environment.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flixdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::transport)?;

        let limiter = config
            .fetch
            .rate_limit_per_second
            .and_then(NonZeroU32::new)
            .map(|per_second| RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.catalog.base_url.clone(),
                api_key: config.catalog.api_key.clone(),
                default_timeout: config.fetch.timeout(),
                limiter,
                inflight: InflightTable::new(config.fetch.cache_ttl()),
            }),
        })
    }

    /// Fetch `path_or_url` and decode the JSON body as `T`.
    ///
    /// Calls that resolve to the same URL share one network operation. A
    /// call that joins an existing operation inherits that operation's
    /// timeout. Its own signal only stops it waiting; the shared operation
    /// keeps running for the other callers.
    pub async fn fetch_resource<T: DeserializeOwned>(
        &self,
        path_or_url: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let body = self.fetch_value(path_or_url, options).await?;
        T::deserialize(body.as_ref()).map_err(Error::decode)
    }

    /// Like [`fetch_resource`](Self::fetch_resource) but returns the shared
    /// decoded body. Every caller of the same operation gets the same `Arc`.
    pub async fn fetch_value(&self, path_or_url: &str, options: RequestOptions) -> Result<Arc<Value>> {
        let RequestOptions {
            params,
            timeout,
            signal,
        } = options;

        let url = RequestDescriptor::new(path_or_url, params)
            .resolve(&self.inner.base_url, self.inner.api_key.as_deref())?;
        let timeout = timeout.unwrap_or(self.inner.default_timeout);

        let waiter = signal.clone();
        let lookup = self
            .inner
            .inflight
            .join_or_start(&url, |generation| self.start(url.clone(), generation, timeout, signal));

        match (lookup, waiter) {
            (Lookup::Started(handle), _) => handle.await,
            (Lookup::Joined(handle), None) => {
                debug!(url = %redact(&url), "Joining in-flight catalog request");
                handle.await
            }
            (Lookup::Joined(handle), Some(waiter)) => {
                debug!(url = %redact(&url), "Joining in-flight catalog request");
                tokio::select! {
                    biased;
                    reason = waiter.aborted() => Err(Error::Aborted { reason }),
                    result = handle => result,
                }
            }
        }
    }

    /// Number of URLs currently held in the in-flight table.
    pub fn cached_requests(&self) -> usize {
        self.inner.inflight.len()
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.inner.inflight.contains(url)
    }

    /// Forget all cached responses.
    pub fn clear_cache(&self) {
        self.inner.inflight.clear();
    }

    // Spawn the operation so it makes progress no matter which caller polls
    // it, and purge the entry on failure before any waiter sees the error.
    fn start(
        &self,
        url: String,
        generation: u64,
        timeout: Duration,
        caller: Option<AbortSignal>,
    ) -> SharedResponse {
        let inner = Arc::clone(&self.inner);
        let task_url = url.clone();
        let task = tokio::spawn(async move {
            let result = inner.execute(&task_url, timeout, caller).await;
            if let Err(ref e) = result {
                warn!(url = %redact(&task_url), error = %e, "Catalog request failed");
                inner.inflight.remove_failed(&task_url, generation);
            }
            result
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    inner.inflight.remove_failed(&url, generation);
                    Err(Error::Internal(format!("catalog request task failed: {e}")))
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    async fn execute(
        &self,
        url: &str,
        timeout: Duration,
        caller: Option<AbortSignal>,
    ) -> Result<Arc<Value>> {
        bounded(url, timeout, caller, self.send(url)).await
    }

    async fn send(&self, url: &str) -> Result<Arc<Value>> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        debug!(url = %redact(url), "Catalog request");
        let resp = self.http.get(url).send().await.map_err(Error::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(Error::transport)?;
        let body: Value = serde_json::from_slice(&bytes).map_err(Error::parse)?;
        Ok(Arc::new(body))
    }
}

/// Race `request` against `timeout` and the caller's signal. The timer and
/// any composition relay are released when this returns, however it settles.
async fn bounded<F>(
    url: &str,
    timeout: Duration,
    caller: Option<AbortSignal>,
    request: F,
) -> Result<Arc<Value>>
where
    F: Future<Output = Result<Arc<Value>>>,
{
    let (timer, _timer_guard) = AbortSignal::timeout(timeout);
    let composed = caller.map(|caller| AbortSignal::any(&[caller, timer.clone()]));
    let signal = composed.as_ref().map_or(&timer, |c| c.signal());

    tokio::select! {
        biased;
        reason = signal.aborted() => {
            debug!(url = %redact(url), %reason, "Catalog request aborted");
            Err(Error::Aborted { reason })
        }
        result = request => result,
    }
}
