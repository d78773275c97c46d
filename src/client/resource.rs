use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

/// Snapshot of a fetch in progress or finished. Exactly mirrors what a
/// consumer needs to render: the data, a busy flag, and a display error.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Extra request configuration. Compared structurally when deciding whether
/// an identical request is already underway.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
}

/// Single-value remote resource with last-write-wins semantics: if a newer
/// request starts before an older one lands, the older result is discarded
/// no matter which response arrives first.
pub struct Resource<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    http: Client,
    state: Mutex<FetchState<T>>,
    generation: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
    last_request: Mutex<Option<(String, String)>>,
}

impl<T> Default for Resource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                state: Mutex::new(FetchState {
                    data: None,
                    loading: true,
                    error: None,
                }),
                generation: AtomicU64::new(0),
                task: Mutex::new(None),
                last_request: Mutex::new(None),
            }),
        }
    }

    /// Points the resource at `url`, starting a background fetch. Passing
    /// `None` clears everything and cancels any fetch in flight. Repeating
    /// the previous url with structurally equal options is a no-op.
    pub fn request(&self, url: Option<&str>, options: &FetchOptions) {
        let Some(url) = url else {
            {
                let mut state = lock(&self.inner.state);
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
                *state = FetchState {
                    data: None,
                    loading: false,
                    error: None,
                };
            }
            self.abort_in_flight();
            *lock(&self.inner.last_request) = None;
            return;
        };

        let key = (url.to_string(), serialize_options(options));
        if lock(&self.inner.last_request).as_ref() == Some(&key) {
            return;
        }
        *lock(&self.inner.last_request) = Some(key.clone());

        // The generation only ever moves while the state lock is held, and
        // commit re-checks it under that same lock. A superseded task that
        // already passed its own fetch therefore still cannot write: by the
        // time it gets the lock, the bump below is visible.
        let generation = {
            let mut state = lock(&self.inner.state);
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.error = None;
            generation
        };
        self.abort_in_flight();

        let inner = Arc::clone(&self.inner);
        let headers = options.headers.clone();
        let handle = tokio::spawn(async move {
            let outcome = fetch_json::<T>(&inner.http, &key.0, &headers).await;
            commit(&inner, generation, outcome);
        });
        *lock(&self.inner.task) = Some(handle);
    }

    pub fn snapshot(&self) -> FetchState<T>
    where
        T: Clone,
    {
        lock(&self.inner.state).clone()
    }

    /// Waits for the most recently started fetch to settle. Test hook; the
    /// serving paths never need it.
    pub async fn idle(&self) {
        let task = lock(&self.inner.task).take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn abort_in_flight(&self) {
        if let Some(task) = lock(&self.inner.task).take() {
            task.abort();
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    headers: &[(String, String)],
) -> Result<T, String> {
    let mut request = http.get(url);
    for (name, value) in headers {
        request = request.header(name, value);
    }
    let response = request
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP error! status: {}", status.as_u16()));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| format!("invalid response body: {e}"))
}

// Rejects results from superseded requests; only the fetch that matches the
// current generation may write. The check runs under the state lock so a
// request that starts between fetch completion and the write here still
// invalidates this outcome.
fn commit<T>(inner: &Inner<T>, generation: u64, outcome: Result<T, String>) {
    let mut state = lock(&inner.state);
    if inner.generation.load(Ordering::SeqCst) != generation {
        return;
    }
    *state = match outcome {
        Ok(data) => FetchState {
            data: Some(data),
            loading: false,
            error: None,
        },
        Err(error) => FetchState {
            data: None,
            loading: false,
            error: Some(error),
        },
    };
}

fn serialize_options(options: &FetchOptions) -> String {
    serde_json::to_string(options).unwrap_or_default()
}

fn lock<G>(mutex: &Mutex<G>) -> std::sync::MutexGuard<'_, G> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn new_resource_starts_loading() {
        let resource: Resource<Value> = Resource::new();
        let state = resource.snapshot();
        assert_eq!(state.data, None);
        assert!(state.loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn stale_generation_cannot_commit() {
        let resource: Resource<Value> = Resource::new();
        resource.inner.generation.store(2, Ordering::SeqCst);

        commit(&resource.inner, 1, Ok(json!({"from": "stale"})));
        assert_eq!(resource.snapshot().data, None);

        commit(&resource.inner, 2, Ok(json!({"from": "current"})));
        assert_eq!(resource.snapshot().data, Some(json!({"from": "current"})));
    }

    #[test]
    fn commit_blocked_on_the_lock_rechecks_the_generation() {
        // A fetch finishes while its generation is still current, but a newer
        // request takes over before the finished fetch can write. The late
        // commit must see the bump once it finally holds the lock.
        let resource: Resource<Value> = Resource::new();
        resource.inner.generation.store(1, Ordering::SeqCst);

        let mut guard = lock(&resource.inner.state);
        let inner = Arc::clone(&resource.inner);
        let late = std::thread::spawn(move || {
            commit(&inner, 1, Ok(json!({"from": "superseded"})));
        });

        // While the commit is parked on the lock, the newer request starts.
        std::thread::sleep(std::time::Duration::from_millis(50));
        resource.inner.generation.store(2, Ordering::SeqCst);
        guard.loading = true;
        drop(guard);
        late.join().expect("late commit thread");

        let state = resource.snapshot();
        assert_eq!(state.data, None, "superseded fetch must not settle");
        assert!(state.loading, "the newer request is still in flight");
        assert_eq!(state.error, None);
    }

    #[test]
    fn stale_error_is_also_discarded() {
        let resource: Resource<Value> = Resource::new();
        resource.inner.generation.store(5, Ordering::SeqCst);

        commit(&resource.inner, 5, Ok(json!(1)));
        commit(&resource.inner, 4, Err("late failure".into()));

        let state = resource.snapshot();
        assert_eq!(state.data, Some(json!(1)));
        assert_eq!(state.error, None);
    }

    #[test]
    fn failed_fetch_clears_data() {
        let resource: Resource<Value> = Resource::new();
        resource.inner.generation.store(1, Ordering::SeqCst);
        commit(&resource.inner, 1, Ok(json!(1)));
        resource.inner.generation.store(2, Ordering::SeqCst);
        commit(&resource.inner, 2, Err("HTTP error! status: 500".into()));

        let state = resource.snapshot();
        assert_eq!(state.data, None);
        assert_eq!(state.error.as_deref(), Some("HTTP error! status: 500"));
        assert!(!state.loading);
    }

    #[test]
    fn equal_options_serialize_identically() {
        let a = FetchOptions {
            headers: vec![("x-trace".into(), "1".into())],
        };
        let b = FetchOptions {
            headers: vec![("x-trace".into(), "1".into())],
        };
        assert_eq!(serialize_options(&a), serialize_options(&b));
        let c = FetchOptions {
            headers: vec![("x-trace".into(), "2".into())],
        };
        assert_ne!(serialize_options(&a), serialize_options(&c));
    }
}
