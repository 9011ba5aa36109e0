use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::state::QueryState;
use super::{CategoryFetcher, Notice, Notifier};
use crate::models::{Acknowledgment, CategoryListResponse};
use crate::query::ListParams;

/// Quiet period after the last search keystroke before the list is fetched.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

struct View {
    state: QueryState,
    response: Option<CategoryListResponse>,
    loading: bool,
    /// Sequence number of the most recently issued round-trip.
    issued: u64,
}

struct Inner<F, N> {
    fetcher: F,
    notifier: N,
    view: Mutex<View>,
}

impl<F: CategoryFetcher, N: Notifier> Inner<F, N> {
    fn view(&self) -> MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshots the full query and numbers the round-trip. Called at
    /// dispatch time so that issue order matches user action order.
    fn begin(&self) -> (u64, ListParams) {
        let mut view = self.view();
        view.issued += 1;
        view.loading = true;
        (view.issued, view.state.to_params())
    }

    /// Applies the response only if no newer round-trip was issued meanwhile.
    async fn complete(self: Arc<Self>, sequence: u64, params: ListParams) {
        let result = self.fetcher.fetch(&params).await;

        let failure = {
            let mut view = self.view();
            if sequence != view.issued {
                log::debug!("discarding stale category response #{}", sequence);
                return;
            }
            view.loading = false;
            match result {
                Ok(response) => {
                    view.state.sync_pagination(&response.pagination);
                    view.response = Some(response);
                    None
                }
                Err(e) => Some(e),
            }
        };

        if let Some(e) = failure {
            log::warn!("category list request failed: {}", e);
            self.notifier
                .notify(Notice::error("Could not load categories. Please try again."));
        }
    }
}

/// Drives the category table: every state change becomes one full-query
/// round-trip, except search, which waits for [`SEARCH_DEBOUNCE`] of quiet.
///
/// Must be used from within a tokio runtime.
pub struct QueryController<F, N> {
    inner: Arc<Inner<F, N>>,
    pending_search: Option<JoinHandle<()>>,
    debounce: Duration,
}

impl<F: CategoryFetcher, N: Notifier> QueryController<F, N> {
    /// Seeds state from a server-rendered response. Mounting never triggers a
    /// round-trip of its own.
    pub fn mount(fetcher: F, notifier: N, initial: CategoryListResponse) -> Self {
        let mut state = QueryState::from_filters(&initial.filters);
        state.sync_pagination(&initial.pagination);
        QueryController {
            inner: Arc::new(Inner {
                fetcher,
                notifier,
                view: Mutex::new(View {
                    state,
                    response: Some(initial),
                    loading: false,
                    issued: 0,
                }),
            }),
            pending_search: None,
            debounce: SEARCH_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> QueryState {
        self.inner.view().state.clone()
    }

    pub fn response(&self) -> Option<CategoryListResponse> {
        self.inner.view().response.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.view().loading
    }

    pub fn search_pending(&self) -> bool {
        self.pending_search
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }

    /// Updates the search text now; fetches once typing has paused.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.inner.view().state.search = term.into();
        self.cancel_pending_search();

        let inner = self.inner.clone();
        let debounce = self.debounce;
        self.pending_search = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            inner.view().state.page = 1;
            let (sequence, params) = inner.begin();
            // detached so a later keystroke cannot cancel a request in flight
            tokio::spawn(inner.complete(sequence, params));
        }));
    }

    pub fn toggle_sort(&mut self, column: &str) -> JoinHandle<()> {
        self.inner.view().state.toggle_sort(column);
        self.dispatch()
    }

    pub fn set_page(&mut self, page: u32) -> JoinHandle<()> {
        self.inner.view().state.page = page.max(1);
        self.dispatch()
    }

    pub fn set_per_page(&mut self, per_page: u32) -> JoinHandle<()> {
        self.inner.view().state.set_per_page(per_page);
        self.dispatch()
    }

    pub fn set_is_active(&mut self, is_active: Option<bool>) -> JoinHandle<()> {
        self.inner.view().state.set_is_active(is_active);
        self.dispatch()
    }

    /// Re-fetches the current query, e.g. after a create or delete.
    pub fn refresh(&mut self) -> JoinHandle<()> {
        self.dispatch()
    }

    /// Surfaces the outcome of a create, update or delete and reloads the
    /// list so the change shows up in place.
    pub fn acknowledge(&mut self, ack: &Acknowledgment) -> JoinHandle<()> {
        let notice = if ack.success {
            Notice::success(ack.message.clone())
        } else {
            Notice::error(ack.message.clone())
        };
        self.inner.notifier.notify(notice);
        self.dispatch()
    }

    /// Immediate round-trip. Supersedes a pending search; the typed text is
    /// already in state and goes out with this request.
    fn dispatch(&mut self) -> JoinHandle<()> {
        self.cancel_pending_search();
        let (sequence, params) = self.inner.begin();
        tokio::spawn(self.inner.clone().complete(sequence, params))
    }

    fn cancel_pending_search(&mut self) {
        if let Some(task) = self.pending_search.take() {
            task.abort();
        }
    }
}

impl<F, N> Drop for QueryController<F, N> {
    fn drop(&mut self) {
        if let Some(task) = self.pending_search.take() {
            task.abort();
        }
    }
}
