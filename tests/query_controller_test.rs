use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use catalog_admin::client::{CategoryFetcher, FetchError, Notice, NoticeKind, Notifier, QueryController};
use catalog_admin::models::{Acknowledgment, CategoryListResponse, CategoryPage};
use catalog_admin::pagination::Pagination;
use catalog_admin::query::{ListParams, SortDirection};

fn response_for(params: &ListParams) -> CategoryListResponse {
    let pagination = Pagination::new(params.page.unwrap_or(1), params.per_page.unwrap_or(10), 100);
    CategoryListResponse {
        categories: CategoryPage::new(Vec::new(), pagination, 0),
        pagination,
        parent_categories: Vec::new(),
        filters: params.clone(),
    }
}

#[derive(Clone, Default)]
struct RecordingFetcher {
    calls: Arc<Mutex<Vec<ListParams>>>,
    /// Artificial latency per requested page.
    delays: Arc<Mutex<Vec<(u32, Duration)>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingFetcher {
    fn calls(&self) -> Vec<ListParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CategoryFetcher for RecordingFetcher {
    async fn fetch(&self, params: &ListParams) -> Result<CategoryListResponse, FetchError> {
        self.calls.lock().unwrap().push(params.clone());
        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(page, _)| Some(*page) == params.page)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(FetchError::Other("connection reset".into()));
        }
        Ok(response_for(params))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn mount(
    filters: ListParams,
) -> (
    QueryController<RecordingFetcher, RecordingNotifier>,
    RecordingFetcher,
    RecordingNotifier,
) {
    let fetcher = RecordingFetcher::default();
    let notifier = RecordingNotifier::default();
    let controller = QueryController::mount(fetcher.clone(), notifier.clone(), response_for(&filters));
    (controller, fetcher, notifier)
}

async fn settle() {
    tokio::time::sleep(Duration::from_secs(2)).await;
}

#[tokio::test(start_paused = true)]
async fn test_mount_does_not_fetch() {
    let (controller, fetcher, _) = mount(ListParams {
        search: Some("men".into()),
        page: Some(2),
        ..ListParams::default()
    });
    settle().await;
    assert!(fetcher.calls().is_empty());
    assert_eq!(controller.state().search, "men");
    assert_eq!(controller.state().page, 2);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_search_changes_fetch_once_with_final_value() {
    let (mut controller, fetcher, _) = mount(ListParams::default());

    controller.set_search("s");
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.set_search("sh");
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.set_search("sho");
    assert_eq!(controller.state().search, "sho");
    assert!(controller.search_pending());

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(fetcher.calls().is_empty());

    settle().await;
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search.as_deref(), Some("sho"));
    assert_eq!(calls[0].page, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_search_resets_page_and_keeps_other_filters() {
    let (mut controller, fetcher, _) = mount(ListParams {
        sort: Some("name".into()),
        direction: Some("desc".into()),
        is_active: Some("1".into()),
        page: Some(3),
        per_page: Some(20),
        ..ListParams::default()
    });

    controller.set_search("bag");
    settle().await;

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        ListParams {
            search: Some("bag".into()),
            is_active: Some("1".into()),
            sort: Some("name".into()),
            direction: Some("desc".into()),
            page: Some(1),
            per_page: Some(20),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_sort_toggle_flips_direction_and_fetches_immediately() {
    let (mut controller, fetcher, _) = mount(ListParams {
        sort: Some("name".into()),
        direction: Some("asc".into()),
        page: Some(2),
        ..ListParams::default()
    });

    controller.toggle_sort("name").await.unwrap();
    assert_eq!(controller.state().direction, SortDirection::Desc);
    controller.toggle_sort("name").await.unwrap();
    assert_eq!(controller.state().direction, SortDirection::Asc);
    controller.toggle_sort("parent_name").await.unwrap();

    let calls = fetcher.calls();
    let sent: Vec<(Option<&str>, Option<&str>, Option<u32>)> = calls
        .iter()
        .map(|p| (p.sort.as_deref(), p.direction.as_deref(), p.page))
        .collect();
    assert_eq!(
        sent,
        vec![
            (Some("name"), Some("desc"), Some(1)),
            (Some("name"), Some("asc"), Some(1)),
            (Some("parent_name"), Some("asc"), Some(1)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_page_changes_preserve_query() {
    let (mut controller, fetcher, _) = mount(ListParams {
        search: Some("shoe".into()),
        sort: Some("name".into()),
        ..ListParams::default()
    });

    controller.set_page(4).await.unwrap();
    controller.set_per_page(50).await.unwrap();

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].page, Some(4));
    assert_eq!(calls[0].search.as_deref(), Some("shoe"));
    assert_eq!(calls[0].sort.as_deref(), Some("name"));
    assert_eq!((calls[1].page, calls[1].per_page), (Some(1), Some(50)));
    assert_eq!(calls[1].search.as_deref(), Some("shoe"));
    assert_eq!(controller.response().unwrap().pagination.per_page, 50);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_action_supersedes_pending_search() {
    let (mut controller, fetcher, _) = mount(ListParams::default());

    controller.set_search("dress");
    controller.set_page(2).await.unwrap();
    settle().await;

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search.as_deref(), Some("dress"));
    assert_eq!(calls[0].page, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_does_not_overwrite_newer_one() {
    let (mut controller, fetcher, _) = mount(ListParams::default());
    fetcher
        .delays
        .lock()
        .unwrap()
        .extend([(2, Duration::from_millis(500)), (3, Duration::from_millis(10))]);

    let slow = controller.set_page(2);
    let fast = controller.set_page(3);
    fast.await.unwrap();
    assert_eq!(controller.response().unwrap().pagination.current_page, 3);

    slow.await.unwrap();
    assert_eq!(controller.response().unwrap().pagination.current_page, 3);
    assert_eq!(controller.state().page, 3);
    assert!(!controller.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_notifies_and_keeps_state() {
    let (mut controller, fetcher, notifier) = mount(ListParams::default());
    let before = controller.response();
    *fetcher.failing.lock().unwrap() = true;

    controller.set_is_active(Some(false)).await.unwrap();

    assert!(!controller.is_loading());
    assert_eq!(controller.state().is_active, Some(false));
    assert_eq!(controller.response(), before);
    let notices = notifier.notices.lock().unwrap().clone();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
}

#[tokio::test(start_paused = true)]
async fn test_write_acknowledgment_notifies_and_reloads() {
    let (mut controller, fetcher, notifier) = mount(ListParams {
        search: Some("men".into()),
        page: Some(2),
        ..ListParams::default()
    });

    controller
        .acknowledge(&Acknowledgment::success("Category created successfully."))
        .await
        .unwrap();

    let notices = notifier.notices.lock().unwrap().clone();
    assert_eq!(notices, vec![Notice::success("Category created successfully.")]);
    assert_eq!(notices[0].kind, NoticeKind::Success);

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search.as_deref(), Some("men"));
    assert_eq!(calls[0].page, Some(2));
}
