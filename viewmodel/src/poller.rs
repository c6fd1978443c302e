use std::{
  cell::RefCell,
  rc::{Rc, Weak},
  time::Duration
};
use futures::{
  future::{AbortHandle, Abortable, LocalBoxFuture},
  select,
  stream::FuturesUnordered,
  FutureExt, StreamExt
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
  clock::Clock,
  config::PollConfig,
  error::AppError,
  filter::FilterValue,
  modal::{ModalFormState, ModalMode},
  record::TableRecord,
  service::{DataService, ExportFormat, RecordMutations},
  sort::SortSpec,
  store::TableStore,
  view::TableSnapshot
};

/// Polling loop handed to the host executor by [`PollingTable::initialize`].
pub type PollTask = Abortable<LocalBoxFuture<'static, ()>>;

/// Handle on the running poll loop. Cancelling it stops future ticks and drops every
/// fetch the loop still has in flight.
#[derive(Debug)]
pub struct RefreshTimer {
  handle: AbortHandle
}

impl RefreshTimer {
  pub fn cancel(&self) {
    self.handle.abort();
  }
}

struct Inner<T, S> {
  store: RefCell<TableStore<T>>,
  service: S,
  config: PollConfig,
  timer: RefCell<Option<RefreshTimer>>,
  changes: watch::Sender<u64>
}

/// View-model behind one polling table block.
///
/// Cheap to clone; all clones share one store. Lives on a single-threaded executor:
/// the only suspension point is the service fetch and no `RefCell` borrow is held
/// across it.
pub struct PollingTable<T, S> {
  inner: Rc<Inner<T, S>>
}

impl<T, S> Clone for PollingTable<T, S> {
  fn clone(&self) -> Self {
    PollingTable { inner: Rc::clone(&self.inner) }
  }
}

impl<T, S> PartialEq for PollingTable<T, S> {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }
}

impl<T, S> PollingTable<T, S>
where
  T: TableRecord,
  S: DataService<T> + 'static
{
  pub fn new(service: S, config: PollConfig) -> Self {
    let (changes, _) = watch::channel(0);
    PollingTable {
      inner: Rc::new(Inner {
        store: RefCell::new(TableStore::new()),
        service,
        config,
        timer: RefCell::new(None),
        changes
      })
    }
  }

  /// Mounts the table and returns its poll loop for the caller to spawn.
  ///
  /// The loop fetches immediately and then once per interval. Ticks do not wait for
  /// earlier fetches, so slow responses may overlap. Returns `None` if the table was
  /// already initialized or torn down.
  pub fn initialize<C: Clock>(&self, clock: C) -> Option<PollTask> {
    if !self.inner.store.borrow_mut().mount() {
      debug!(table = %self.inner.config.label, "initialize ignored, table already mounted");
      return None;
    }
    info!(table = %self.inner.config.label, interval_ms = self.inner.config.interval.as_millis() as u64, "starting refresh timer");
    self.notify();

    let (handle, registration) = AbortHandle::new_pair();
    *self.inner.timer.borrow_mut() = Some(RefreshTimer { handle });

    let task: LocalBoxFuture<'static, ()> = Box::pin(poll_loop(Rc::downgrade(&self.inner), clock, self.inner.config.interval));
    Some(Abortable::new(task, registration))
  }

  /// One fetch. On success the dataset is replaced, on failure the error list is set
  /// and the dataset kept. No-op after teardown; a response arriving after teardown
  /// is dropped.
  pub async fn refresh(&self) {
    let ticket = self.inner.store.borrow_mut().begin_refresh();
    let Some(ticket) = ticket else {
      debug!(table = %self.inner.config.label, "refresh skipped after teardown");
      return;
    };

    let outcome = self.inner.service.fetch_list().await;
    let applied = self.inner.store.borrow_mut().complete_refresh(ticket, outcome);
    if applied {
      self.notify();
    }
  }

  /// Cancels the refresh timer. Must be called once, on unmount.
  pub fn teardown(&self) {
    if !self.inner.store.borrow_mut().teardown() {
      warn!(table = %self.inner.config.label, "teardown called more than once");
      return;
    }
    if let Some(timer) = self.inner.timer.borrow_mut().take() {
      timer.cancel();
    }
    info!(table = %self.inner.config.label, "refresh timer cancelled");
  }

  pub fn set_filter(&self, field: &str, value: Option<FilterValue>) {
    self.update(|store| store.set_filter(field, value));
  }

  pub fn reset_filters(&self) {
    self.update(|store| store.reset_filters());
  }

  pub fn set_sort(&self, sort: Option<SortSpec>) {
    self.update(|store| store.set_sort(sort));
  }

  pub fn toggle_sort(&self, column: &str) {
    self.update(|store| store.toggle_sort(column));
  }

  pub fn open_modal(&self, mode: ModalMode, record: Option<T>) -> Result<(), AppError> {
    self.update(|store| store.open_modal(mode, record))
  }

  /// Opens a record-bearing modal on the dataset row with the given key.
  pub fn open_modal_for(&self, mode: ModalMode, key: &str) -> Result<(), AppError> {
    let record = self.inner.store.borrow().find(key).cloned();
    match record {
      Some(r) => self.open_modal(mode, Some(r)),
      None => Err(AppError::NotFound(format!("no row with key {}", key)))
    }
  }

  pub fn close_modal(&self) {
    self.update(|store| store.close_modal());
  }

  pub fn edit_from_view(&self) {
    self.update(|store| store.edit_from_view());
  }

  /// Downloads the backend export for the criteria and sort currently applied.
  pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    let (criteria, sort) = {
      let store = self.inner.store.borrow();
      (store.criteria().clone(), store.sort().cloned())
    };
    debug!(table = %self.inner.config.label, filters = criteria.len(), ?sort, ?format, "requesting export");
    self.inner.service.download(&criteria, sort.as_ref(), format).await
  }

  pub fn snapshot(&self) -> TableSnapshot<T> {
    self.inner.store.borrow().snapshot()
  }

  pub fn with_store<R>(&self, f: impl FnOnce(&TableStore<T>) -> R) -> R {
    f(&*self.inner.store.borrow())
  }

  /// Revision counter bumped on every state change.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.inner.changes.subscribe()
  }

  pub fn service(&self) -> &S {
    &self.inner.service
  }

  pub fn config(&self) -> &PollConfig {
    &self.inner.config
  }

  pub fn is_torn_down(&self) -> bool {
    self.inner.store.borrow().is_torn_down()
  }

  fn update<R>(&self, f: impl FnOnce(&mut TableStore<T>) -> R) -> R {
    let (result, changed) = {
      let mut store = self.inner.store.borrow_mut();
      let before = store.revision();
      let result = f(&mut *store);
      (result, store.revision() != before)
    };
    if changed {
      self.notify();
    }
    result
  }

  fn notify(&self) {
    let revision = self.inner.store.borrow().revision();
    self.inner.changes.send_replace(revision);
  }
}

impl<T, S> PollingTable<T, S>
where
  T: TableRecord,
  S: DataService<T> + RecordMutations<T> + 'static
{
  /// Submits the open add/edit/delete modal. Validation errors block the submission
  /// and leave the modal open. On success the submitted modal closes, unless another
  /// one replaced it meanwhile, and the table refreshes.
  pub async fn submit_modal(&self, draft: Option<T>) -> Result<(), AppError> {
    if let Some(record) = draft.as_ref() {
      let errors = record.validate();
      if !errors.is_empty() {
        return Err(AppError::ValidationError(errors));
      }
    }

    let submitted = self.inner.store.borrow().modal().clone();
    match (submitted.clone(), draft) {
      (ModalFormState::Add, Some(record)) => {
        self.inner.service.create(&record).await?;
      },
      (ModalFormState::Edit(original), Some(record)) => {
        self.inner.service.update(&original.key(), &record).await?;
      },
      (ModalFormState::Delete(original), _) => {
        self.inner.service.delete(&original.key()).await?;
      },
      (state, _) => {
        return Err(AppError::ModalError(format!("nothing to submit for {:?}", state.mode())));
      }
    }

    // only the submitted modal closes, a newer one stays open
    self.update(|store| {
      let current = store.modal();
      let same = current.mode() == submitted.mode()
        && current.record().map(|r| r.key()) == submitted.record().map(|r| r.key());
      if same {
        store.close_modal();
      }
    });
    self.refresh().await;
    Ok(())
  }
}

async fn poll_loop<T, S, C>(weak: Weak<Inner<T, S>>, clock: C, interval: Duration)
where
  T: TableRecord,
  S: DataService<T> + 'static,
  C: Clock
{
  let mut in_flight: FuturesUnordered<LocalBoxFuture<'static, ()>> = FuturesUnordered::new();
  let mut tick = clock.sleep(Duration::ZERO).fuse();

  loop {
    select! {
      _ = tick => {
        let Some(inner) = weak.upgrade() else { break };
        let table = PollingTable { inner };
        if table.is_torn_down() {
          break;
        }
        in_flight.push(Box::pin(async move { table.refresh().await }));
        tick = clock.sleep(interval).fuse();
      },
      _ = in_flight.select_next_some() => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    future::Future
  };
  use tokio::task::{spawn_local, LocalSet};

  use crate::{
    clock::TokioClock,
    filter::FilterCriteria,
    view::{fixtures::{tick, Tick}, TableStatus}
  };

  #[derive(Default)]
  struct Script {
    calls: Cell<usize>,
    delays_ms: HashMap<usize, u64>,
    failures: Vec<usize>,
    create_delay_ms: u64,
    created: RefCell<Vec<String>>,
    downloads: RefCell<Vec<(FilterCriteria, Option<SortSpec>)>>
  }

  #[derive(Clone, Default)]
  struct MockService {
    script: Rc<Script>
  }

  impl MockService {
    fn with_delays(delays: &[(usize, u64)]) -> Self {
      MockService { script: Rc::new(Script { delays_ms: delays.iter().copied().collect(), ..Script::default() }) }
    }

    fn slow_create(delay_ms: u64) -> Self {
      MockService { script: Rc::new(Script { create_delay_ms: delay_ms, ..Script::default() }) }
    }

    fn failing_on(calls: &[usize]) -> Self {
      MockService { script: Rc::new(Script { failures: calls.to_vec(), ..Script::default() }) }
    }

    fn calls(&self) -> usize {
      self.script.calls.get()
    }
  }

  // call n answers with a single row "S{n}" priced n
  impl DataService<Tick> for MockService {
    fn fetch_list(&self) -> impl Future<Output = Result<Vec<Tick>, AppError>> {
      let n = self.script.calls.get() + 1;
      self.script.calls.set(n);
      let delay = self.script.delays_ms.get(&n).copied().unwrap_or(0);
      let fail = self.script.failures.contains(&n);
      async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if fail {
          Err(AppError::ServerError(503, vec![format!("call {} failed", n)]))
        } else {
          Ok(vec![tick(&format!("S{}", n), n as i64)])
        }
      }
    }

    fn download(&self, criteria: &FilterCriteria, sort: Option<&SortSpec>, _format: ExportFormat) -> impl Future<Output = Result<Vec<u8>, AppError>> {
      self.script.downloads.borrow_mut().push((criteria.clone(), sort.cloned()));
      async { Ok(b"symbol\n".to_vec()) }
    }
  }

  impl RecordMutations<Tick> for MockService {
    fn create(&self, record: &Tick) -> impl Future<Output = Result<Tick, AppError>> {
      self.script.created.borrow_mut().push(record.key());
      let record = record.clone();
      let delay = self.script.create_delay_ms;
      async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(record)
      }
    }

    fn update(&self, _key: &str, record: &Tick) -> impl Future<Output = Result<Tick, AppError>> {
      let record = record.clone();
      async move { Ok(record) }
    }

    fn delete(&self, _key: &str) -> impl Future<Output = Result<(), AppError>> {
      async { Ok(()) }
    }
  }

  fn new_table(service: MockService, interval_ms: u64) -> PollingTable<Tick, MockService> {
    PollingTable::new(service, PollConfig::new("ticks").with_interval_millis(interval_ms))
  }

  fn symbols(table: &PollingTable<Tick, MockService>) -> Vec<String> {
    table.snapshot().rows.into_iter().map(|r| r.symbol).collect()
  }

  async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
  }

  #[tokio::test(start_paused = true)]
  async fn polls_immediately_then_on_every_interval_until_teardown() {
    let service = MockService::default();
    let table = new_table(service.clone(), 1_000);

    LocalSet::new().run_until(async {
      let task = table.initialize(TokioClock).expect("first initialize returns the loop");
      assert!(table.initialize(TokioClock).is_none());
      assert!(table.snapshot().loading);
      spawn_local(async move { let _ = task.await; });

      sleep_ms(10).await;
      assert_eq!(service.calls(), 1);
      assert_eq!(symbols(&table), vec!["S1"]);
      assert!(!table.snapshot().loading);

      sleep_ms(1_000).await;
      assert_eq!(service.calls(), 2);
      assert_eq!(symbols(&table), vec!["S2"]);

      table.teardown();
      sleep_ms(5_000).await;
      assert_eq!(service.calls(), 2);
    }).await;
  }

  #[tokio::test(start_paused = true)]
  async fn overlapping_refreshes_keep_the_last_resolution() {
    // first request resolves at t=6s, second at t=5s
    let service = MockService::with_delays(&[(1, 6_000), (2, 5_000)]);
    let table = new_table(service.clone(), 60_000);

    tokio::join!(table.refresh(), table.refresh());
    assert_eq!(service.calls(), 2);
    assert_eq!(symbols(&table), vec!["S1"]);
  }

  #[tokio::test(start_paused = true)]
  async fn slow_fetch_overlaps_the_next_tick() {
    // tick at t=0 resolves at t=11s, tick at t=5s resolves at t=10s
    let service = MockService::with_delays(&[(1, 11_000), (2, 5_000), (3, 60_000)]);
    let table = new_table(service.clone(), 5_000);

    LocalSet::new().run_until(async {
      let task = table.initialize(TokioClock).unwrap();
      spawn_local(async move { let _ = task.await; });

      sleep_ms(10_500).await;
      assert_eq!(service.calls(), 3);
      assert_eq!(symbols(&table), vec!["S2"]);

      sleep_ms(1_000).await;
      assert_eq!(symbols(&table), vec!["S1"]);
      table.teardown();
    }).await;
  }

  #[tokio::test(start_paused = true)]
  async fn response_resolving_after_teardown_leaves_state_unchanged() {
    let service = MockService::with_delays(&[(2, 5_000)]);
    let table = new_table(service.clone(), 60_000);
    table.refresh().await;
    let before = table.snapshot();

    LocalSet::new().run_until(async {
      let pending = table.clone();
      let handle = spawn_local(async move { pending.refresh().await });
      sleep_ms(1_000).await;
      table.teardown();
      handle.await.unwrap();
    }).await;

    assert_eq!(table.snapshot(), before);
    table.refresh().await;
    assert_eq!(service.calls(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn failure_sets_errors_until_next_success() {
    let service = MockService::failing_on(&[1, 3]);
    let table = new_table(service.clone(), 60_000);

    table.refresh().await;
    let snap = table.snapshot();
    assert_eq!(snap.status, TableStatus::Failed(vec!["call 1 failed".into()]));
    assert!(snap.rows.is_empty());

    table.refresh().await;
    assert!(table.snapshot().errors.is_empty());
    assert_eq!(symbols(&table), vec!["S2"]);

    table.refresh().await;
    let snap = table.snapshot();
    assert_eq!(snap.errors, vec!["call 3 failed".to_string()]);
    assert_eq!(snap.status, TableStatus::Ready);
    assert_eq!(symbols(&table), vec!["S2"]);
  }

  #[tokio::test(start_paused = true)]
  async fn subscribers_see_filter_changes() {
    let table = new_table(MockService::default(), 60_000);
    table.refresh().await;
    let mut rx = table.subscribe();
    let _ = rx.borrow_and_update();

    table.set_filter("symbol", Some(FilterValue::Equals("nope".into())));
    assert!(rx.has_changed().unwrap());
    assert_eq!(table.snapshot().status, TableStatus::Empty);

    let _ = rx.borrow_and_update();
    table.set_filter("symbol", Some(FilterValue::Equals("nope".into())));
    assert!(!rx.has_changed().unwrap());
  }

  #[tokio::test(start_paused = true)]
  async fn export_forwards_current_criteria_and_sort() {
    let service = MockService::default();
    let table = new_table(service.clone(), 60_000);
    table.set_filter("symbol", Some(FilterValue::Equals("S1".into())));

    let bytes = table.export(ExportFormat::Csv).await.unwrap();
    assert_eq!(bytes, b"symbol\n".to_vec());

    table.toggle_sort("price");
    table.toggle_sort("price");
    table.export(ExportFormat::Json).await.unwrap();

    let sent = service.script.downloads.borrow();
    assert_eq!(sent[0].0.get("symbol"), Some(&FilterValue::Equals("S1".into())));
    assert_eq!(sent[0].1, None);
    assert_eq!(sent[1].1, Some(SortSpec::descending("price")));
  }

  #[tokio::test(start_paused = true)]
  async fn submitting_add_creates_closes_and_refreshes() {
    let service = MockService::default();
    let table = new_table(service.clone(), 60_000);
    table.open_modal(ModalMode::Add, None).unwrap();

    table.submit_modal(Some(tick("NEW", 5))).await.unwrap();
    assert_eq!(*service.script.created.borrow(), vec!["NEW".to_string()]);
    assert_eq!(table.snapshot().modal, ModalFormState::Closed);
    assert_eq!(service.calls(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn late_submission_leaves_a_newer_modal_open() {
    let service = MockService::slow_create(5_000);
    let table = new_table(service.clone(), 60_000);
    table.refresh().await;
    table.open_modal(ModalMode::Add, None).unwrap();

    LocalSet::new().run_until(async {
      let submitting = table.clone();
      let handle = spawn_local(async move { submitting.submit_modal(Some(tick("NEW", 5))).await });

      sleep_ms(1_000).await;
      table.close_modal();
      table.open_modal_for(ModalMode::View, "S1").unwrap();

      handle.await.unwrap().unwrap();
    }).await;

    assert_eq!(*service.script.created.borrow(), vec!["NEW".to_string()]);
    assert_eq!(table.snapshot().modal, ModalFormState::View(tick("S1", 1)));
  }

  #[tokio::test(start_paused = true)]
  async fn invalid_draft_blocks_submission() {
    let service = MockService::default();
    let table = new_table(service.clone(), 60_000);
    table.open_modal(ModalMode::Add, None).unwrap();

    let err = table.submit_modal(Some(tick("BAD", -1))).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(service.script.created.borrow().is_empty());
    assert_eq!(table.snapshot().modal, ModalFormState::Add);
  }

  #[tokio::test(start_paused = true)]
  async fn modal_opens_on_row_by_key() {
    let table = new_table(MockService::default(), 60_000);
    table.refresh().await;

    table.open_modal_for(ModalMode::View, "S1").unwrap();
    assert_eq!(table.snapshot().modal, ModalFormState::View(tick("S1", 1)));
    assert!(matches!(table.open_modal_for(ModalMode::Edit, "S9"), Err(AppError::NotFound(_))));
  }
}
