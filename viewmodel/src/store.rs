use tracing::{debug, warn};

use crate::{
  error::AppError,
  filter::{FilterCriteria, FilterValue},
  modal::{ModalFormState, ModalMode},
  record::TableRecord,
  sort::SortSpec,
  view::{project, TableSnapshot, TableStatus}
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
  Created,
  Mounted,
  TornDown
}

/// Handed out when a fetch starts and returned with its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
  seq: u64
}

/// Synchronous state of one polling table.
///
/// The dataset and the filter criteria are independent inputs. The visible rows are
/// recomputed from both every time either of them changes, so a response that
/// resolves after a filter change is always shown through the newest filter.
#[derive(Debug)]
pub struct TableStore<T> {
  dataset: Vec<T>,
  criteria: FilterCriteria,
  sort: Option<SortSpec>,
  view: Vec<usize>,
  loading: bool,
  loaded: bool,
  errors: Vec<String>,
  modal: ModalFormState<T>,
  lifecycle: Lifecycle,
  next_seq: u64,
  in_flight: usize,
  last_applied: Option<u64>,
  revision: u64
}

impl<T: TableRecord> Default for TableStore<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: TableRecord> TableStore<T> {
  pub fn new() -> Self {
    TableStore {
      dataset: Vec::new(),
      criteria: FilterCriteria::new(),
      sort: None,
      view: Vec::new(),
      loading: false,
      loaded: false,
      errors: Vec::new(),
      modal: ModalFormState::Closed,
      lifecycle: Lifecycle::Created,
      next_seq: 0,
      in_flight: 0,
      last_applied: None,
      revision: 0
    }
  }

  fn touch(&mut self) {
    self.revision += 1;
  }

  fn recompute(&mut self) {
    self.view = project(&self.dataset, &self.criteria, self.sort.as_ref());
  }

  /// Created -> Mounted. Returns false if the store was already mounted or torn down.
  pub fn mount(&mut self) -> bool {
    if self.lifecycle != Lifecycle::Created {
      return false;
    }
    self.lifecycle = Lifecycle::Mounted;
    self.loading = true;
    self.touch();
    true
  }

  /// Returns false on repeated calls.
  pub fn teardown(&mut self) -> bool {
    if self.lifecycle == Lifecycle::TornDown {
      return false;
    }
    self.lifecycle = Lifecycle::TornDown;
    true
  }

  pub fn is_torn_down(&self) -> bool {
    self.lifecycle == Lifecycle::TornDown
  }

  /// Registers a fetch about to start. `None` once torn down.
  pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
    if self.is_torn_down() {
      return None;
    }
    self.next_seq += 1;
    self.in_flight += 1;
    Some(RefreshTicket { seq: self.next_seq })
  }

  /// Applies a fetch outcome in arrival order.
  ///
  /// Success replaces the dataset wholesale and clears the error list. Failure keeps the
  /// dataset and records the messages. Loading is cleared either way. After teardown the
  /// outcome is dropped and false is returned.
  pub fn complete_refresh(&mut self, ticket: RefreshTicket, outcome: Result<Vec<T>, AppError>) -> bool {
    self.in_flight = self.in_flight.saturating_sub(1);
    if self.is_torn_down() {
      debug!(seq = ticket.seq, "discarding response that arrived after teardown");
      return false;
    }

    if let Some(last) = self.last_applied {
      if ticket.seq < last {
        debug!(seq = ticket.seq, last, "older request resolved after a newer one, applying it");
      }
    }
    self.last_applied = Some(ticket.seq);

    match outcome {
      Ok(records) => {
        self.dataset = records;
        self.loaded = true;
        self.errors.clear();
        self.recompute();
      },
      Err(e) => {
        warn!(seq = ticket.seq, error = %e, "refresh failed, keeping last known data");
        self.errors = e.messages();
      }
    }
    self.loading = false;
    self.touch();
    true
  }

  pub fn set_filter(&mut self, field: &str, value: Option<FilterValue>) {
    if self.criteria.set(field, value) {
      self.recompute();
      self.touch();
    }
  }

  pub fn reset_filters(&mut self) {
    if self.criteria.is_empty() {
      return;
    }
    self.criteria.clear();
    self.recompute();
    self.touch();
  }

  pub fn set_sort(&mut self, sort: Option<SortSpec>) {
    if self.sort != sort {
      self.sort = sort;
      self.recompute();
      self.touch();
    }
  }

  pub fn toggle_sort(&mut self, column: &str) {
    let next = SortSpec::cycle(self.sort.as_ref(), column);
    self.set_sort(next);
  }

  /// Rejects Add with a record and Edit/View/Delete without one, leaving the modal as it was.
  pub fn open_modal(&mut self, mode: ModalMode, record: Option<T>) -> Result<(), AppError> {
    let next = ModalFormState::open(mode, record)?;
    if self.modal.is_open() {
      debug!(?mode, "replacing the open modal");
    }
    self.modal = next;
    self.touch();
    Ok(())
  }

  pub fn close_modal(&mut self) {
    if self.modal.is_open() {
      self.modal = ModalFormState::Closed;
      self.touch();
    }
  }

  pub fn edit_from_view(&mut self) {
    if self.modal.mode() == Some(ModalMode::View) {
      self.modal = std::mem::take(&mut self.modal).into_edit();
      self.touch();
    }
  }

  pub fn find(&self, key: &str) -> Option<&T> {
    self.dataset.iter().find(|r| r.key() == key)
  }

  pub fn dataset(&self) -> &[T] {
    &self.dataset
  }

  pub fn rows(&self) -> impl Iterator<Item = &T> {
    self.view.iter().map(|idx| &self.dataset[*idx])
  }

  pub fn criteria(&self) -> &FilterCriteria {
    &self.criteria
  }

  pub fn sort(&self) -> Option<&SortSpec> {
    self.sort.as_ref()
  }

  pub fn modal(&self) -> &ModalFormState<T> {
    &self.modal
  }

  pub fn loading(&self) -> bool {
    self.loading
  }

  pub fn errors(&self) -> &[String] {
    &self.errors
  }

  pub fn in_flight(&self) -> usize {
    self.in_flight
  }

  pub fn revision(&self) -> u64 {
    self.revision
  }

  pub fn status(&self) -> TableStatus {
    if !self.loaded {
      if !self.errors.is_empty() {
        return TableStatus::Failed(self.errors.clone());
      }
      return TableStatus::Loading;
    }
    if self.view.is_empty() {
      TableStatus::Empty
    } else {
      TableStatus::Ready
    }
  }

  pub fn snapshot(&self) -> TableSnapshot<T> {
    TableSnapshot {
      rows: self.rows().cloned().collect(),
      total: self.dataset.len(),
      status: self.status(),
      loading: self.loading,
      errors: self.errors.clone(),
      criteria: self.criteria.clone(),
      sort: self.sort.clone(),
      modal: self.modal.clone(),
      revision: self.revision
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::view::fixtures::{tick, Tick};

  fn loaded(records: Vec<Tick>) -> TableStore<Tick> {
    let mut store = TableStore::new();
    store.mount();
    let ticket = store.begin_refresh().unwrap();
    store.complete_refresh(ticket, Ok(records));
    store
  }

  fn rows(store: &TableStore<Tick>) -> Vec<Tick> {
    store.rows().cloned().collect()
  }

  #[test]
  fn mount_is_idempotent_and_sets_loading() {
    let mut store = TableStore::<Tick>::new();
    assert!(store.mount());
    assert!(store.loading());
    assert!(!store.mount());
    assert_eq!(store.status(), TableStatus::Loading);
  }

  #[test]
  fn failure_keeps_dataset_and_success_clears_errors() {
    let mut store = loaded(vec![tick("AAA", 10)]);

    let ticket = store.begin_refresh().unwrap();
    store.complete_refresh(ticket, Err(AppError::ConnectionError("timeout".into())));
    assert_eq!(rows(&store), vec![tick("AAA", 10)]);
    assert_eq!(store.errors(), &["Connection error: timeout".to_string()]);
    assert_eq!(store.status(), TableStatus::Ready);
    assert!(!store.loading());

    let ticket = store.begin_refresh().unwrap();
    store.complete_refresh(ticket, Ok(vec![tick("BBB", 20)]));
    assert!(store.errors().is_empty());
    assert_eq!(rows(&store), vec![tick("BBB", 20)]);
  }

  #[test]
  fn failure_before_any_data_is_distinguished_from_empty() {
    let mut store = TableStore::<Tick>::new();
    store.mount();
    let ticket = store.begin_refresh().unwrap();
    store.complete_refresh(ticket, Err(AppError::ServerError(503, vec!["feed down".into()])));
    assert_eq!(store.status(), TableStatus::Failed(vec!["feed down".into()]));
    assert!(!store.loading());

    let empty = loaded(vec![]);
    assert_eq!(empty.status(), TableStatus::Empty);
  }

  #[test]
  fn late_resolution_wins_regardless_of_start_order() {
    let mut store = loaded(vec![]);
    let first = store.begin_refresh().unwrap();
    let second = store.begin_refresh().unwrap();
    assert_eq!(store.in_flight(), 2);

    store.complete_refresh(second, Ok(vec![tick("XXX", 1)]));
    store.complete_refresh(first, Ok(vec![tick("YYY", 2)]));
    assert_eq!(rows(&store), vec![tick("YYY", 2)]);
    assert_eq!(store.in_flight(), 0);
  }

  #[test]
  fn response_after_teardown_is_discarded() {
    let mut store = loaded(vec![tick("AAA", 10)]);
    let ticket = store.begin_refresh().unwrap();
    let before = store.revision();

    assert!(store.teardown());
    assert!(!store.teardown());
    assert!(!store.complete_refresh(ticket, Ok(vec![tick("ZZZ", 99)])));
    assert_eq!(rows(&store), vec![tick("AAA", 10)]);
    assert_eq!(store.revision(), before);
    assert!(store.begin_refresh().is_none());
  }

  #[test]
  fn filter_applied_while_fetch_in_flight_survives_the_response() {
    let mut store = loaded(vec![tick("AAA", 10)]);
    let ticket = store.begin_refresh().unwrap();
    store.set_filter("symbol", Some(FilterValue::Equals("BBB".into())));
    assert!(rows(&store).is_empty());

    store.complete_refresh(ticket, Ok(vec![tick("AAA", 11), tick("BBB", 21)]));
    assert_eq!(rows(&store), vec![tick("BBB", 21)]);
    assert_eq!(store.criteria().get("symbol"), Some(&FilterValue::Equals("BBB".into())));
  }

  #[test]
  fn reset_filters_restores_full_dataset() {
    let data = vec![tick("AAA", 10), tick("BBB", 20), tick("CCC", 30)];
    let mut store = loaded(data.clone());
    store.set_filter("symbol", Some(FilterValue::Equals("BBB".into())));
    store.set_filter("price", Some(FilterValue::Equals("20".into())));
    assert_eq!(rows(&store).len(), 1);

    store.reset_filters();
    assert_eq!(rows(&store), data);
    store.reset_filters();
    assert_eq!(rows(&store), data);
  }

  #[test]
  fn clearing_sort_restores_dataset_order() {
    let data = vec![tick("CCC", 30), tick("AAA", 10)];
    let mut store = loaded(data.clone());
    store.toggle_sort("symbol");
    assert_eq!(rows(&store)[0], tick("AAA", 10));
    store.toggle_sort("symbol");
    assert_eq!(rows(&store)[0], tick("CCC", 30));
    store.toggle_sort("symbol");
    assert_eq!(rows(&store), data);
  }

  #[test]
  fn edit_modal_closes_without_retaining_the_record() {
    let mut store = loaded(vec![tick("AAA", 10)]);
    store.open_modal(ModalMode::Edit, Some(tick("AAA", 10))).unwrap();
    assert_eq!(store.modal().record(), Some(&tick("AAA", 10)));

    store.close_modal();
    assert_eq!(store.modal(), &ModalFormState::Closed);
    assert!(store.modal().record().is_none());
  }

  #[test]
  fn invalid_modal_request_leaves_state_untouched() {
    let mut store = loaded(vec![tick("AAA", 10)]);
    store.open_modal(ModalMode::View, Some(tick("AAA", 10))).unwrap();
    assert!(store.open_modal(ModalMode::Delete, None).is_err());
    assert_eq!(store.modal().mode(), Some(ModalMode::View));

    store.edit_from_view();
    assert_eq!(store.modal(), &ModalFormState::Edit(tick("AAA", 10)));
  }

  #[test]
  fn opening_a_modal_replaces_the_current_one() {
    let mut store = loaded(vec![tick("AAA", 10)]);
    store.open_modal(ModalMode::View, Some(tick("AAA", 10))).unwrap();
    store.open_modal(ModalMode::Add, None).unwrap();
    assert_eq!(store.modal(), &ModalFormState::Add);
  }
}
