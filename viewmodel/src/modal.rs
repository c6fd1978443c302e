use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
  Add,
  Edit,
  View,
  Delete
}

/// The single modal slot of a table. At most one mode is active and only the
/// record-bearing modes hold a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalFormState<T> {
  Closed,
  Add,
  Edit(T),
  View(T),
  Delete(T)
}

impl<T> Default for ModalFormState<T> {
  fn default() -> Self {
    ModalFormState::Closed
  }
}

impl<T> ModalFormState<T> {
  pub fn open(mode: ModalMode, record: Option<T>) -> Result<Self, AppError> {
    match (mode, record) {
      (ModalMode::Add, None) => Ok(ModalFormState::Add),
      (ModalMode::Add, Some(_)) => Err(AppError::ModalError("add form does not take a record".to_string())),
      (ModalMode::Edit, Some(r)) => Ok(ModalFormState::Edit(r)),
      (ModalMode::View, Some(r)) => Ok(ModalFormState::View(r)),
      (ModalMode::Delete, Some(r)) => Ok(ModalFormState::Delete(r)),
      (mode, None) => Err(AppError::ModalError(format!("{:?} form requires a record", mode)))
    }
  }

  pub fn mode(&self) -> Option<ModalMode> {
    match self {
      ModalFormState::Closed => None,
      ModalFormState::Add => Some(ModalMode::Add),
      ModalFormState::Edit(_) => Some(ModalMode::Edit),
      ModalFormState::View(_) => Some(ModalMode::View),
      ModalFormState::Delete(_) => Some(ModalMode::Delete)
    }
  }

  pub fn record(&self) -> Option<&T> {
    match self {
      ModalFormState::Edit(r) | ModalFormState::View(r) | ModalFormState::Delete(r) => Some(r),
      ModalFormState::Closed | ModalFormState::Add => None
    }
  }

  pub fn is_open(&self) -> bool {
    !matches!(self, ModalFormState::Closed)
  }

  /// View -> Edit toggle of the detail modal. Any other state is left untouched.
  pub fn into_edit(self) -> Self {
    match self {
      ModalFormState::View(r) => ModalFormState::Edit(r),
      other => other
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_takes_no_record() {
    assert_eq!(ModalFormState::<u32>::open(ModalMode::Add, None), Ok(ModalFormState::Add));
    assert!(ModalFormState::open(ModalMode::Add, Some(1)).is_err());
  }

  #[test]
  fn record_modes_require_a_record() {
    for mode in [ModalMode::Edit, ModalMode::View, ModalMode::Delete] {
      assert!(ModalFormState::<u32>::open(mode, None).is_err());
      let state = ModalFormState::open(mode, Some(7)).unwrap();
      assert_eq!(state.mode(), Some(mode));
      assert_eq!(state.record(), Some(&7));
    }
  }

  #[test]
  fn view_toggles_to_edit_keeping_the_record() {
    let state = ModalFormState::open(ModalMode::View, Some("AAA")).unwrap();
    assert_eq!(state.into_edit(), ModalFormState::Edit("AAA"));
    assert_eq!(ModalFormState::<&str>::Add.into_edit(), ModalFormState::Add);
  }
}
