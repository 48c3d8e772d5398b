// core/src/views/state.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// State owned by one mounted view, shared with that view's polling task.
///
/// IMPORTANT: guards are blocking and MUST NOT be held across `.await`.
#[derive(Debug)]
pub struct ViewState<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ViewState<T> {
  pub fn new(data: T) -> Self {
    ViewState(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for ViewState<T> {
  fn clone(&self) -> Self {
    ViewState(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ViewState<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
