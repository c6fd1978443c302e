use std::time::Duration;
use futures::future::LocalBoxFuture;

/// Source of the delays driving the refresh timer.
pub trait Clock: 'static {
  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

#[cfg(feature = "tokio-clock")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[cfg(feature = "tokio-clock")]
impl Clock for TokioClock {
  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
    Box::pin(tokio::time::sleep(duration))
  }
}
