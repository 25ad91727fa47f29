#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
  // Every robot finished its tasks.
  Done,
  // Ctrl-C before the run completed.
  Interrupted,
}
