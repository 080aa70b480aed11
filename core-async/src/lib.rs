//! Async runtime facade for the bazarr-sync workspace.
//!
//! Every `core-*` and `provider-*` crate goes through this crate instead of
//! naming Tokio directly, so the runtime choice stays in one place.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, timeouts, durations
//! - `sync`: Channels, locks and [`CancellationToken`](sync::CancellationToken)
//! - `signal`: Process interrupt futures (Ctrl-C, SIGTERM)
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod signal;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Waits on multiple concurrent branches, returning when the first completes.
pub use tokio::select;
