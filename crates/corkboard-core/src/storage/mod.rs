//! Storage abstraction for persistence.
//!
//! The session never waits on storage: mutations are applied in memory and
//! queued as [`PendingWrite`]s, which the host hands to [`dispatch`] whenever
//! it likes.

mod memory;
mod outbox;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;
pub use outbox::{FlushReport, Outbox, PendingWrite, dispatch};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::model::Board;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Board persistence backend.
///
/// `save_board` is an upsert by board id and `delete_board` of a missing id
/// succeeds. `get_all_boards` makes no ordering promise.
///
/// On native platforms implementations must be Send + Sync.
/// On WASM these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Insert or replace a board.
    fn save_board(&self, board: &Board) -> BoxFuture<'_, StorageResult<()>>;

    /// Load one board.
    fn get_board(&self, id: &str) -> BoxFuture<'_, StorageResult<Board>>;

    /// Load every stored board.
    fn get_all_boards(&self) -> BoxFuture<'_, StorageResult<Vec<Board>>>;

    /// Delete a board.
    fn delete_board(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Board persistence backend (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Insert or replace a board.
    fn save_board(&self, board: &Board) -> BoxFuture<'_, StorageResult<()>>;

    /// Load one board.
    fn get_board(&self, id: &str) -> BoxFuture<'_, StorageResult<Board>>;

    /// Load every stored board.
    fn get_all_boards(&self) -> BoxFuture<'_, StorageResult<Vec<Board>>>;

    /// Delete a board.
    fn delete_board(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
