//! Queue of writes waiting to reach storage.

use super::Storage;
use crate::model::Board;

/// A write the session wants persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Upsert this board snapshot.
    Save(Board),
    /// Delete the board with this id.
    Delete(String),
}

impl PendingWrite {
    /// Id of the board this write targets.
    pub fn board_id(&self) -> &str {
        match self {
            PendingWrite::Save(board) => board.id(),
            PendingWrite::Delete(id) => id,
        }
    }
}

/// Pending writes, coalesced so each board has at most one entry.
///
/// A newer write for a board replaces the older one and moves to the back.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    writes: Vec<PendingWrite>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: PendingWrite) {
        self.writes.retain(|w| w.board_id() != write.board_id());
        self.writes.push(write);
    }

    /// Queue a snapshot of `board`.
    pub fn save(&mut self, board: &Board) {
        self.push(PendingWrite::Save(board.clone()));
    }

    pub fn delete(&mut self, id: impl Into<String>) {
        self.push(PendingWrite::Delete(id.into()));
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn pending(&self) -> &[PendingWrite] {
        &self.writes
    }

    /// Remove and return everything queued.
    pub fn drain(&mut self) -> Vec<PendingWrite> {
        std::mem::take(&mut self.writes)
    }
}

/// Outcome of a [`dispatch`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Perform queued writes in order.
///
/// Failures are logged and counted; they never stop the remaining writes.
pub async fn dispatch<S: Storage + ?Sized>(storage: &S, writes: Vec<PendingWrite>) -> FlushReport {
    let mut report = FlushReport::default();
    for write in writes {
        match &write {
            PendingWrite::Save(board) => match storage.save_board(board).await {
                Ok(()) => report.saved += 1,
                Err(e) => {
                    log::error!("Failed to save board {}: {}", board.id(), e);
                    report.failed += 1;
                }
            },
            PendingWrite::Delete(id) => match storage.delete_board(id).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    log::error!("Failed to delete board {}: {}", id, e);
                    report.failed += 1;
                }
            },
        }
    }
    if report.saved + report.deleted > 0 {
        log::debug!("Flushed {} save(s) and {} delete(s)", report.saved, report.deleted);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BoxFuture, MemoryStorage, StorageError, StorageResult, block_on};

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save_board(&self, _board: &Board) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk full".to_string())) })
        }

        fn get_board(&self, id: &str) -> BoxFuture<'_, StorageResult<Board>> {
            let id = id.to_string();
            Box::pin(async move { Err(StorageError::NotFound(id)) })
        }

        fn get_all_boards(&self) -> BoxFuture<'_, StorageResult<Vec<Board>>> {
            Box::pin(async { Err(StorageError::Io("unavailable".to_string())) })
        }

        fn delete_board(&self, _id: &str) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Other("read only".to_string())) })
        }
    }

    #[test]
    fn test_outbox_coalesces_per_board() {
        let mut outbox = Outbox::new();
        let mut a = Board::new("A");
        let b = Board::new("B");

        outbox.save(&a);
        outbox.save(&b);
        a.rename("A2");
        outbox.save(&a);

        let writes = outbox.drain();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].board_id(), b.id());
        assert!(matches!(&writes[1], PendingWrite::Save(board) if board.name() == "A2"));
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_delete_replaces_save() {
        let mut outbox = Outbox::new();
        let board = Board::new("A");
        outbox.save(&board);
        outbox.delete(board.id());
        assert_eq!(outbox.pending(), [PendingWrite::Delete(board.id().to_string())]);
    }

    #[test]
    fn test_dispatch_writes_in_order() {
        let storage = MemoryStorage::new();
        let keep = Board::new("Keep");
        let gone = Board::new("Gone");
        block_on(storage.save_board(&gone)).unwrap();

        let report = block_on(dispatch(
            &storage,
            vec![PendingWrite::Save(keep.clone()), PendingWrite::Delete(gone.id().to_string())],
        ));
        assert_eq!(report, FlushReport { saved: 1, deleted: 1, failed: 0 });

        let all = block_on(storage.get_all_boards()).unwrap();
        assert_eq!(all, vec![keep]);
    }

    #[test]
    fn test_dispatch_counts_failures() {
        let report = block_on(dispatch(
            &FailingStorage,
            vec![PendingWrite::Save(Board::new("A")), PendingWrite::Delete("x".to_string())],
        ));
        assert_eq!(report.failed, 2);
        assert!(!report.is_clean());
    }
}
