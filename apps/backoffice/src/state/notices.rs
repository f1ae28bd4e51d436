//! # Notice Board
//!
//! Success and error banners that dismiss themselves.
//!
//! Each raised notice gets a tokio timer task that removes it after the
//! configured delay. Timers hold only a weak reference to the board and are
//! aborted when the board is dropped or the notice is dismissed by hand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use kho_core::notice::{Notice, DEFAULT_NOTICE_TTL_SECS};

#[derive(Debug, Default)]
struct Board {
    next_id: u64,
    notices: Vec<Notice>,
    timers: HashMap<u64, JoinHandle<()>>,
}

fn lock(board: &Mutex<Board>) -> MutexGuard<'_, Board> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct NoticeBoard {
    board: Arc<Mutex<Board>>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        NoticeBoard {
            board: Arc::new(Mutex::new(Board::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.raise(|id| Notice::success(id, message, Utc::now()))
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.raise(|id| Notice::error(id, message, Utc::now()))
    }

    fn raise<F>(&self, make: F) -> u64
    where
        F: FnOnce(u64) -> Notice,
    {
        let mut board = lock(&self.board);
        board.next_id += 1;
        let id = board.next_id;
        board.notices.push(make(id));

        match Handle::try_current() {
            Ok(handle) => {
                let timer = handle.spawn(expire(Arc::downgrade(&self.board), id, self.ttl));
                board.timers.insert(id, timer);
            }
            Err(_) => warn!(id, "No async runtime, notice stays until dismissed"),
        }
        id
    }

    /// Removes a notice before its timer fires.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = lock(&self.board);
        if let Some(timer) = board.timers.remove(&id) {
            timer.abort();
        }
        let before = board.notices.len();
        board.notices.retain(|n| n.id != id);
        board.notices.len() != before
    }

    /// Notices still on screen, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_NOTICE_TTL_SECS as i64));
        let now = Utc::now();
        lock(&self.board)
            .notices
            .iter()
            .filter(|n| !n.is_expired(now, ttl))
            .cloned()
            .collect()
    }
}

async fn expire(board: Weak<Mutex<Board>>, id: u64, ttl: Duration) {
    tokio::time::sleep(ttl).await;
    if let Some(board) = board.upgrade() {
        let mut board = lock(&board);
        board.notices.retain(|n| n.id != id);
        board.timers.remove(&id);
        debug!(id, "Notice expired");
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        for (_, timer) in lock(&self.board).timers.drain() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kho_core::notice::NoticeLevel;

    #[tokio::test(start_paused = true)]
    async fn test_notice_dismisses_itself() {
        let board = NoticeBoard::new(Duration::from_secs(3));
        board.success("Tạo phiếu bán hàng thành công");
        assert_eq!(board.active().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(board.active().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(board.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_by_hand() {
        let board = NoticeBoard::new(Duration::from_secs(3));
        let first = board.error("Lỗi kết nối");
        let second = board.success("Đã lưu");

        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));

        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
        assert_eq!(active[0].level, NoticeLevel::Success);
    }

    #[test]
    fn test_without_runtime_notice_stays() {
        let board = NoticeBoard::new(Duration::from_secs(3));
        let id = board.success("Đã lưu");
        assert_eq!(board.active()[0].id, id);
    }
}
