//! User: binds a connection to an identity.

use std::{fmt, sync::Arc};

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::{
    connection::Connection,
    slots::{Occupant, VacancyNotice},
};

/// Longest display name a user can pick, in characters
pub const MAX_NAME_CHARS: usize = 32;

pub struct User {
    id: Uuid,
    name: RwLock<String>,
    connection: RwLock<Arc<Connection>>,
    /// Kept so a replacement connection can be registered with the same slots
    vacancy_notices: Mutex<Vec<VacancyNotice>>,
}

impl User {
    /// Bind `connection` to a new identity with a generated UUID v4
    pub fn new(name: impl Into<String>, connection: Arc<Connection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: RwLock::new(name.into()),
            connection: RwLock::new(connection),
            vacancy_notices: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Rename the user, returning the name actually applied.
    ///
    /// The requested name is trimmed and cut to [`MAX_NAME_CHARS`] characters.
    /// Returns `None` and keeps the current name when nothing is left.
    pub fn rename(&self, requested: &str) -> Option<String> {
        let name: String = requested.trim().chars().take(MAX_NAME_CHARS).collect();
        let name = name.trim_end().to_string();
        if name.is_empty() {
            return None;
        }
        *self.name.write() = name.clone();
        Some(name)
    }

    pub fn connection(&self) -> Arc<Connection> {
        self.connection.read().clone()
    }

    /// Replace the bound connection and return the previous one.
    ///
    /// The previous connection is not closed. The new one inherits the slots
    /// this user occupies.
    pub fn set_connection(&self, connection: Arc<Connection>) -> Arc<Connection> {
        let notices = self.vacancy_notices.lock().clone();
        for notice in &notices {
            connection.on_vacate(notice.clone());
        }
        let previous = std::mem::replace(&mut *self.connection.write(), connection.clone());
        if !connection.is_active() {
            notices.iter().for_each(VacancyNotice::post);
        }
        previous
    }
}

impl Occupant for User {
    fn is_active(&self) -> bool {
        self.connection.read().is_active()
    }

    fn on_vacate(&self, notice: VacancyNotice) {
        self.vacancy_notices.lock().push(notice.clone());
        self.connection.read().on_vacate(notice);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name.read(), self.id)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .field("connection", &*self.connection.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{slots::SlotArena, transport::testing::RecordingSink};

    fn user(name: &str) -> (Arc<User>, RecordingSink) {
        let sink = RecordingSink::new();
        let connection = Arc::new(Connection::new(sink.boxed()));
        (Arc::new(User::new(name, connection)), sink)
    }

    #[test]
    fn test_users_get_distinct_ids() {
        // テスト項目: ユーザーごとに異なる UUID が割り当てられる
        // given (前提条件):
        let (alice, _) = user("alice");

        // when (操作):
        let (bob, _) = user("bob");

        // then (期待する結果):
        assert_ne!(alice.id(), bob.id());
        assert_eq!(alice.id().get_version_num(), 4);
    }

    #[test]
    fn test_rename_trims_and_truncates() {
        // テスト項目: 名前の変更時に前後の空白が除去され、最大文字数で切り詰められる
        // given (前提条件):
        let (alice, _) = user("guest-1");
        let long_name = format!("  {}  ", "あ".repeat(40));

        // when (操作):
        let applied = alice.rename(&long_name);

        // then (期待する結果):
        assert_eq!(applied, Some("あ".repeat(MAX_NAME_CHARS)));
        assert_eq!(alice.name().chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_rename_to_blank_keeps_current_name() {
        // テスト項目: 空白のみの名前への変更は無視される
        // given (前提条件):
        let (alice, _) = user("alice");

        // when (操作):
        let applied = alice.rename("   ");

        // then (期待する結果):
        assert_eq!(applied, None);
        assert_eq!(alice.name(), "alice");
    }

    #[tokio::test]
    async fn test_set_connection_returns_previous_without_closing() {
        // テスト項目: 接続の差し替えで以前の接続が返され、閉じられない
        // given (前提条件):
        let (alice, old_sink) = user("alice");
        let old = alice.connection();
        let new_sink = RecordingSink::new();
        let replacement = Arc::new(Connection::new(new_sink.boxed()));

        // when (操作):
        let previous = alice.set_connection(replacement.clone());
        alice.connection().send("hello").await.unwrap();

        // then (期待する結果):
        assert!(Arc::ptr_eq(&previous, &old));
        assert!(previous.is_open());
        assert_eq!(old_sink.close_count(), 0);
        assert!(old_sink.frames().is_empty());
        assert_eq!(new_sink.frames(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_replacement_connection_vacates_user_slot() {
        // テスト項目: 差し替え後の接続が閉じるとユーザーのスロットが空きになる
        // given (前提条件):
        let mut arena = SlotArena::new();
        let (alice, _) = user("alice");
        arena.insert(alice.clone());
        let replacement = Arc::new(Connection::new(RecordingSink::new().boxed()));
        alice.set_connection(replacement.clone());

        // when (操作):
        replacement.close().await;
        let (bob, _) = user("bob");
        let slot = arena.insert(bob.clone());

        // then (期待する結果):
        assert_eq!(slot, 0);
        assert!(Arc::ptr_eq(arena.get(0).unwrap(), &bob));
    }

    #[test]
    fn test_display_shows_name_and_id() {
        // テスト項目: 表示形式に名前と ID が含まれる
        // given (前提条件):
        let (alice, _) = user("alice");

        // when (操作):
        let shown = alice.to_string();

        // then (期待する結果):
        assert_eq!(shown, format!("alice ({})", alice.id()));
    }
}
