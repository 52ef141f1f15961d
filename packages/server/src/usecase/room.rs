//! UseCase: チャットルーム
//!
//! ## 責務
//!
//! - アップグレード済みの接続を User として登録し、読み取りループを起動する
//! - 受信フレームを制御メッセージとしてデコードし、チャット本文を送信者以外に中継する
//! - `create` による名前変更、`error` によるクライアントエラー報告を処理する
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - accept_connection から中継までの一連の流れ
//! - User のスロット再利用と削除
//!
//! ### どのような状況を想定しているか
//! - 正常系：A, B, C が参加し C の発言が A と B にだけ届く
//! - 異常系：不正な JSON を受信しても読み取りループは継続する
//! - エッジケース：読み取りエラーで接続が閉じ、スロットが再利用される

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::Mutex, task::JoinHandle};

use crate::domain::{
    BroadcastReport, Connection, ControlMessage, FrameSink, FrameSource, RegistryError, SlotArena,
    User, decode_frame, deliver,
};

use super::log_delivery_failures;

/// チャットルーム
pub struct Room {
    id: String,
    users: Mutex<SlotArena<User>>,
    /// 表示名の採番用カウンタ（退室があっても値は戻らない）
    name_counter: AtomicU64,
}

impl Room {
    /// 新しい Room を作成
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            users: Mutex::new(SlotArena::new()),
            name_counter: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 新しい接続をルームに迎え入れる
    ///
    /// # Arguments
    ///
    /// * `sink` - 分割済みソケットの送信側
    /// * `source` - 分割済みソケットの受信側
    ///
    /// # Returns
    ///
    /// 登録された User と、その読み取りループのハンドル
    pub async fn accept_connection(
        self: &Arc<Self>,
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
    ) -> (Arc<User>, JoinHandle<()>) {
        let connection = Arc::new(Connection::new(sink));
        let user = Arc::new(User::new(self.next_display_name(), connection));
        let slot = self.add_user(user.clone()).await;
        tracing::info!("User '{}' joined room '{}' at slot {}", user, self.id, slot);

        let read_loop = tokio::spawn(Arc::clone(self).read_loop(user.clone(), source));
        (user, read_loop)
    }

    fn next_display_name(&self) -> String {
        let n = self.name_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("guest-{n}")
    }

    /// User を登録し、格納先のスロットを返す
    pub async fn add_user(&self, user: Arc<User>) -> usize {
        self.users.lock().await.insert(user)
    }

    /// User をルームから外し、その接続を閉じる
    ///
    /// # Errors
    ///
    /// User が登録されていない場合は [`RegistryError::UserNotFound`] を返す。
    pub async fn remove_user(&self, user: &Arc<User>) -> Result<(), RegistryError> {
        let found = self.users.lock().await.position(user);
        match found {
            Some(_) => {
                user.connection().close().await;
                tracing::info!("User '{}' removed from room '{}'", user, self.id);
                Ok(())
            }
            None => Err(RegistryError::UserNotFound(user.id())),
        }
    }

    /// 全ての User の接続を閉じる
    pub async fn close_all_connections(&self) {
        let connections: Vec<Arc<Connection>> =
            self.users().await.iter().map(|user| user.connection()).collect();
        futures_util::future::join_all(connections.iter().map(|connection| connection.close()))
            .await;
        tracing::info!(
            "Closed {} connection(s) in room '{}'",
            connections.len(),
            self.id
        );
    }

    /// 全ての User にペイロードを送信する
    pub async fn send_all(&self, payload: &str) -> BroadcastReport {
        let recipients = self.users().await.iter().map(|user| user.connection()).collect::<Vec<_>>();
        deliver(payload, recipients).await
    }

    /// `sender` 以外の全ての User にペイロードを送信する
    pub async fn relay(&self, payload: &str, sender: &Arc<User>) -> BroadcastReport {
        let recipients = self
            .users()
            .await
            .iter()
            .filter(|user| !Arc::ptr_eq(user, sender))
            .map(|user| user.connection())
            .collect::<Vec<_>>();
        deliver(payload, recipients).await
    }

    /// 全スロットの User（退室済みも含む）
    pub async fn users(&self) -> Vec<Arc<User>> {
        self.users.lock().await.snapshot()
    }

    /// スロット数（退室済みも含む）
    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    /// 接続中の User の数
    pub async fn active_user_count(&self) -> usize {
        self.users.lock().await.active_count()
    }

    /// 読み取りエラーが発生するか、接続が閉じられるまでフレームを受信し続ける
    ///
    /// 接続が閉じられた時点で受信側を破棄し、以降のフレームは処理しない。
    async fn read_loop(self: Arc<Self>, user: Arc<User>, mut source: Box<dyn FrameSource>) {
        loop {
            let connection = user.connection();
            tokio::select! {
                biased;
                _ = connection.closed() => {
                    tracing::info!("User '{}' left room '{}'", user, self.id);
                    break;
                }
                received = source.next_frame() => match received {
                    Ok(frame) => self.process_frame(&user, &frame).await,
                    Err(e) => {
                        tracing::info!("User '{}' disconnected: {}", user, e);
                        connection.close().await;
                        break;
                    }
                },
            }
        }
    }

    async fn process_frame(&self, user: &Arc<User>, frame: &str) {
        for decoded in decode_frame(frame) {
            match decoded {
                Ok(message) => self.handle_message(user, message).await,
                Err(e) => tracing::warn!("Invalid message from user '{}': {}", user, e),
            }
        }
    }

    async fn handle_message(&self, user: &Arc<User>, message: ControlMessage) {
        if let Some(username) = message.requested_username() {
            let previous = user.name();
            if let Some(applied) = user.rename(username) {
                tracing::info!("User '{}' renamed from '{}' to '{}'", user.id(), previous, applied);
            }
        }

        if let Some(error) = message.reported_error() {
            tracing::warn!("User '{}' reported an error: {}", user.id(), error);
        }

        if let Some(text) = message.chat_text() {
            let report = self.relay(text, user).await;
            tracing::debug!(
                "Relayed message from '{}' to {} user(s)",
                user,
                report.delivered()
            );
            log_delivery_failures(&format!("room '{}'", self.id), &report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use crate::domain::transport::testing::{ChannelSource, RecordingSink};

    struct Participant {
        user: Arc<User>,
        sink: RecordingSink,
        inbound: mpsc::UnboundedSender<String>,
        read_loop: JoinHandle<()>,
    }

    async fn join(room: &Arc<Room>) -> Participant {
        let sink = RecordingSink::new();
        let (inbound, source) = ChannelSource::pair();
        let (user, read_loop) = room.accept_connection(sink.boxed(), source).await;
        Participant {
            user,
            sink,
            inbound,
            read_loop,
        }
    }

    /// 条件が満たされるまで待つ（読み取りループは別タスクで動くため）
    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met within 1s");
    }

    #[tokio::test]
    async fn test_chat_text_is_relayed_to_everyone_but_sender() {
        // テスト項目: C の発言が A と B にちょうど 1 回ずつ届き、C には届かない
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;
        let c = join(&room).await;

        // when (操作):
        c.inbound
            .send(r#"{"content":{"text":"hi"}}"#.to_string())
            .unwrap();

        // then (期待する結果):
        wait_until(|| a.sink.frames().len() == 1 && b.sink.frames().len() == 1).await;
        assert_eq!(a.sink.frames(), vec!["hi".to_string()]);
        assert_eq!(b.sink.frames(), vec!["hi".to_string()]);
        assert!(c.sink.frames().is_empty());
    }

    #[tokio::test]
    async fn test_every_message_in_frame_is_relayed_in_order() {
        // テスト項目: 1 フレーム内の複数メッセージが順番通りに中継され、空の本文は中継されない
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作):
        b.inbound
            .send(
                r#"{"content":{"text":"one"}} {"content":{"text":""}} {"content":{"text":"two"}}"#
                    .to_string(),
            )
            .unwrap();

        // then (期待する結果):
        wait_until(|| a.sink.frames().len() == 2).await;
        assert_eq!(a.sink.frames(), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_stop_read_loop() {
        // テスト項目: 不正な JSON を受信しても読み取りループは継続する
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作):
        b.inbound.send("{not json".to_string()).unwrap();
        b.inbound
            .send(r#"{"content":{"text":"still here"}}"#.to_string())
            .unwrap();

        // then (期待する結果):
        wait_until(|| a.sink.frames().len() == 1).await;
        assert_eq!(a.sink.frames(), vec!["still here".to_string()]);
        assert!(!b.read_loop.is_finished());
    }

    #[tokio::test]
    async fn test_create_renames_user() {
        // テスト項目: create メッセージで User の表示名が変更される
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        assert_eq!(a.user.name(), "guest-1");

        // when (操作):
        a.inbound
            .send(r#"{"create":{"username":"  alice "}}"#.to_string())
            .unwrap();

        // then (期待する結果):
        wait_until(|| a.user.name() == "alice").await;
    }

    #[tokio::test]
    async fn test_read_error_closes_connection_and_frees_slot() {
        // テスト項目: 読み取りエラーで接続が閉じられ、次の参加者がスロットを再利用する
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作): 受信側のチャネルを閉じて読み取りエラーを発生させる
        drop(a.inbound);
        a.read_loop.await.unwrap();
        let d = join(&room).await;

        // then (期待する結果):
        assert!(!a.user.connection().is_open());
        assert_eq!(a.sink.close_count(), 1);
        assert_eq!(room.user_count().await, 2);
        let users = room.users().await;
        assert!(Arc::ptr_eq(&users[0], &d.user));
        assert!(Arc::ptr_eq(&users[1], &b.user));
    }

    #[tokio::test]
    async fn test_removed_user_frames_are_not_relayed() {
        // テスト項目: 退室させた User から届いたフレームは中継されず、読み取りループが終了する
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;
        room.remove_user(&b.user).await.unwrap();

        // when (操作): 相手側はまだソケットを閉じていない
        let _ = b
            .inbound
            .send(r#"{"content":{"text":"ghost"}}"#.to_string());

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), b.read_loop)
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(a.sink.frames().is_empty());
    }

    #[tokio::test]
    async fn test_close_all_connections_stops_every_read_loop() {
        // テスト項目: close_all_connections 後は全ての読み取りループが終了する
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作):
        room.close_all_connections().await;

        // then (期待する結果):
        for read_loop in [a.read_loop, b.read_loop] {
            tokio::time::timeout(Duration::from_secs(1), read_loop)
                .await
                .unwrap()
                .unwrap();
        }
        drop((a.inbound, b.inbound));
    }

    #[tokio::test]
    async fn test_display_names_stay_unique_after_churn() {
        // テスト項目: 退室があっても表示名は重複しない
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        room.remove_user(&a.user).await.unwrap();

        // when (操作):
        let b = join(&room).await;

        // then (期待する結果):
        assert_ne!(a.user.name(), b.user.name());
        assert_eq!(b.user.name(), "guest-2");
    }

    #[tokio::test]
    async fn test_remove_unknown_user_returns_not_found() {
        // テスト項目: 未登録の User の削除は not found を返す
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let other_room = Arc::new(Room::new("2"));
        let outsider = join(&other_room).await;

        // when (操作):
        let result = room.remove_user(&outsider.user).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::UserNotFound(outsider.user.id())));
        assert!(outsider.user.connection().is_open());
    }

    #[tokio::test]
    async fn test_close_all_connections() {
        // テスト項目: close_all_connections で全ての User の接続が閉じられる
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作):
        room.close_all_connections().await;

        // then (期待する結果):
        assert_eq!(room.active_user_count().await, 0);
        assert_eq!(a.sink.close_count(), 1);
        assert_eq!(b.sink.close_count(), 1);
    }

    #[tokio::test]
    async fn test_send_all_reaches_every_user() {
        // テスト項目: send_all は送信者を除外せず全ての User に届く
        // given (前提条件):
        let room = Arc::new(Room::new("1"));
        let a = join(&room).await;
        let b = join(&room).await;

        // when (操作):
        let report = room.send_all("notice").await;

        // then (期待する結果):
        assert_eq!(report.recipients, 2);
        assert_eq!(a.sink.frames(), vec!["notice".to_string()]);
        assert_eq!(b.sink.frames(), vec!["notice".to_string()]);
    }
}
