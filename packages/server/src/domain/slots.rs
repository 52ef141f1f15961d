//! スロット再利用型のアリーナ
//!
//! ## 責務
//!
//! - 登録順のスロット列を保持する（物理的に短くなることはない）
//! - 非アクティブになったスロットのインデックスを空きスロット集合で管理する
//! - 新しい要素の登録時に、最も小さい空きスロットを上書きして再利用する
//!
//! ## 設計ノート
//!
//! 空きスロットの検出は走査ではなく通知で行います。登録時に各要素へ
//! [`VacancyNotice`] を渡し、要素は自身が非アクティブになった瞬間に
//! そのインデックスを空きスロット集合へ投函します。
//!
//! 投函後に要素が再びアクティブになる可能性があるため、再利用時には
//! スロットが本当に非アクティブかを確認し、古い通知は読み捨てます。

use std::{
    collections::BTreeSet,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;

type VacancySet = Mutex<BTreeSet<usize>>;

/// アリーナに格納できる要素
pub trait Occupant: Send + Sync {
    /// 要素がスロットを占有し続けているか（ロックを取らずに判定できること）
    fn is_active(&self) -> bool;

    /// 非アクティブ化の際に投函する通知を受け取る
    fn on_vacate(&self, notice: VacancyNotice);
}

/// 特定のスロットが空いたことをアリーナへ伝える通知
///
/// アリーナが破棄された後の投函は何もしない。
#[derive(Debug, Clone)]
pub struct VacancyNotice {
    vacancies: Weak<VacancySet>,
    index: usize,
}

impl VacancyNotice {
    /// 通知対象のスロットインデックス
    pub fn index(&self) -> usize {
        self.index
    }

    /// スロットを空きとして登録する
    pub fn post(&self) {
        if let Some(vacancies) = self.vacancies.upgrade() {
            vacancies.lock().insert(self.index);
        }
    }
}

/// スロット再利用型のアリーナ
///
/// 外部から排他制御されることを前提とする（登録と削除は `&mut self`）。
pub struct SlotArena<T> {
    slots: Vec<Arc<T>>,
    vacancies: Arc<VacancySet>,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            vacancies: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }
}

impl<T: Occupant> SlotArena<T> {
    /// 空のアリーナを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 要素を登録し、格納したスロットのインデックスを返す
    ///
    /// 空きスロットがあれば最も小さいインデックスを再利用し、なければ末尾に追加する。
    pub fn insert(&mut self, occupant: Arc<T>) -> usize {
        let index = self.take_vacancy().unwrap_or(self.slots.len());
        if index == self.slots.len() {
            self.slots.push(occupant.clone());
        } else {
            self.slots[index] = occupant.clone();
        }

        occupant.on_vacate(VacancyNotice {
            vacancies: Arc::downgrade(&self.vacancies),
            index,
        });
        // 通知を渡す前に非アクティブになっていた場合の取りこぼしを防ぐ
        if !occupant.is_active() {
            self.vacancies.lock().insert(index);
        }

        index
    }

    /// 実際に非アクティブなスロットが見つかるまで空きスロット集合を取り出す
    fn take_vacancy(&mut self) -> Option<usize> {
        loop {
            let candidate = self.vacancies.lock().pop_first()?;
            match self.slots.get(candidate) {
                Some(slot) if !slot.is_active() => return Some(candidate),
                // 再アクティブ化された要素の古い通知
                _ => continue,
            }
        }
    }

    /// 参照の同一性で要素を検索する
    pub fn position(&self, target: &Arc<T>) -> Option<usize> {
        self.slots.iter().position(|slot| Arc::ptr_eq(slot, target))
    }

    /// 指定スロットの要素を取得
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.slots.get(index)
    }

    /// 全スロットのスナップショット（非アクティブな要素も含む）
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.slots.clone()
    }

    /// スロット数（非アクティブな要素も含む）
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// アクティブな要素の数
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }
}
