//! ブロック列によって分割されたアドレス空間.
//!
//! このモジュール自体は、配置戦略やコンパクション等の判断は行わず、
//! ブロック列に対する基本操作(分割・結合・置換)と不変条件の検査のみを担当する.
//!
//! # 不変条件
//!
//! 全ての公開操作の前後で、以下が成り立つ:
//!
//! 1. ブロック列は空ではなく、先頭ブロックはアドレス`0`から始まり、末尾ブロックは`capacity - 1`で終わる
//! 2. 隣接するブロック同士は隙間なく連続しており、重なりもない
//! 3. 空きブロック同士が隣接することはない
//! 4. 同じプロセスIDを所有者とするブロックは高々一つ
use std::collections::HashSet;
use std::mem;

use crate::block::{Block, Occupant, ProcessId};
use crate::{ErrorKind, Result};

/// 固定長のアドレス空間.
///
/// `[0, capacity)`の範囲全体を、アドレスの昇順に並んだブロック列で隙間なく覆っている.
///
/// 空き容量の合計は、カウンタとして別管理はせず、常にブロック列から再計算される.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    capacity: u64,
    blocks: Vec<Block>,
}
impl AddressSpace {
    /// 指定容量のアドレス空間を生成する.
    ///
    /// 生成直後は、全体を覆う一つの空きブロックのみを保持している.
    ///
    /// # Errors
    ///
    /// `capacity`が`0`の場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
    ///
    /// # Examples
    ///
    /// ```
    /// use contalloc::ErrorKind;
    /// use contalloc::space::AddressSpace;
    ///
    /// let space = AddressSpace::new(100).unwrap();
    /// assert_eq!(space.total_free(), 100);
    /// assert_eq!(space.blocks().len(), 1);
    /// assert_eq!(space.blocks()[0].end(), 99);
    ///
    /// assert_eq!(AddressSpace::new(0).err().map(|e| *e.kind()), Some(ErrorKind::InvalidCapacity));
    /// ```
    pub fn new(capacity: u64) -> Result<Self> {
        track_assert!(capacity > 0, ErrorKind::InvalidCapacity; capacity);
        Ok(AddressSpace {
            capacity,
            blocks: vec![Block::free(0, capacity)],
        })
    }

    /// アドレス空間の容量を返す.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// 空きブロックのサイズの合計を返す.
    pub fn total_free(&self) -> u64 {
        self.free_blocks().map(|(_, b)| b.size()).sum()
    }

    /// 割当済みブロックのサイズの合計を返す.
    pub fn total_used(&self) -> u64 {
        self.capacity - self.total_free()
    }

    /// アドレスの昇順に並んだブロック列を返す.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// 指定されたプロセスが所有するブロックの位置を返す.
    pub fn find_owned(&self, id: &ProcessId) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.occupant().process_id() == Some(id))
    }

    /// 空きブロック群を、位置と共にアドレスの昇順で返す.
    pub fn free_blocks(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.blocks.iter().enumerate().filter(|(_, b)| b.is_free())
    }

    /// 最大の空きブロックのサイズを返す.
    ///
    /// 空きブロックが存在しない場合には`0`が返される.
    pub fn largest_free(&self) -> u64 {
        self.free_blocks().map(|(_, b)| b.size()).max().unwrap_or(0)
    }

    /// `index`位置の空きブロックを、先頭の`first_size`分と残りの二つの空きブロックに分割する.
    ///
    /// 分割後の先頭ブロックは`index`位置に、残りは`index + 1`位置に置かれる.
    /// 一時的に空きブロック同士が隣接することになるので、呼び出し側は
    /// 先頭ブロックの占有状態を変更する必要がある.
    ///
    /// # 事前条件
    ///
    /// - `index`位置のブロックは空きブロックである
    /// - `0 < first_size < 対象ブロックのサイズ`
    ///
    /// 事前条件を満たさない場合には、種類が`ErrorKind::InconsistentState`のエラーが返される.
    pub(crate) fn split_at(&mut self, index: usize, first_size: u64) -> Result<()> {
        let (start, size) = {
            let block = track_assert_some!(self.blocks.get(index), ErrorKind::InconsistentState; index);
            track_assert!(block.is_free(), ErrorKind::InconsistentState; index, block);
            (block.start(), block.size())
        };
        track_assert!(first_size > 0, ErrorKind::InconsistentState; index, first_size);
        track_assert!(first_size < size, ErrorKind::InconsistentState; index, first_size, size);

        let leftover = Block::free(start + first_size, size - first_size);
        self.blocks[index].size = first_size;
        self.blocks.insert(index + 1, leftover);
        Ok(())
    }

    /// `index`位置の空きブロックを、指定プロセスの所有に変更する.
    pub(crate) fn occupy(&mut self, index: usize, id: ProcessId) -> Result<&Block> {
        let block = track_assert_some!(self.blocks.get_mut(index), ErrorKind::InconsistentState; index);
        track_assert!(block.is_free(), ErrorKind::InconsistentState; index, block);
        block.occupant = Occupant::Owned(id);
        Ok(&*block)
    }

    /// `index`位置の割当済みブロックを空きブロックに戻す.
    ///
    /// 結果として空きブロック同士が隣接する可能性があるので、
    /// 呼び出し側は`merge_adjacent_free()`を呼び出す必要がある.
    pub(crate) fn vacate(&mut self, index: usize) -> Result<Block> {
        let block = track_assert_some!(self.blocks.get_mut(index), ErrorKind::InconsistentState; index);
        track_assert!(!block.is_free(), ErrorKind::InconsistentState; index, block);
        let vacated = block.clone();
        block.occupant = Occupant::Free;
        Ok(vacated)
    }

    /// 隣接する空きブロック群を一つにまとめる.
    ///
    /// 結合されて消えたブロックの数を返す.
    pub(crate) fn merge_adjacent_free(&mut self) -> usize {
        let before = self.blocks.len();
        self.blocks.dedup_by(|next, prev| {
            if prev.is_free() && next.is_free() {
                prev.size += next.size;
                true
            } else {
                false
            }
        });
        before - self.blocks.len()
    }

    /// 現在のブロック列を取り出す.
    ///
    /// 取り出した後は、`replace_blocks()`で新しいブロック列を設定するまで、
    /// アドレス空間は不変条件を満たさない.
    pub(crate) fn take_blocks(&mut self) -> Vec<Block> {
        mem::replace(&mut self.blocks, Vec::new())
    }

    /// ブロック列全体を置き換える.
    pub(crate) fn replace_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }

    /// 不変条件が満たされているかどうかを検査する.
    ///
    /// 違反が見つかった場合には、種類が`ErrorKind::InconsistentState`のエラーが返される.
    pub fn check_invariants(&self) -> Result<()> {
        let first = track_assert_some!(self.blocks.first(), ErrorKind::InconsistentState);
        track_assert_eq!(first.start(), 0, ErrorKind::InconsistentState);

        let mut ids = HashSet::new();
        let mut next_start = 0;
        let mut prev_is_free = false;
        for block in &self.blocks {
            track_assert!(block.size() > 0, ErrorKind::InconsistentState; block);
            track_assert_eq!(block.start(), next_start, ErrorKind::InconsistentState; block);
            track_assert!(
                !(prev_is_free && block.is_free()),
                ErrorKind::InconsistentState,
                "Adjacent free blocks: {:?}",
                block
            );
            if let Some(id) = block.occupant().process_id() {
                track_assert!(ids.insert(id), ErrorKind::InconsistentState, "Duplicate owner: {}", id);
            }
            next_start = block.next_start();
            prev_is_free = block.is_free();
        }
        track_assert_eq!(next_start, self.capacity, ErrorKind::InconsistentState);
        Ok(())
    }
}
