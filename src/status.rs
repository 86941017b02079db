//! アドレス空間の状態を外部に公開するための読み取り専用ビュー.
use std::fmt;
use std::slice;

use crate::block::{Block, Extent, ProcessId};
use crate::space::AddressSpace;

/// 空きブロックのラベルとして表示される文字列.
pub const FREE_LABEL: &str = "FREE";

/// アドレス空間の読み取り専用ビュー.
///
/// ビューはアドレス空間を不変参照として借用しているため、
/// ビューが生存している間は、アドレス空間が変更されることはない.
///
/// `Display`実装は、以下の形式のレポートを出力する:
///
/// ```text
/// Total available space: 60
/// Addresses [0 : 39] -> Process: P1
/// Addresses [40 : 99] -> Process: FREE
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StatusView<'a> {
    space: &'a AddressSpace,
}
impl<'a> StatusView<'a> {
    /// 新しい`StatusView`インスタンスを生成する.
    pub fn new(space: &'a AddressSpace) -> Self {
        StatusView { space }
    }

    /// アドレス空間の容量を返す.
    pub fn capacity(&self) -> u64 {
        self.space.capacity()
    }

    /// 空き容量の合計を返す.
    pub fn total_free(&self) -> u64 {
        self.space.total_free()
    }

    /// 全ブロックの情報を、アドレスの昇順に走査するためのイテレータを返す.
    ///
    /// 何度呼び出しても、毎回先頭から走査し直すことができる.
    pub fn entries(&self) -> StatusEntries<'a> {
        StatusEntries(self.space.blocks().iter())
    }
}
impl<'a> IntoIterator for StatusView<'a> {
    type Item = StatusEntry<'a>;
    type IntoIter = StatusEntries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
impl<'a> fmt::Display for StatusView<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Total available space: {}", self.total_free())?;
        for entry in self.entries() {
            writeln!(f, "Addresses {} -> Process: {}", entry.extent, entry.label)?;
        }
        Ok(())
    }
}

/// 一つのブロックの状態.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry<'a> {
    /// ブロックのアドレス範囲.
    pub extent: Extent,

    /// ブロックの占有者.
    pub label: OccupantLabel<'a>,
}
impl<'a> From<&'a Block> for StatusEntry<'a> {
    fn from(f: &'a Block) -> Self {
        let label = match f.occupant().process_id() {
            None => OccupantLabel::Free,
            Some(id) => OccupantLabel::Process(id),
        };
        StatusEntry {
            extent: f.extent(),
            label,
        }
    }
}

/// ブロックの占有者を表すラベル.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupantLabel<'a> {
    /// 空きブロック.
    Free,

    /// プロセスが所有しているブロック.
    Process(&'a ProcessId),
}
impl<'a> fmt::Display for OccupantLabel<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            OccupantLabel::Free => f.write_str(FREE_LABEL),
            OccupantLabel::Process(id) => write!(f, "{}", id),
        }
    }
}

/// ブロックの状態を、アドレスの昇順に走査するためのイテレータ.
#[derive(Debug, Clone)]
pub struct StatusEntries<'a>(slice::Iter<'a, Block>);
impl<'a> Iterator for StatusEntries<'a> {
    type Item = StatusEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(StatusEntry::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a> ExactSizeIterator for StatusEntries<'a> {}
