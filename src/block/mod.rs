//! アドレス空間を構成するブロック(連続領域)関連のデータ構造群.
//!
//! "ブロック"は、アドレス空間内の連続した領域であり、
//! 各ブロックは「空き」であるか、または「一つのプロセスによって所有されている」かのいずれかとなる.
use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorKind, Result};

/// ブロックを所有するプロセスの識別子.
///
/// 任意の空ではない文字列を識別子として使用可能.
/// 文字列の構文(e.g., 英数字のみ)に関する制約は課さない.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(String);
impl ProcessId {
    /// 新しい`ProcessId`インスタンスを生成する.
    ///
    /// # Errors
    ///
    /// `id`が空文字列の場合には、種類が`ErrorKind::InvalidInput`のエラーが返される.
    ///
    /// # Examples
    ///
    /// ```
    /// use contalloc::ErrorKind;
    /// use contalloc::block::ProcessId;
    ///
    /// assert_eq!(ProcessId::new("P1").ok().map(|id| id.to_string()), Some("P1".to_owned()));
    /// assert_eq!(ProcessId::new("").err().map(|e| *e.kind()), Some(ErrorKind::InvalidInput));
    /// ```
    #[allow(clippy::new_ret_no_self)]
    pub fn new(id: &str) -> Result<Self> {
        track_assert!(!id.is_empty(), ErrorKind::InvalidInput, "Empty process ID");
        Ok(ProcessId(id.to_owned()))
    }

    /// 識別子の文字列表現を返す.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for ProcessId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        track!(ProcessId::new(s))
    }
}
impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ブロックの占有状態.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// 空きブロック.
    Free,

    /// 指定されたプロセスによって所有されているブロック.
    Owned(ProcessId),
}
impl Occupant {
    /// 空きブロックかどうかを判定する.
    pub fn is_free(&self) -> bool {
        *self == Occupant::Free
    }

    /// ブロックの所有者を返す.
    ///
    /// 空きブロックの場合には`None`が返される.
    pub fn process_id(&self) -> Option<&ProcessId> {
        match *self {
            Occupant::Free => None,
            Occupant::Owned(ref id) => Some(id),
        }
    }
}

/// アドレス空間内の連続した一つの領域.
///
/// ブロックは`[start(), end()]`の範囲のアドレスを占有する.
/// `end()`は終端を**含む**アドレスであることに注意 (i.e., `end() == start() + size() - 1`).
///
/// `Block`インスタンスは[AddressSpace]によって排他的に所有されており、
/// 利用者が直接生成や変更を行うことはできない.
///
/// [AddressSpace]: ../space/struct.AddressSpace.html
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub(crate) occupant: Occupant,
    pub(crate) start: u64,
    pub(crate) size: u64,
}
impl Block {
    pub(crate) fn free(start: u64, size: u64) -> Self {
        debug_assert!(size > 0);
        Block {
            occupant: Occupant::Free,
            start,
            size,
        }
    }

    pub(crate) fn owned(id: ProcessId, start: u64, size: u64) -> Self {
        debug_assert!(size > 0);
        Block {
            occupant: Occupant::Owned(id),
            start,
            size,
        }
    }

    /// ブロックの占有状態を返す.
    pub fn occupant(&self) -> &Occupant {
        &self.occupant
    }

    /// 空きブロックかどうかを判定する.
    pub fn is_free(&self) -> bool {
        self.occupant.is_free()
    }

    /// ブロックの開始アドレスを返す.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// ブロックのサイズを返す.
    ///
    /// この値は常に`1`以上.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// ブロックの終端アドレス(終端を含む)を返す.
    pub fn end(&self) -> u64 {
        self.start + self.size - 1
    }

    /// ブロックの次のブロックが開始するアドレスを返す.
    pub(crate) fn next_start(&self) -> u64 {
        self.start + self.size
    }

    /// ブロックが占有しているアドレス範囲を返す.
    pub fn extent(&self) -> Extent {
        Extent {
            start: self.start,
            end: self.end(),
        }
    }
}

/// 両端を含むアドレス範囲.
///
/// 割当結果の通知や、状態表示の際に使用される.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Extent {
    /// 開始アドレス.
    pub start: u64,

    /// 終端アドレス (この位置も範囲に含まれる).
    pub end: u64,
}
#[allow(clippy::len_without_is_empty)]
impl Extent {
    /// 範囲に含まれるアドレスの数を返す.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}
impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} : {}]", self.start, self.end)
    }
}
