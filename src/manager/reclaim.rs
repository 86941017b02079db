//! 割当済みブロックの解放.
use crate::block::{Block, ProcessId};
use crate::space::AddressSpace;
use crate::{ErrorKind, Result};

/// `id`が所有するブロックを空きブロックに戻し、隣接する空きブロックとまとめる.
///
/// 解放されたブロック(解放前の状態)を返す.
pub(crate) fn release(space: &mut AddressSpace, id: &ProcessId) -> Result<Block> {
    let index = track_assert_some!(
        space.find_owned(id),
        ErrorKind::ProcessNotFound,
        "Process {} not found",
        id
    );
    let released = track!(space.vacate(index))?;
    space.merge_adjacent_free();
    Ok(released)
}
