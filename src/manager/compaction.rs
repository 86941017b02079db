//! コンパクション(デフラグ).
use crate::block::Block;
use crate::space::AddressSpace;

/// コンパクションの結果.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compaction {
    /// 位置が変わった割当済みブロックの数.
    pub relocated_blocks: usize,

    /// コンパクション後の末尾の空きブロックのサイズ.
    ///
    /// アドレス空間が全て割当済みの場合には`0`となる (この場合、空きブロックは存在しない).
    pub free_size: u64,
}

/// 全ての割当済みブロックを元の順序のままアドレス`0`から隙間なく詰め直し、
/// 残りの領域を一つの空きブロックにまとめる.
///
/// ブロック列は常に一から再構築されるので、何度実行しても結果は変わらない.
pub(crate) fn compact(space: &mut AddressSpace) -> Compaction {
    let capacity = space.capacity();
    let old_blocks = space.take_blocks();

    let mut blocks = Vec::with_capacity(old_blocks.len());
    let mut next_start = 0;
    let mut relocated_blocks = 0;
    for block in old_blocks.into_iter().filter(|b| !b.is_free()) {
        if block.start() != next_start {
            relocated_blocks += 1;
        }
        let start = next_start;
        next_start += block.size();
        blocks.push(Block { start, ..block });
    }

    let free_size = capacity - next_start;
    if free_size > 0 {
        blocks.push(Block::free(next_start, free_size));
    }
    space.replace_blocks(blocks);
    Compaction {
        relocated_blocks,
        free_size,
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;
    use crate::block::ProcessId;
    use crate::manager::{placement, reclaim};
    use crate::strategy::PlacementStrategy;
    use crate::Result;

    fn id(id: &str) -> ProcessId {
        ProcessId::new(id).expect("Never fails")
    }

    fn allocate(space: &mut AddressSpace, name: &str, size: u64) -> Result<()> {
        track!(placement::allocate(space, &id(name), size, PlacementStrategy::FirstFit))?;
        Ok(())
    }

    #[test]
    fn it_works() -> TestResult {
        let mut space = track!(AddressSpace::new(100))?;
        track!(allocate(&mut space, "A", 10))?;
        track!(allocate(&mut space, "B", 20))?;
        track!(allocate(&mut space, "C", 30))?;
        track!(reclaim::release(&mut space, &id("A")))?;
        track!(reclaim::release(&mut space, &id("C")))?;
        track!(allocate(&mut space, "D", 5))?;
        // D[0,4] FREE[5,9] B[10,29] FREE[30,99]

        let result = compact(&mut space);
        assert_eq!(
            result,
            Compaction {
                relocated_blocks: 1,
                free_size: 75
            }
        );
        assert_eq!(
            space.blocks(),
            &[
                Block::owned(id("D"), 0, 5),
                Block::owned(id("B"), 5, 20),
                Block::free(25, 75),
            ][..]
        );
        track!(space.check_invariants())?;
        Ok(())
    }

    #[test]
    fn compaction_is_idempotent() -> TestResult {
        let mut space = track!(AddressSpace::new(100))?;
        for (name, size) in &[("A", 10), ("B", 20), ("C", 30), ("D", 5)] {
            track!(allocate(&mut space, name, *size))?;
        }
        track!(reclaim::release(&mut space, &id("B")))?;

        compact(&mut space);
        let once = space.clone();
        let result = compact(&mut space);
        assert_eq!(space, once);
        assert_eq!(result.relocated_blocks, 0);
        assert_eq!(result.free_size, 55);
        Ok(())
    }

    #[test]
    fn fully_occupied_space_has_no_free_block() -> TestResult {
        let mut space = track!(AddressSpace::new(30))?;
        track!(allocate(&mut space, "A", 10))?;
        track!(allocate(&mut space, "B", 20))?;

        let result = compact(&mut space);
        assert_eq!(result.free_size, 0);
        assert_eq!(
            space.blocks(),
            &[Block::owned(id("A"), 0, 10), Block::owned(id("B"), 10, 20)][..]
        );
        track!(space.check_invariants())?;
        Ok(())
    }

    #[test]
    fn empty_space_stays_single_free_block() -> TestResult {
        let mut space = track!(AddressSpace::new(30))?;
        let result = compact(&mut space);
        assert_eq!(result.relocated_blocks, 0);
        assert_eq!(space.blocks(), &[Block::free(0, 30)][..]);
        Ok(())
    }

    #[test]
    fn relative_order_is_preserved() -> TestResult {
        let mut space = track!(AddressSpace::new(100))?;
        for (name, size) in &[("A", 10), ("B", 10), ("C", 10), ("D", 10), ("E", 10)] {
            track!(allocate(&mut space, name, *size))?;
        }
        for name in &["A", "C", "E"] {
            track!(reclaim::release(&mut space, &id(name)))?;
        }
        // FREE[0,9] B[10,19] FREE[20,29] D[30,39] FREE[40,99]
        track!(allocate(&mut space, "F", 50))?;
        // FREE[0,9] B[10,19] FREE[20,29] D[30,39] F[40,89] FREE[90,99]

        let result = compact(&mut space);
        assert_eq!(result.relocated_blocks, 3);
        let owners = space
            .blocks()
            .iter()
            .filter_map(|b| b.occupant().process_id().map(|id| (id.as_str(), b.start())))
            .collect::<Vec<_>>();
        assert_eq!(owners, vec![("B", 0), ("D", 10), ("F", 20)]);
        assert_eq!(space.total_free(), 30);
        Ok(())
    }
}
