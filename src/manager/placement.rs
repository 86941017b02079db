//! 配置戦略に基づくブロックの割当.
use crate::block::{Extent, ProcessId};
use crate::space::AddressSpace;
use crate::strategy::PlacementStrategy;
use crate::{ErrorKind, Result};

/// `strategy`に従って、`size`分の割当に使用する空きブロックの位置を選択する.
///
/// 候補が存在しない場合には`None`が返される.
///
/// Best-Fit及びWorst-Fitでは、まず一回目の走査で目標とするサイズを決定し、
/// 二回目の走査でそのサイズを持つ最初のブロックを探す.
/// これにより、同じサイズの候補が複数ある場合には、常に先頭アドレスが最も小さいものが選ばれる.
pub(crate) fn select_block(
    space: &AddressSpace,
    size: u64,
    strategy: PlacementStrategy,
) -> Option<usize> {
    let candidates = || space.free_blocks().filter(move |(_, b)| b.size() >= size);
    let target_size = match strategy {
        PlacementStrategy::FirstFit => return candidates().next().map(|(i, _)| i),
        PlacementStrategy::BestFit => candidates().map(|(_, b)| b.size()).min()?,
        PlacementStrategy::WorstFit => candidates().map(|(_, b)| b.size()).max()?,
    };
    candidates()
        .find(|(_, b)| b.size() == target_size)
        .map(|(i, _)| i)
}

/// `id`のために`size`分のブロックを割り当てる.
///
/// 選択された空きブロックが要求サイズよりも大きい場合には、
/// 余剰分は後続の空きブロックとして切り出される.
///
/// エラーの検査は全て状態の変更前に行われるので、
/// 失敗時(`InconsistentState`を除く)にはアドレス空間は変更されない.
pub(crate) fn allocate(
    space: &mut AddressSpace,
    id: &ProcessId,
    size: u64,
    strategy: PlacementStrategy,
) -> Result<Extent> {
    track_assert!(size > 0, ErrorKind::InvalidInput, "Zero-sized request: {}", id);
    track_assert!(
        space.find_owned(id).is_none(),
        ErrorKind::DuplicateProcess,
        "Process {} already owns a block",
        id
    );
    let index = track_assert_some!(
        select_block(space, size, strategy),
        ErrorKind::InsufficientSpace,
        "No free block can hold {} bytes (total_free={}, largest_free={})",
        size,
        space.total_free(),
        space.largest_free()
    );

    if space.blocks()[index].size() > size {
        track!(space.split_at(index, size))?;
    }
    let block = track!(space.occupy(index, id.clone()))?;
    Ok(block.extent())
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;
    use crate::block::Block;

    fn id(id: &str) -> ProcessId {
        ProcessId::new(id).expect("Never fails")
    }

    /// `sizes`の各要素を先頭から順に割り当てた後、偶数番目のブロックを解放した状態を作る.
    ///
    /// 結果として、奇数番目の割当済みブロックを挟んで、`sizes`の偶数番目の大きさの空きブロックが並ぶ.
    fn fragmented(capacity: u64, sizes: &[u64]) -> Result<AddressSpace> {
        let mut space = track!(AddressSpace::new(capacity))?;
        for (i, &size) in sizes.iter().enumerate() {
            track!(allocate(&mut space, &id(&i.to_string()), size, PlacementStrategy::FirstFit))?;
        }
        for i in (0..sizes.len()).step_by(2) {
            let index = track_assert_some!(space.find_owned(&id(&i.to_string())), ErrorKind::Other);
            track!(space.vacate(index))?;
        }
        space.merge_adjacent_free();
        track!(space.check_invariants())?;
        Ok(space)
    }

    #[test]
    fn first_fit() -> TestResult {
        let mut space = track!(AddressSpace::new(100))?;
        let extent = track!(allocate(&mut space, &id("P1"), 40, PlacementStrategy::FirstFit))?;
        assert_eq!(extent, Extent { start: 0, end: 39 });
        assert_eq!(
            space.blocks(),
            &[Block::owned(id("P1"), 0, 40), Block::free(40, 60)][..]
        );
        assert_eq!(space.total_free(), 60);
        Ok(())
    }

    #[test]
    fn exact_fit_does_not_split() -> TestResult {
        let mut space = track!(AddressSpace::new(100))?;
        track!(allocate(&mut space, &id("P1"), 100, PlacementStrategy::BestFit))?;
        assert_eq!(space.blocks(), &[Block::owned(id("P1"), 0, 100)][..]);
        assert_eq!(space.total_free(), 0);
        track!(space.check_invariants())?;
        Ok(())
    }

    #[test]
    fn strategies_pick_expected_blocks() -> TestResult {
        // FREE[0,29] 1[30,39] FREE[40,49] 3[50,59] FREE[60,79] 5[80,89] FREE[90,99]
        let space = track!(fragmented(100, &[30, 10, 10, 10, 20, 10, 10]))?;
        let sizes = space
            .free_blocks()
            .map(|(_, b)| (b.start(), b.size()))
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![(0, 30), (40, 10), (60, 20), (90, 10)]);

        let start_of = |strategy, size| {
            select_block(&space, size, strategy).map(|i| space.blocks()[i].start())
        };
        assert_eq!(start_of(PlacementStrategy::FirstFit, 5), Some(0));
        assert_eq!(start_of(PlacementStrategy::FirstFit, 25), Some(0));
        assert_eq!(start_of(PlacementStrategy::FirstFit, 31), None);

        // 同じサイズの候補が複数ある場合は先頭アドレスが小さい方
        assert_eq!(start_of(PlacementStrategy::BestFit, 5), Some(40));
        assert_eq!(start_of(PlacementStrategy::BestFit, 11), Some(60));
        assert_eq!(start_of(PlacementStrategy::BestFit, 21), Some(0));

        assert_eq!(start_of(PlacementStrategy::WorstFit, 5), Some(0));
        assert_eq!(start_of(PlacementStrategy::WorstFit, 30), Some(0));
        assert_eq!(start_of(PlacementStrategy::WorstFit, 31), None);
        Ok(())
    }

    #[test]
    fn worst_fit_ties_prefer_lowest_address() -> TestResult {
        // FREE[0,19] 1[20,29] FREE[30,49] 3[50,59] FREE[60,69] 5[70,99]
        let space = track!(fragmented(100, &[20, 10, 20, 10, 10, 30]))?;
        let index = track_assert_some!(
            select_block(&space, 15, PlacementStrategy::WorstFit),
            ErrorKind::Other
        );
        assert_eq!(space.blocks()[index].start(), 0);

        let index = track_assert_some!(
            select_block(&space, 15, PlacementStrategy::BestFit),
            ErrorKind::Other
        );
        assert_eq!(space.blocks()[index].start(), 0);
        Ok(())
    }

    #[test]
    fn selection_is_deterministic() -> TestResult {
        let space = track!(fragmented(100, &[30, 10, 10, 10, 20, 10, 10]))?;
        for &strategy in &PlacementStrategy::ALL {
            for size in 1..=30 {
                let first = select_block(&space, size, strategy);
                assert_eq!(select_block(&space.clone(), size, strategy), first);
            }
        }
        Ok(())
    }

    #[test]
    fn failures_do_not_modify_space() -> TestResult {
        let mut space = track!(fragmented(100, &[30, 10, 10, 10, 20, 10, 10]))?;
        let before = space.clone();
        let kind = |r: Result<Extent>| r.err().map(|e| *e.kind());

        // 空き容量の合計(70)は足りているが、連続した領域が無い
        assert_eq!(
            kind(allocate(&mut space, &id("X"), 31, PlacementStrategy::WorstFit)),
            Some(ErrorKind::InsufficientSpace)
        );
        assert_eq!(
            kind(allocate(&mut space, &id("1"), 1, PlacementStrategy::FirstFit)),
            Some(ErrorKind::DuplicateProcess)
        );
        assert_eq!(
            kind(allocate(&mut space, &id("X"), 0, PlacementStrategy::FirstFit)),
            Some(ErrorKind::InvalidInput)
        );
        assert_eq!(space, before);
        Ok(())
    }
}
