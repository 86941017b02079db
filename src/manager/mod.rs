//! アドレス空間の管理者.
//!
//! [MemoryManager]は、[AddressSpace]を一つ保持し、それに対する割当・解放・コンパクション・状態取得の
//! 各操作を提供する.
//!
//! 各操作は同期的に実行され、完了時には常にアドレス空間の不変条件が満たされている.
//! 状態を変更する操作は`&mut self`を要求するため、複数の操作が同時に進行することはない.
//!
//! [MemoryManager]: ./struct.MemoryManager.html
//! [AddressSpace]: ../space/struct.AddressSpace.html
use slog::Logger;

pub use self::builder::MemoryManagerBuilder;
pub use self::compaction::Compaction;

use crate::block::{Extent, ProcessId};
use crate::metrics::AllocatorMetrics;
use crate::space::AddressSpace;
use crate::status::StatusView;
use crate::strategy::PlacementStrategy;
use crate::{Error, ErrorKind, Result};

mod builder;
mod compaction;
mod placement;
mod reclaim;

/// 固定長アドレス空間の管理者.
///
/// # Examples
///
/// ```
/// use contalloc::ErrorKind;
/// use contalloc::block::ProcessId;
/// use contalloc::manager::MemoryManager;
///
/// let mut manager = MemoryManager::new(100).unwrap();
///
/// let extent = manager.request("P1", 40, "F").unwrap();
/// assert_eq!((extent.start, extent.end), (0, 39));
/// assert_eq!(manager.total_free(), 60);
///
/// let e = manager.request("P2", 70, "B").err().unwrap();
/// assert_eq!(*e.kind(), ErrorKind::InsufficientSpace);
///
/// manager.release(&"P1".parse::<ProcessId>().unwrap()).unwrap();
/// assert_eq!(manager.total_free(), 100);
/// ```
#[derive(Debug)]
pub struct MemoryManager {
    space: AddressSpace,
    metrics: AllocatorMetrics,
    logger: Logger,
    invariant_checks: bool,
}
impl MemoryManager {
    pub(crate) fn from_parts(
        space: AddressSpace,
        metrics: AllocatorMetrics,
        logger: Logger,
        invariant_checks: bool,
    ) -> Self {
        MemoryManager {
            space,
            metrics,
            logger,
            invariant_checks,
        }
    }

    /// デフォルト設定で、指定容量のアドレス空間を管理するインスタンスを生成する.
    ///
    /// # Errors
    ///
    /// `capacity`が`0`の場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
    pub fn new(capacity: u64) -> Result<Self> {
        track!(MemoryManagerBuilder::new().build(capacity))
    }

    /// 管理対象のアドレス空間を返す.
    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// アドレス空間の読み取り専用ビューを返す.
    pub fn status(&self) -> StatusView {
        StatusView::new(&self.space)
    }

    /// アドレス空間の容量を返す.
    pub fn capacity(&self) -> u64 {
        self.space.capacity()
    }

    /// 空き容量の合計を返す.
    pub fn total_free(&self) -> u64 {
        self.space.total_free()
    }

    /// メトリクスを返す.
    pub fn metrics(&self) -> &AllocatorMetrics {
        &self.metrics
    }

    /// `id`に対して、`size`分の連続領域を割り当てる.
    ///
    /// 割り当てられた領域のアドレス範囲(終端を含む)を返す.
    ///
    /// # Errors
    ///
    /// 以下の場合には、アドレス空間を一切変更せずにエラーを返す:
    ///
    /// - `ErrorKind::InvalidInput`: `size`が`0`
    /// - `ErrorKind::DuplicateProcess`: `id`が既にブロックを所有している
    /// - `ErrorKind::InsufficientSpace`: `size`以上の空きブロックが存在しない
    pub fn allocate(
        &mut self,
        id: ProcessId,
        size: u64,
        strategy: PlacementStrategy,
    ) -> Result<Extent> {
        match placement::allocate(&mut self.space, &id, size, strategy) {
            Err(e) => {
                self.observe_failure(&e, id.as_str(), size);
                Err(track!(e))
            }
            Ok(extent) => {
                self.metrics.count_allocation(strategy, size);
                debug!(self.logger, "Allocated";
                       "id" => id.as_str(), "start" => extent.start, "end" => extent.end,
                       "strategy" => strategy.name());
                track!(self.verify())?;
                Ok(extent)
            }
        }
    }

    /// 文字列で指定されたプロセスIDと配置戦略を用いて割当を行う.
    ///
    /// 検査は「プロセスIDの妥当性」「重複の有無」「配置戦略の妥当性」の順に行われ、
    /// その後に`allocate()`が呼び出される.
    ///
    /// # Errors
    ///
    /// `allocate()`のエラーに加えて、配置戦略が不正な場合には、
    /// 種類が`ErrorKind::InvalidStrategy`のエラーが返される.
    pub fn request(&mut self, id: &str, size: u64, strategy: &str) -> Result<Extent> {
        let parsed = {
            let space = &self.space;
            ProcessId::new(id).and_then(|id| {
                track_assert!(
                    space.find_owned(&id).is_none(),
                    ErrorKind::DuplicateProcess,
                    "Process {} already owns a block",
                    id
                );
                let strategy = track!(strategy.parse::<PlacementStrategy>())?;
                Ok((id, strategy))
            })
        };
        match parsed {
            Err(e) => {
                self.observe_failure(&e, id, size);
                Err(track!(e))
            }
            Ok((id, strategy)) => track!(self.allocate(id, size, strategy)),
        }
    }

    /// `id`が所有するブロックを解放する.
    ///
    /// 解放されたブロックのアドレス範囲を返す.
    /// 解放後の空きブロックは、隣接する空きブロックと一つにまとめられる.
    ///
    /// # Errors
    ///
    /// `id`が所有するブロックが存在しない場合には、
    /// アドレス空間を変更せずに、種類が`ErrorKind::ProcessNotFound`のエラーを返す.
    pub fn release(&mut self, id: &ProcessId) -> Result<Extent> {
        match reclaim::release(&mut self.space, id) {
            Err(e) => {
                self.observe_failure(&e, id.as_str(), 0);
                Err(track!(e))
            }
            Ok(released) => {
                self.metrics.count_release(released.size());
                debug!(self.logger, "Released";
                       "id" => id.as_str(), "start" => released.start(), "end" => released.end());
                track!(self.verify())?;
                Ok(released.extent())
            }
        }
    }

    /// コンパクションを行う.
    ///
    /// 全ての割当済みブロックを元の順序を保ったままアドレス`0`から詰め直し、
    /// 残りの領域を末尾の一つの空きブロックにまとめる.
    ///
    /// 何度実行しても結果は変わらない.
    pub fn compact(&mut self) -> Result<Compaction> {
        let result = compaction::compact(&mut self.space);
        self.metrics.count_compaction(result.relocated_blocks);
        debug!(self.logger, "Compacted";
               "relocated" => result.relocated_blocks, "free" => result.free_size);
        track!(self.verify())?;
        Ok(result)
    }

    fn verify(&self) -> Result<()> {
        if self.invariant_checks {
            track!(self.space.check_invariants())?;
        }
        Ok(())
    }

    fn observe_failure(&self, e: &Error, id: &str, size: u64) {
        let rejected = &self.metrics.rejected_requests;
        match *e.kind() {
            ErrorKind::InsufficientSpace => {
                self.metrics.nospace_failures.increment();
                let total_free = self.space.total_free();
                warn!(self.logger, "No sufficient space";
                      "id" => id, "requested" => size, "total_free" => total_free,
                      "fragmented" => total_free >= size);
            }
            ErrorKind::DuplicateProcess => rejected.duplicate.increment(),
            ErrorKind::InvalidStrategy => rejected.invalid_strategy.increment(),
            ErrorKind::ProcessNotFound => rejected.not_found.increment(),
            ErrorKind::InvalidInput => rejected.invalid_input.increment(),
            _ => {}
        }
        debug!(self.logger, "Request rejected"; "id" => id, "reason" => format!("{:?}", e.kind()));
    }
}
