use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};

use crate::manager::MemoryManager;
use crate::metrics::AllocatorMetrics;
use crate::space::AddressSpace;
use crate::Result;

/// `MemoryManager`のビルダ.
#[derive(Debug, Clone)]
pub struct MemoryManagerBuilder {
    pub(crate) metrics: MetricBuilder,
    pub(crate) logger: Logger,
    pub(crate) invariant_checks: bool,
}
impl MemoryManagerBuilder {
    /// デフォルト設定で`MemoryManagerBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        MemoryManagerBuilder {
            metrics: MetricBuilder::new(),
            logger: Logger::root(Discard, o!()),
            invariant_checks: true,
        }
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// 割当・解放・コンパクション等のイベントを出力する logger を登録する.
    ///
    /// デフォルトでは、何も出力されない.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// 状態を変更する操作の度に、アドレス空間の不変条件を検査するかどうかを設定する.
    ///
    /// 検査で違反が見つかった場合には、その操作は`ErrorKind::InconsistentState`のエラーを返す.
    /// 検査にはブロック数に比例する時間が掛かる.
    ///
    /// デフォルト値は`true`.
    pub fn invariant_checks(&mut self, enabled: bool) -> &mut Self {
        self.invariant_checks = enabled;
        self
    }

    /// 指定容量のアドレス空間を管理する`MemoryManager`を生成する.
    ///
    /// # Errors
    ///
    /// `capacity`が`0`の場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
    pub fn build(&self, capacity: u64) -> Result<MemoryManager> {
        let space = track!(AddressSpace::new(capacity))?;
        let metrics = AllocatorMetrics::new(&self.metrics, capacity);
        let logger = self.logger.new(o!("capacity" => capacity));
        info!(logger, "Address space initialized");
        Ok(MemoryManager::from_parts(
            space,
            metrics,
            logger,
            self.invariant_checks,
        ))
    }
}
impl Default for MemoryManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
