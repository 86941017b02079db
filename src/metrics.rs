//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, Gauge, MetricBuilder};

use crate::strategy::PlacementStrategy;

/// [`MemoryManager`]のメトリクス.
///
/// メトリクスは観測目的のものであり、空き容量の計算等には使用されない.
///
/// [`MemoryManager`]: ../manager/struct.MemoryManager.html
#[derive(Debug, Clone)]
pub struct AllocatorMetrics {
    pub(crate) capacity_bytes: Gauge,
    pub(crate) allocated_blocks: StrategyCounter,
    pub(crate) allocated_bytes: Counter,
    pub(crate) released_blocks: Counter,
    pub(crate) released_bytes: Counter,
    pub(crate) nospace_failures: Counter,
    pub(crate) rejected_requests: RejectedRequestCounter,
    pub(crate) compactions: Counter,
    pub(crate) relocated_blocks: Counter,
}
impl AllocatorMetrics {
    /// アドレス空間の容量.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_capacity_bytes <GAUGE>
    /// ```
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes.value() as u64
    }

    /// ブロックの割当回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_allocated_blocks_total { strategy="first_fit|best_fit|worst_fit" } <COUNTER>
    /// ```
    pub fn allocated_blocks(&self) -> u64 {
        self.allocated_blocks.total()
    }

    /// 指定された戦略でのブロックの割当回数.
    pub fn allocated_blocks_by(&self, strategy: PlacementStrategy) -> u64 {
        self.allocated_blocks.get(strategy)
    }

    /// これまでに割り当てたバイト数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_allocated_bytes_total <COUNTER>
    /// ```
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes.value() as u64
    }

    /// ブロックの解放回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_released_blocks_total <COUNTER>
    /// ```
    pub fn released_blocks(&self) -> u64 {
        self.released_blocks.value() as u64
    }

    /// これまでに解放されたバイト数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_released_bytes_total <COUNTER>
    /// ```
    pub fn released_bytes(&self) -> u64 {
        self.released_bytes.value() as u64
    }

    /// 空き領域不足による割当失敗回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_nospace_failures_total <COUNTER>
    /// ```
    pub fn nospace_failures(&self) -> u64 {
        self.nospace_failures.value() as u64
    }

    /// 不正な要求として拒否された回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_rejected_requests_total { reason="duplicate|invalid_strategy|not_found|invalid_input" } <COUNTER>
    /// ```
    pub fn rejected_requests(&self) -> u64 {
        let c = &self.rejected_requests;
        [&c.duplicate, &c.invalid_strategy, &c.not_found, &c.invalid_input]
            .iter()
            .map(|c| c.value() as u64)
            .sum()
    }

    /// コンパクションの実行回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_compactions_total <COUNTER>
    /// ```
    pub fn compactions(&self) -> u64 {
        self.compactions.value() as u64
    }

    /// コンパクションによって位置が変わったブロックの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_relocated_blocks_total <COUNTER>
    /// ```
    pub fn relocated_blocks(&self) -> u64 {
        self.relocated_blocks.value() as u64
    }

    /// 割当済みのバイト数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// contalloc_allocator_allocated_bytes_total - contalloc_allocator_released_bytes_total
    /// ```
    pub fn usage_bytes(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_bytes();
        let inc = self.allocated_bytes();
        inc - dec
    }

    pub(crate) fn new(builder: &MetricBuilder, capacity_bytes: u64) -> Self {
        let mut builder = builder.clone();
        builder.namespace("contalloc").subsystem("allocator");
        let metrics = AllocatorMetrics {
            capacity_bytes: builder
                .gauge("capacity_bytes")
                .help("Capacity of the address space")
                .finish()
                .expect("Never fails"),
            allocated_blocks: StrategyCounter::new(&builder),
            allocated_bytes: builder
                .counter("allocated_bytes_total")
                .help("Number of allocated bytes")
                .finish()
                .expect("Never fails"),
            released_blocks: builder
                .counter("released_blocks_total")
                .help("Number of released blocks")
                .finish()
                .expect("Never fails"),
            released_bytes: builder
                .counter("released_bytes_total")
                .help("Number of released bytes")
                .finish()
                .expect("Never fails"),
            nospace_failures: builder
                .counter("nospace_failures_total")
                .help("Number of allocation failures caused by no available space")
                .finish()
                .expect("Never fails"),
            rejected_requests: RejectedRequestCounter::new(&builder),
            compactions: builder
                .counter("compactions_total")
                .help("Number of compactions")
                .finish()
                .expect("Never fails"),
            relocated_blocks: builder
                .counter("relocated_blocks_total")
                .help("Number of blocks moved by compactions")
                .finish()
                .expect("Never fails"),
        };
        metrics.capacity_bytes.set(capacity_bytes as f64);
        metrics
    }

    pub(crate) fn count_allocation(&self, strategy: PlacementStrategy, size: u64) {
        self.allocated_blocks.increment(strategy);
        self.allocated_bytes.add_u64(size);
    }

    pub(crate) fn count_release(&self, size: u64) {
        self.released_blocks.increment();
        self.released_bytes.add_u64(size);
    }

    pub(crate) fn count_compaction(&self, relocated: usize) {
        self.compactions.increment();
        self.relocated_blocks.add_u64(relocated as u64);
    }
}

/// 配置戦略毎のカウンタ.
#[derive(Debug, Clone)]
pub(crate) struct StrategyCounter {
    first_fit: Counter,
    best_fit: Counter,
    worst_fit: Counter,
}
impl StrategyCounter {
    fn new(builder: &MetricBuilder) -> Self {
        let counter = |strategy: PlacementStrategy| {
            builder
                .counter("allocated_blocks_total")
                .help("Number of allocated blocks")
                .label("strategy", strategy.name())
                .finish()
                .expect("Never fails")
        };
        StrategyCounter {
            first_fit: counter(PlacementStrategy::FirstFit),
            best_fit: counter(PlacementStrategy::BestFit),
            worst_fit: counter(PlacementStrategy::WorstFit),
        }
    }

    fn counter(&self, strategy: PlacementStrategy) -> &Counter {
        match strategy {
            PlacementStrategy::FirstFit => &self.first_fit,
            PlacementStrategy::BestFit => &self.best_fit,
            PlacementStrategy::WorstFit => &self.worst_fit,
        }
    }

    fn increment(&self, strategy: PlacementStrategy) {
        self.counter(strategy).increment();
    }

    fn get(&self, strategy: PlacementStrategy) -> u64 {
        self.counter(strategy).value() as u64
    }

    fn total(&self) -> u64 {
        PlacementStrategy::ALL.iter().map(|&s| self.get(s)).sum()
    }
}

/// 要求の拒否理由毎のカウンタ.
#[derive(Debug, Clone)]
pub(crate) struct RejectedRequestCounter {
    pub(crate) duplicate: Counter,
    pub(crate) invalid_strategy: Counter,
    pub(crate) not_found: Counter,
    pub(crate) invalid_input: Counter,
}
impl RejectedRequestCounter {
    fn new(builder: &MetricBuilder) -> Self {
        let counter = |reason: &str| {
            builder
                .counter("rejected_requests_total")
                .help("Number of rejected requests")
                .label("reason", reason)
                .finish()
                .expect("Never fails")
        };
        RejectedRequestCounter {
            duplicate: counter("duplicate"),
            invalid_strategy: counter("invalid_strategy"),
            not_found: counter("not_found"),
            invalid_input: counter("invalid_input"),
        }
    }
}
