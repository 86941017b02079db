//! Contiguous Allocator.
//!
//! `contalloc`は、固定長の一次元アドレス空間の中で、連続領域(ブロック)の割当と解放を管理する
//! アロケータのシミュレータ.
//!
//! # 特徴
//!
//! - アドレス空間全体は、常に「割当済み」または「空き」のブロック列によって隙間なく分割されている
//! - 割当時には、三種類の配置戦略から一つを選択可能:
//!   - First-Fit: 要求サイズを満たす空きブロックの中で、最も先頭に近いもの
//!   - Best-Fit: 要求サイズを満たす空きブロックの中で、最もサイズが小さいもの
//!   - Worst-Fit: 要求サイズを満たす空きブロックの中で、最もサイズが大きいもの
//! - 解放時には、隣接する空きブロック同士が自動的にまとめられる
//! - コンパクション(デフラグ)により、全ての割当済みブロックを先頭に詰め、空き領域を末尾の一つのブロックに集約できる
//! - ページングやアライメントの概念は持たない (アドレス空間は単なるバイト範囲)
//!
//! # モジュールの依存関係
//!
//! ```text
//! shell => manager => space => block
//!             |
//!             +=> status
//! ```
//!
//! - [manager]モジュール:
//!   - 主に[MemoryManager]構造体を提供
//!   - `contalloc`の利用者が直接触るのはこの構造体
//! - [space]モジュール:
//!   - [AddressSpace]構造体を提供
//!   - ブロック列の分割・結合等の基本操作と、不変条件の検査を担当する
//! - [status]モジュール:
//!   - アドレス空間の状態を読み取り専用で公開するための[StatusView]を提供
//! - [shell]モジュール:
//!   - 行指向のコマンド(`RQ`, `RL`, `C`, `STAT`, `X`)を解釈して[MemoryManager]を操作する
//!
//! [manager]: ./manager/index.html
//! [MemoryManager]: ./manager/struct.MemoryManager.html
//! [space]: ./space/index.html
//! [AddressSpace]: ./space/struct.AddressSpace.html
//! [status]: ./status/index.html
//! [StatusView]: ./status/struct.StatusView.html
//! [shell]: ./shell/index.html
#![warn(missing_docs)]
extern crate prometrics;
#[macro_use]
extern crate trackable;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

macro_rules! track_io {
    ($expr:expr) => {
        $expr.map_err(|e: ::std::io::Error| track!(crate::Error::from(e)))
    };
}

pub mod block;
pub mod manager;
pub mod metrics;
pub mod shell;
pub mod space;
pub mod status;
pub mod strategy;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
