//! 空きブロックの配置戦略.
use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorKind, Result};

/// 割当要求に対して、どの空きブロックを使用するかを決定する戦略.
///
/// いずれの戦略でも、候補となるのは「要求サイズ以上の空きブロック」のみであり、
/// 同順位の候補が複数存在する場合には、最も先頭アドレスが小さいものが選択される.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStrategy {
    /// 先頭から探索して、最初に見つかった候補を使用する.
    FirstFit,

    /// サイズが最も小さい候補を使用する.
    BestFit,

    /// サイズが最も大きい候補を使用する.
    WorstFit,
}
impl PlacementStrategy {
    /// 全ての戦略.
    pub const ALL: [PlacementStrategy; 3] = [
        PlacementStrategy::FirstFit,
        PlacementStrategy::BestFit,
        PlacementStrategy::WorstFit,
    ];

    /// 戦略を表す一文字のトークンを返す.
    pub fn token(self) -> &'static str {
        match self {
            PlacementStrategy::FirstFit => "F",
            PlacementStrategy::BestFit => "B",
            PlacementStrategy::WorstFit => "W",
        }
    }

    /// メトリクスのラベル等に使用される名前を返す.
    pub fn name(self) -> &'static str {
        match self {
            PlacementStrategy::FirstFit => "first_fit",
            PlacementStrategy::BestFit => "best_fit",
            PlacementStrategy::WorstFit => "worst_fit",
        }
    }
}
impl FromStr for PlacementStrategy {
    type Err = Error;

    /// トークンから配置戦略を生成する.
    ///
    /// 一文字のトークン(`F`, `B`, `W`)に加えて、
    /// `first`, `best-fit`, `worst_fit`のような名前も受け付ける (大文字・小文字は区別しない).
    ///
    /// # Errors
    ///
    /// 未知のトークンの場合には、種類が`ErrorKind::InvalidStrategy`のエラーが返される.
    ///
    /// # Examples
    ///
    /// ```
    /// use contalloc::ErrorKind;
    /// use contalloc::strategy::PlacementStrategy;
    ///
    /// assert_eq!("F".parse::<PlacementStrategy>().ok(), Some(PlacementStrategy::FirstFit));
    /// assert_eq!("best-fit".parse::<PlacementStrategy>().ok(), Some(PlacementStrategy::BestFit));
    /// assert_eq!("Z".parse::<PlacementStrategy>().err().map(|e| *e.kind()),
    ///            Some(ErrorKind::InvalidStrategy));
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_ascii_lowercase().replace('_', "-");
        match name.as_str() {
            "f" | "first" | "first-fit" => Ok(PlacementStrategy::FirstFit),
            "b" | "best" | "best-fit" => Ok(PlacementStrategy::BestFit),
            "w" | "worst" | "worst-fit" => Ok(PlacementStrategy::WorstFit),
            _ => track_panic!(
                ErrorKind::InvalidStrategy,
                "Unknown placement strategy: {:?}",
                s
            ),
        }
    }
}
impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        for &strategy in &PlacementStrategy::ALL {
            assert_eq!(strategy.token().parse::<PlacementStrategy>().ok(), Some(strategy));
            assert_eq!(strategy.name().parse::<PlacementStrategy>().ok(), Some(strategy));
        }
        assert_eq!("w".parse::<PlacementStrategy>().ok(), Some(PlacementStrategy::WorstFit));
        assert_eq!("First".parse::<PlacementStrategy>().ok(), Some(PlacementStrategy::FirstFit));
        assert_eq!(PlacementStrategy::BestFit.to_string(), "best_fit");
    }

    #[test]
    fn unknown_tokens() {
        for token in &["", "Z", "FB", "fit", "first fit"] {
            assert_eq!(
                token.parse::<PlacementStrategy>().err().map(|e| *e.kind()),
                Some(ErrorKind::InvalidStrategy)
            );
        }
    }
}
