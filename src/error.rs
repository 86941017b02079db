use trackable::error::ErrorKindExt;

/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if let Some(e) = e.get_ref().and_then(|e| e.downcast_ref::<Error>()).cloned() {
            e
        } else if e.kind() == std::io::ErrorKind::InvalidInput {
            ErrorKind::InvalidInput.cause(e).into()
        } else {
            ErrorKind::Other.cause(e).into()
        }
    }
}
impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        if *e.kind() == ErrorKind::InvalidInput {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
        } else {
            std::io::Error::new(std::io::ErrorKind::Other, e)
        }
    }
}

/// 発生し得るエラーの種別.
///
/// `InconsistentState`と`Other`以外は、全て呼び出し側で回復可能なエラーであり、
/// これらのエラーが返された場合には、アドレス空間の状態は一切変更されていない.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// アドレス空間の容量が不正.
    ///
    /// 容量には正の整数を指定する必要がある.
    InvalidCapacity,

    /// 指定されたプロセスIDは、既に別のブロックを所有している.
    ///
    /// # 典型的な対応策
    ///
    /// - 異なるIDを使用する
    /// - 既存のブロックを解放してから再度割当を行う
    DuplicateProcess,

    /// 要求サイズを満たす空きブロックが存在しない.
    ///
    /// 空き容量の合計は足りていても、断片化によって割当に失敗することがある.
    ///
    /// # 典型的な対応策
    ///
    /// - 不要なブロックを解放する
    /// - コンパクションを行ってから再度割当を行う
    InsufficientSpace,

    /// 配置戦略の指定が不正.
    InvalidStrategy,

    /// 指定されたプロセスIDを所有者とするブロックが存在しない.
    ProcessNotFound,

    /// 入力が不正.
    ///
    /// E.g., 空のプロセスID、サイズ`0`の割当要求、解釈不能なコマンド
    InvalidInput,

    /// 内部状態が不整合に陥っている.
    ///
    /// プログラムにバグがあることを示している.
    InconsistentState,

    /// その他エラー.
    ///
    /// E.g., I/Oエラー
    Other,
}
impl trackable::error::ErrorKind for ErrorKind {}
