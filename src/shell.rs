//! 行指向のコマンドによる対話的な操作.
//!
//! 一行に一つずつ、以下のコマンドを受け付ける:
//!
//! | コマンド | 意味 |
//! |---|---|
//! | `RQ <ProcessID> <Space> <Algorithm>` | 割当 (`Algorithm`は`F`, `B`, `W`のいずれか) |
//! | `RL <ProcessID>` | 解放 |
//! | `C` | コンパクション |
//! | `STAT` | 状態表示 |
//! | `X` | 終了 |
//!
//! このモジュールは入出力の変換のみを担当し、アドレス空間の操作は全て[MemoryManager]に委譲する.
//!
//! [MemoryManager]: ../manager/struct.MemoryManager.html
use std::error;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use trackable::error::ErrorKindExt;

use crate::block::ProcessId;
use crate::manager::MemoryManager;
use crate::{Error, ErrorKind, Result};

/// プロンプト文字列.
pub const PROMPT: &str = "allocator> ";

/// 初期容量を表す文字列を解釈する.
///
/// # Errors
///
/// `s`が正の整数を表していない場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
///
/// # Examples
///
/// ```
/// use contalloc::ErrorKind;
/// use contalloc::shell::parse_capacity;
///
/// assert_eq!(parse_capacity("100").ok(), Some(100));
/// assert_eq!(parse_capacity("0").err().map(|e| *e.kind()), Some(ErrorKind::InvalidCapacity));
/// assert_eq!(parse_capacity("-5").err().map(|e| *e.kind()), Some(ErrorKind::InvalidCapacity));
/// assert_eq!(parse_capacity("abc").err().map(|e| *e.kind()), Some(ErrorKind::InvalidCapacity));
/// ```
pub fn parse_capacity(s: &str) -> Result<u64> {
    let capacity = track!(s
        .trim()
        .parse::<u64>()
        .map_err(|e| ErrorKind::InvalidCapacity.cause(e)))?;
    track_assert!(capacity > 0, ErrorKind::InvalidCapacity; capacity);
    Ok(capacity)
}

/// コマンド.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `RQ <ProcessID> <Space> <Algorithm>`
    Request {
        /// プロセスID.
        id: String,

        /// 要求サイズ.
        size: u64,

        /// 配置戦略のトークン.
        ///
        /// 妥当性の検査は割当時に行われる.
        strategy: String,
    },

    /// `RL <ProcessID>`
    Release {
        /// プロセスID.
        id: String,
    },

    /// `C`
    Compact,

    /// `STAT`
    Status,

    /// `X`
    Exit,
}
impl FromStr for Command {
    type Err = Error;

    /// 一行分のテキストをコマンドとして解釈する.
    ///
    /// # Errors
    ///
    /// 解釈に失敗した場合には、種類が`ErrorKind::InvalidInput`のエラーが返される.
    /// エラーの原因(cause)には[MalformedCommand]が設定されている.
    ///
    /// [MalformedCommand]: ./enum.MalformedCommand.html
    fn from_str(s: &str) -> Result<Self> {
        let malformed = |m: MalformedCommand| Error::from(ErrorKind::InvalidInput.cause(m));
        let mut tokens = s.split_whitespace();
        let command = match tokens.next() {
            None => return Err(track!(malformed(MalformedCommand::Empty))),
            Some("RQ") => {
                let parsed = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
                    (Some(id), Some(size), Some(strategy), None) => {
                        size.parse::<u64>().ok().map(|size| Command::Request {
                            id: id.to_owned(),
                            size,
                            strategy: strategy.to_owned(),
                        })
                    }
                    _ => None,
                };
                match parsed {
                    Some(command) => command,
                    None => return Err(track!(malformed(MalformedCommand::Request))),
                }
            }
            Some("RL") => match (tokens.next(), tokens.next()) {
                (Some(id), None) => Command::Release { id: id.to_owned() },
                _ => return Err(track!(malformed(MalformedCommand::Release))),
            },
            Some("C") => Command::Compact,
            Some("STAT") => Command::Status,
            Some("X") => Command::Exit,
            Some(other) => {
                return Err(track!(malformed(MalformedCommand::Unknown(other.to_owned()))))
            }
        };
        Ok(command)
    }
}

/// 解釈できなかったコマンドの種類.
///
/// `Display`実装は、利用者向けの案内文を出力する.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedCommand {
    /// 空行.
    Empty,

    /// 引数が不正な`RQ`コマンド.
    Request,

    /// 引数が不正な`RL`コマンド.
    Release,

    /// 未知のコマンド.
    Unknown(String),
}
impl fmt::Display for MalformedCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MalformedCommand::Empty => write!(f, "Invalid command. Please try again."),
            MalformedCommand::Request => write!(
                f,
                "Invalid RQ command format. Use: RQ <ProcessID> <Space> <Algorithm>"
            ),
            MalformedCommand::Release => {
                write!(f, "Invalid RL command format. Use: RL <ProcessID>")
            }
            MalformedCommand::Unknown(_) => write!(
                f,
                "Unrecognized command. Valid commands: RQ, RL, C, STAT, X"
            ),
        }
    }
}
impl error::Error for MalformedCommand {}

/// コマンドを解釈して[MemoryManager]を操作し、結果をテキストとして出力する.
///
/// 利用者の入力に起因するエラーは、案内文を出力した上で処理を継続する.
/// それ以外のエラー(e.g., 出力先のI/Oエラー、内部状態の不整合)は呼び出し元に返される.
///
/// [MemoryManager]: ../manager/struct.MemoryManager.html
#[derive(Debug)]
pub struct Shell<W> {
    manager: MemoryManager,
    output: W,
}
impl<W: Write> Shell<W> {
    /// 新しい`Shell`インスタンスを生成する.
    pub fn new(manager: MemoryManager, output: W) -> Self {
        Shell { manager, output }
    }

    /// 操作対象の`MemoryManager`を返す.
    pub fn manager(&self) -> &MemoryManager {
        &self.manager
    }

    /// 出力先への参照を返す.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// `Shell`を分解して、`MemoryManager`と出力先を返す.
    pub fn into_parts(self) -> (MemoryManager, W) {
        (self.manager, self.output)
    }

    /// `input`から一行ずつコマンドを読み込んで実行する.
    ///
    /// `X`コマンドを受け取るか、入力の終端に達した時点で終了する.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        track!(self.prompt())?;
        for line in input.lines() {
            let line = track_io!(line)?;
            if !track!(self.execute_line(&line))? {
                break;
            }
            track!(self.prompt())?;
        }
        Ok(())
    }

    /// 一行分のコマンドを実行する.
    ///
    /// 処理を継続すべき場合には`true`が、`X`コマンドを受け取った場合には`false`が返される.
    pub fn execute_line(&mut self, line: &str) -> Result<bool> {
        match line.parse::<Command>() {
            Ok(command) => track!(self.execute(&command)),
            Err(e) => {
                let message = e
                    .concrete_cause::<MalformedCommand>()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.to_string());
                track_io!(writeln!(self.output, "{}", message))?;
                Ok(true)
            }
        }
    }

    /// コマンドを実行する.
    ///
    /// 処理を継続すべき場合には`true`が、`Command::Exit`の場合には`false`が返される.
    pub fn execute(&mut self, command: &Command) -> Result<bool> {
        match *command {
            Command::Request {
                ref id,
                size,
                ref strategy,
            } => {
                if let Err(e) = self.manager.request(id, size, strategy) {
                    let message = match *e.kind() {
                        ErrorKind::DuplicateProcess => {
                            format!("Process {} is already allocated. Try a different ID.", id)
                        }
                        ErrorKind::InsufficientSpace => format!(
                            "No sufficient space to allocate process {} ({} bytes)",
                            id, size
                        ),
                        ErrorKind::InvalidStrategy => "Invalid algorithm. Use 'F' for First Fit, \
                                                       'B' for Best Fit, or 'W' for Worst Fit."
                            .to_owned(),
                        ErrorKind::InvalidInput => format!(
                            "Invalid request for process {:?} ({} bytes)",
                            id, size
                        ),
                        _ => return Err(track!(e)),
                    };
                    track_io!(writeln!(self.output, "{}", message))?;
                }
            }
            Command::Release { ref id } => {
                let result = id
                    .parse::<ProcessId>()
                    .and_then(|id| self.manager.release(&id).map(|_| ()));
                if let Err(e) = result {
                    match *e.kind() {
                        ErrorKind::ProcessNotFound | ErrorKind::InvalidInput => {
                            track_io!(writeln!(self.output, "Process {} not found in memory.", id))?;
                        }
                        _ => return Err(track!(e)),
                    }
                }
            }
            Command::Compact => {
                track!(self.manager.compact())?;
            }
            Command::Status => {
                track_io!(write!(self.output, "{}", self.manager.status()))?;
            }
            Command::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn prompt(&mut self) -> Result<()> {
        track_io!(write!(self.output, "{}", PROMPT))?;
        track_io!(self.output.flush())?;
        Ok(())
    }
}
