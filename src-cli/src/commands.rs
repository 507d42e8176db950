use qn_core::domain::error::AppError;
use qn_core::usecase::controller::ActivationController;

/// ターミナルから入力できる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    List,
    /// 表示中リストの 1 始まりの番号
    Select(usize),
    Dismiss,
    Help,
    Quit,
}

/// コマンドエラー型
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'h' for help)")]
    Unknown(String),
    #[error("Usage: s <number>")]
    MissingIndex,
    #[error("No item #{0}")]
    InvalidIndex(String),
    #[error("{0}")]
    App(#[from] AppError),
}

/// 実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 画面を描き直す。アラートがあれば先に表示する。
    Screen { alert: Option<String> },
    Help,
    Quit,
}

type CmdResult<T> = Result<T, CommandError>;

/// 1行を解析する。空行は None。
pub fn parse(line: &str) -> CmdResult<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "t" | "toggle" => Command::Toggle,
        "l" | "list" => Command::List,
        "d" | "dismiss" => Command::Dismiss,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "s" | "select" => {
            let raw = words.next().ok_or(CommandError::MissingIndex)?;
            let index = raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandError::InvalidIndex(raw.to_string()))?;
            Command::Select(index)
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

pub fn execute(controller: &ActivationController, command: Command) -> CmdResult<Reply> {
    match command {
        Command::Toggle => {
            let outcome = controller.toggle();
            Ok(Reply::Screen {
                alert: outcome.alert,
            })
        }
        Command::List => Ok(Reply::Screen { alert: None }),
        Command::Select(index) => {
            let item = controller
                .visible_items()
                .into_iter()
                .nth(index - 1)
                .ok_or_else(|| CommandError::InvalidIndex(index.to_string()))?;
            controller.select(&item.id)?;
            Ok(Reply::Screen { alert: None })
        }
        Command::Dismiss => {
            controller.dismiss();
            Ok(Reply::Screen { alert: None })
        }
        Command::Help => Ok(Reply::Help),
        Command::Quit => Ok(Reply::Quit),
    }
}

pub const HELP: &str = "\
Commands:
  t, toggle      activate / deactivate
  l, list        show the list again
  s, select <n>  open item n and read it aloud
  d, dismiss     close the detail view
  h, help        show this help
  q, quit        exit";
