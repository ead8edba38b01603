//! Line commands on stdin standing in for the physical buttons

use anyhow::{anyhow, bail, Result};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::{ButtonId, RawInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Press and release a button
    Press(ButtonId),
    /// Two quick presses of back
    DoubleBack,
    /// Press select and keep it down
    Hold,
    /// Let go of a held select
    Release,
    /// Wrist tap
    Tap,
    /// Open the action window on a menu index
    Open(u8),
    /// Open the paging window on a menu index
    Page(u8),
    /// Write the top window to the snapshot path
    Snapshot,
    Quit,
}

impl ConsoleCommand {
    /// Raw edges this command stands for; empty for non-button commands
    pub fn raw_inputs(self) -> Vec<RawInput> {
        match self {
            ConsoleCommand::Press(button) => vec![RawInput::Down(button), RawInput::Up(button)],
            ConsoleCommand::DoubleBack => vec![
                RawInput::Down(ButtonId::Back),
                RawInput::Up(ButtonId::Back),
                RawInput::Down(ButtonId::Back),
                RawInput::Up(ButtonId::Back),
            ],
            ConsoleCommand::Hold => vec![RawInput::Down(ButtonId::Select)],
            ConsoleCommand::Release => vec![RawInput::Up(ButtonId::Select)],
            ConsoleCommand::Tap => vec![RawInput::Motion],
            _ => Vec::new(),
        }
    }
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            bail!("empty command");
        };
        let mut index = || -> Result<u8> {
            let arg = parts
                .next()
                .ok_or_else(|| anyhow!("'{}' needs a menu index", word))?;
            arg.parse()
                .map_err(|_| anyhow!("invalid menu index '{}'", arg))
        };

        let command = match word.to_lowercase().as_str() {
            "up" | "u" => ConsoleCommand::Press(ButtonId::Up),
            "select" | "s" => ConsoleCommand::Press(ButtonId::Select),
            "down" | "d" => ConsoleCommand::Press(ButtonId::Down),
            "back" | "b" => ConsoleCommand::Press(ButtonId::Back),
            "back2" | "bb" => ConsoleCommand::DoubleBack,
            "hold" => ConsoleCommand::Hold,
            "release" => ConsoleCommand::Release,
            "tap" => ConsoleCommand::Tap,
            "open" => ConsoleCommand::Open(index()?),
            "page" => ConsoleCommand::Page(index()?),
            "snap" | "snapshot" => ConsoleCommand::Snapshot,
            "quit" | "q" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }
}

/// Read stdin line by line until EOF, forwarding parsed commands
pub async fn read_commands(commands: UnboundedSender<ConsoleCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(command) => {
                        if commands.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
            Ok(None) => {
                debug!("stdin closed");
                let _ = commands.send(ConsoleCommand::Quit);
                break;
            }
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_buttons() {
        assert_eq!(
            "up".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Press(ButtonId::Up)
        );
        assert_eq!(
            "  Select ".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Press(ButtonId::Select)
        );
        assert_eq!(
            "back2".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::DoubleBack
        );
    }

    #[test]
    fn test_parse_indexed() {
        assert_eq!(
            "open 4".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Open(4)
        );
        assert_eq!(
            "page 0".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Page(0)
        );
        assert!("open".parse::<ConsoleCommand>().is_err());
        assert!("page x".parse::<ConsoleCommand>().is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert!("jump".parse::<ConsoleCommand>().is_err());
        assert!("".parse::<ConsoleCommand>().is_err());
    }

    #[test]
    fn test_raw_inputs() {
        assert_eq!(
            ConsoleCommand::Hold.raw_inputs(),
            vec![RawInput::Down(ButtonId::Select)]
        );
        assert_eq!(ConsoleCommand::DoubleBack.raw_inputs().len(), 4);
        assert!(ConsoleCommand::Open(1).raw_inputs().is_empty());
    }
}
