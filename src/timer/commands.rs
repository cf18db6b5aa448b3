use std::str::FromStr;

use anyhow::Result;
use log::warn;

use crate::{refusal::Refusal, registry::Direction, snapshot::ClassroomSnapshot};

use super::TimerController;

/// Operator commands accepted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(String),
    Start,
    Pause,
    Toggle,
    Reset,
    Skip,
    /// `position` is 1-based, as displayed.
    Move { position: usize, direction: Direction },
    Rename { id: String, name: String },
    Shuffle,
    /// `number` is 1-based, as displayed.
    Batch(usize),
    Link(Option<String>),
    Show,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  select <id>          make a group active (or review a completed one)
  start | pause        control the clock of the active group
  toggle               start/pause, or prepare the first pending group
  reset                rewind the active group to 00:00
  skip                 jump to the next phase
  up <n> | down <n>    move the group at position n
  rename <id> <name>   rename a group
  shuffle              randomise the batch (no active group)
  batch <n>            switch to batch n
  link [url]           set or clear the peer assessment link
  show | json          print the current state
  quit";

fn position(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| format!("{what} requires a number"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("invalid number: {raw}")),
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = Some(rest).filter(|r| !r.is_empty());

        let command = match verb.to_ascii_lowercase().as_str() {
            "select" => Command::Select(
                arg.ok_or_else(|| "select requires a group id".to_string())?
                    .to_string(),
            ),
            "start" => Command::Start,
            "pause" => Command::Pause,
            "toggle" | "t" => Command::Toggle,
            "reset" => Command::Reset,
            "skip" => Command::Skip,
            "up" => Command::Move {
                position: position(arg, "up")?,
                direction: Direction::Up,
            },
            "down" => Command::Move {
                position: position(arg, "down")?,
                direction: Direction::Down,
            },
            "rename" => {
                let (id, name) = arg
                    .and_then(|r| r.split_once(char::is_whitespace))
                    .ok_or_else(|| "rename requires an id and a name".to_string())?;
                Command::Rename {
                    id: id.to_string(),
                    name: name.trim().to_string(),
                }
            }
            "shuffle" => Command::Shuffle,
            "batch" => Command::Batch(position(arg, "batch")?),
            "link" => Command::Link(arg.map(str::to_string)),
            "show" | "" => Command::Show,
            "json" => Command::Json,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(command)
    }
}

#[derive(Debug)]
pub enum Reply {
    Applied(ClassroomSnapshot),
    Ignored(Refusal),
    Show(ClassroomSnapshot),
    Json(String),
    /// The command could not be carried out; the session is unaffected.
    Failed(String),
    Help,
    Quit,
}

impl From<Result<ClassroomSnapshot, Refusal>> for Reply {
    fn from(result: Result<ClassroomSnapshot, Refusal>) -> Self {
        match result {
            Ok(snapshot) => Reply::Applied(snapshot),
            Err(refusal) => Reply::Ignored(refusal),
        }
    }
}

pub async fn execute(controller: &TimerController, command: Command) -> Result<Reply> {
    let reply = match command {
        Command::Select(id) => controller.select_group(&id).await.into(),
        Command::Start => controller.start().await.into(),
        Command::Pause => controller.pause().await.into(),
        Command::Toggle => controller.toggle().await.into(),
        Command::Reset => controller.reset().await.into(),
        Command::Skip => controller.skip_to_next_phase().await.into(),
        Command::Move {
            position,
            direction,
        } => controller.reorder(position - 1, direction).await.into(),
        Command::Rename { id, name } => controller.rename(&id, &name).await.into(),
        Command::Shuffle => controller.shuffle().await.into(),
        Command::Batch(number) => controller.switch_batch(number - 1).await.into(),
        Command::Link(link) => match controller.set_form_link(link.as_deref()).await {
            Ok(snapshot) => Reply::Applied(snapshot),
            Err(err) => {
                warn!("Assessment link not saved: {:#}", err);
                Reply::Failed(format!("{:#}", err))
            }
        },
        Command::Show => Reply::Show(controller.get_snapshot().await),
        Command::Json => {
            let snapshot = controller.get_snapshot().await;
            Reply::Json(serde_json::to_string_pretty(&snapshot)?)
        }
        Command::Help => Reply::Help,
        Command::Quit => Reply::Quit,
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        audio::SilentToneGenerator, config::AppConfig, models::default_batches,
        settings::SettingsStore,
    };

    #[test]
    fn parses_simple_verbs() {
        assert_eq!("start".parse::<Command>(), Ok(Command::Start));
        assert_eq!("  PAUSE ".parse::<Command>(), Ok(Command::Pause));
        assert_eq!("t".parse::<Command>(), Ok(Command::Toggle));
        assert_eq!("".parse::<Command>(), Ok(Command::Show));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            "select b1-g3".parse::<Command>(),
            Ok(Command::Select("b1-g3".into()))
        );
        assert_eq!(
            "down 2".parse::<Command>(),
            Ok(Command::Move {
                position: 2,
                direction: Direction::Down
            })
        );
        assert_eq!(
            "rename b1-g1   The Owls ".parse::<Command>(),
            Ok(Command::Rename {
                id: "b1-g1".into(),
                name: "The Owls".into()
            })
        );
        assert_eq!("batch 2".parse::<Command>(), Ok(Command::Batch(2)));
        assert_eq!(
            "link https://forms.gle/x".parse::<Command>(),
            Ok(Command::Link(Some("https://forms.gle/x".into())))
        );
        assert_eq!("link".parse::<Command>(), Ok(Command::Link(None)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("select".parse::<Command>().is_err());
        assert!("up 0".parse::<Command>().is_err());
        assert!("up two".parse::<Command>().is_err());
        assert!("rename b1-g1".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn execute_maps_positions_and_refusals() {
        let controller = TimerController::new(
            &AppConfig::default(),
            default_batches(),
            Arc::new(SettingsStore::in_memory()),
            Arc::new(SilentToneGenerator),
        );

        match execute(&controller, Command::Move { position: 2, direction: Direction::Up })
            .await
            .unwrap()
        {
            Reply::Applied(snap) => assert_eq!(snap.groups[0].id, "b1-g2"),
            other => panic!("unexpected reply {other:?}"),
        }

        match execute(&controller, Command::Reset).await.unwrap() {
            Reply::Ignored(refusal) => assert_eq!(refusal, Refusal::NoActiveGroup),
            other => panic!("unexpected reply {other:?}"),
        }

        match execute(&controller, Command::Batch(2)).await.unwrap() {
            Reply::Applied(snap) => assert_eq!(snap.batch_index, 1),
            other => panic!("unexpected reply {other:?}"),
        }

        match execute(&controller, Command::Json).await.unwrap() {
            Reply::Json(text) => assert!(text.contains("\"batchIndex\": 1")),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unsaved_link_does_not_stop_the_session() {
        let path = std::env::temp_dir()
            .join(format!("classtimer-missing-{}", uuid::Uuid::new_v4()))
            .join("settings.json");
        let controller = TimerController::new(
            &AppConfig::default(),
            default_batches(),
            Arc::new(SettingsStore::new(path).unwrap()),
            Arc::new(SilentToneGenerator),
        );
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();

        match execute(&controller, Command::Link(Some("https://x".into())))
            .await
            .unwrap()
        {
            Reply::Failed(message) => assert!(message.contains("Failed to write settings")),
            other => panic!("unexpected reply {other:?}"),
        }

        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
        let snap = controller.get_snapshot().await;
        assert!(snap.running);
        assert_eq!(snap.nominal_seconds, 2);

        controller.skip_to_next_phase().await.unwrap();
        let snap = controller.skip_to_next_phase().await.unwrap();
        assert_eq!(snap.assessment, crate::snapshot::AssessmentPrompt::NeedsLink);
    }
}
