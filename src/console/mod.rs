//! Terminal presentation layer: reads commands from stdin, prints state.

mod render;

pub use render::{render, status_line};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::timer::{
    commands::{execute, Command, Reply, HELP},
    ClassroomEvent, TimerController,
};

pub async fn run_console(controller: TimerController) -> Result<()> {
    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ClassroomEvent::StateChanged(snapshot)) if snapshot.running => {
                    println!("{}", status_line(&snapshot));
                }
                Ok(ClassroomEvent::StateChanged(_)) => {}
                Ok(ClassroomEvent::Tone(kind)) => println!("* {}", kind.as_str()),
                Ok(ClassroomEvent::GroupCompleted(done)) => println!(
                    "{} completed in {}",
                    done.name,
                    crate::snapshot::format_clock(done.recorded_duration)
                ),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{}", render(&controller.get_snapshot().await));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read command from stdin")?
    {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err);
                continue;
            }
        };

        match execute(&controller, command).await? {
            Reply::Applied(snapshot) | Reply::Show(snapshot) => println!("{}", render(&snapshot)),
            Reply::Ignored(refusal) => println!("ignored: {}", refusal),
            Reply::Json(text) => println!("{}", text),
            Reply::Failed(message) => eprintln!("failed: {}", message),
            Reply::Help => println!("{}", HELP),
            Reply::Quit => break,
        }
    }

    controller.shutdown().await;
    printer.abort();
    Ok(())
}
