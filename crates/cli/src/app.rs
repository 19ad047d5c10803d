//! The two run modes of the binary.

use std::process::ExitCode;

use briefcast_core::RawForm;
use briefcast_tracker::{Phase, TrackerEvent, TrackerHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use crate::commands::{parse_line, Command, USAGE};
use crate::presenter::present_event;

/// Submit one brief and follow it until the tracker is idle again.
///
/// Exits successfully once results were rendered; a submission error or
/// a failed job exits with failure. Ctrl-C stops waiting.
pub async fn run_once(handle: &TrackerHandle, form: RawForm) -> anyhow::Result<ExitCode> {
    let mut events = handle.subscribe();
    handle.submit(form)?;

    let mut rendered = false;
    let mut submitted = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, no longer following the job");
                return Ok(ExitCode::from(130));
            }
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Dropped tracker events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if let Some(text) = present_event(&event) {
                    println!("{text}");
                }
                match event {
                    TrackerEvent::PhaseChanged { phase: Phase::Submitting } => submitted = true,
                    TrackerEvent::ResultsRendered { .. } => rendered = true,
                    TrackerEvent::PhaseChanged { phase: Phase::Idle } if submitted => break,
                    _ => {}
                }
            }
        }
    }

    Ok(if rendered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Read commands from stdin and print tracker events as they arrive.
pub async fn run_interactive(handle: &TrackerHandle) -> anyhow::Result<()> {
    let mut events = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{USAGE}");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => dispatch(handle, command)?,
                    Ok(None) => {}
                    Err(e) => println!("error: {e}"),
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(text) = present_event(&event) {
                            println!("{text}");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Dropped tracker events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    Ok(())
}

fn dispatch(handle: &TrackerHandle, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Submit(form) => handle.submit(form)?,
        Command::Status => handle.check_status()?,
        Command::Copy(index) => handle.copy(index)?,
        Command::Dismiss => handle.form_edited()?,
        Command::Help => println!("{USAGE}"),
        Command::Quit => {}
    }
    Ok(())
}
