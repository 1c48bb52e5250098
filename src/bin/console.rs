//! # VoiceCare Console
//!
//! Line-oriented operator console that also stands in for the speech
//! client: spoken text is printed, and transcripts are typed.
//!
//! Usage: `voicecare-console`, then `help`.

use anyhow::Result;
use dotenvy::dotenv;
use log::warn;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use voicecare::core::Config;
use voicecare::features::notify::Severity;
use voicecare::ipc::{connect_with_retry, EngineEvent, IpcClient};

const HELP: &str = "\
Commands:
  add <name>        add a medication
  remove <index>    remove a medication by its list position
  start [HH:MM]     start the daily reminder (defaults to the configured time)
  voice-add         dictate a medication name
  listen            respond to a reminder by voice
  say <transcript>  deliver a recognition transcript
  error <class>     deliver a recognition error (e.g. no-speech, not-allowed)
  end               close the recognition session
  status            show the engine snapshot
  quit              exit the console";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut client =
        connect_with_retry(Path::new(&config.socket_path), 3, Duration::from_secs(1)).await?;
    println!("Connected to VoiceCare at {}. Type 'help' for commands.", config.socket_path);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = client.recv() => match event {
                Some(event) => render(&client, event).await?,
                None => {
                    println!("Engine connection closed");
                    break;
                }
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !dispatch(&client, line.trim(), &config.reminder_time).await? {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    Ok(())
}

/// Run one console command. Returns false when the console should exit.
async fn dispatch(client: &IpcClient, line: &str, default_time: &str) -> Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "add" => client.add_medication(rest).await?,
        "remove" => match rest.parse::<usize>() {
            Ok(index) => client.remove_medication(index).await?,
            Err(_) => println!("usage: remove <index>"),
        },
        "start" => {
            let time = if rest.is_empty() { default_time } else { rest };
            client.start_reminder(time).await?;
        }
        "voice-add" => client.add_medication_by_voice().await?,
        "listen" => client.respond_to_reminder().await?,
        "say" => {
            client.transcript(rest).await?;
            client.recognition_ended().await?;
        }
        "error" => {
            client.recognition_error(rest).await?;
            client.recognition_ended().await?;
        }
        "end" => client.recognition_ended().await?,
        "status" => client.request_status().await?,
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(false),
        other => println!("Unknown command '{other}'. Type 'help' for commands."),
    }

    Ok(true)
}

async fn render(client: &IpcClient, event: EngineEvent) -> Result<()> {
    match event {
        EngineEvent::Status { text } => println!("[status] {text}"),
        EngineEvent::Log { text, severity } => {
            let tag = match severity {
                Severity::Normal => "log",
                Severity::Ok => "ok",
                Severity::Warn => "warn",
                Severity::Crit => "CRIT",
            };
            println!("[{tag}] {text}");
        }
        EngineEvent::ClearLog => println!("[log cleared]"),
        EngineEvent::Speak { text } => println!("🔊 {text}"),
        EngineEvent::CancelSpeech => {}
        EngineEvent::StartListening => {
            println!("🎤 Listening... reply with 'say <words>' or 'error <class>'")
        }
        EngineEvent::MedicationList { items } => {
            if items.is_empty() {
                println!("[medications] (none)");
            }
            for (index, name) in items.iter().enumerate() {
                println!("[medications] {index}: {name}");
            }
        }
        EngineEvent::Snapshot { snapshot } => {
            println!("Status:       {}", snapshot.status);
            println!("Mode:         {}", snapshot.mode);
            println!("Missed:       {}", snapshot.missed_confirmations);
            println!("Medications:  {}", snapshot.medications.join(", "));
            println!(
                "Reminder at:  {}",
                snapshot.reminder_time.as_deref().unwrap_or("not scheduled")
            );
            println!(
                "Next fire:    {}",
                snapshot.next_fire.as_deref().unwrap_or("-")
            );
        }
        EngineEvent::CommandRejected { reason } => warn!("Command rejected: {reason}"),
        EngineEvent::Heartbeat { timestamp } => client.pong(timestamp).await?,
    }
    Ok(())
}
