//! Line-oriented stdin front end for a running session.

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    animation::{AnimationFrame, BreathFrame, FrameLoopController},
    timer::commands as timer_commands,
    vibe_commands, AppState,
};

pub const HELP: &str = "\
commands:
  vibe <text>            classify a mood and apply it
  preset <id>            deep-work | standup | bug-hunt | code-review | ship-mode | learning | rest | calm
  start <minutes>        start a focus timer
  stop                   stop the timer
  toggle <name>          immersive | music | binaural | keys | breath
  ambience <ch> <0..1>   rain | cafe | white
  mute                   toggle audio mute
  key <key>              simulate a key press
  history                list recent vibes
  restore <index>        re-apply a history entry
  share                  print a share link for the current vibe
  open <url>             apply a shared vibe link
  theme <mode>           auto | day | night
  flag <name> <on|off>   historyPanel | breathOverlay | analogNoise
  hint <name>            dismiss a tool hint
  export                 print metrics as JSON
  status                 print session status
  frame                  print the latest animation frame
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Vibe(String),
    Preset(String),
    Start(u32),
    Stop,
    Toggle(String),
    Ambience { channel: String, level: f32 },
    Mute,
    Key(String),
    History,
    Restore(usize),
    Share,
    Open(String),
    Theme(String),
    Flag { name: String, value: bool },
    Hint(String),
    Export,
    Status,
    Frame,
    Help,
    Quit,
}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> Result<&'a str, String> {
    arg.filter(|value| !value.is_empty())
        .ok_or_else(|| format!("usage: {usage}"))
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((line, ""));
        let mut args = rest.split_whitespace();

        let command = match verb {
            "vibe" => ConsoleCommand::Vibe(required(Some(rest), "vibe <text>")?.to_string()),
            "preset" => ConsoleCommand::Preset(required(args.next(), "preset <id>")?.to_string()),
            "start" => {
                let minutes = required(args.next(), "start <minutes>")?;
                ConsoleCommand::Start(
                    minutes
                        .parse()
                        .map_err(|_| format!("'{minutes}' is not a number of minutes"))?,
                )
            }
            "stop" => ConsoleCommand::Stop,
            "toggle" => ConsoleCommand::Toggle(required(args.next(), "toggle <name>")?.to_string()),
            "ambience" => {
                let channel = required(args.next(), "ambience <channel> <level>")?.to_string();
                let level = required(args.next(), "ambience <channel> <level>")?;
                ConsoleCommand::Ambience {
                    channel,
                    level: level
                        .parse()
                        .map_err(|_| format!("'{level}' is not a level"))?,
                }
            }
            "mute" => ConsoleCommand::Mute,
            "key" => ConsoleCommand::Key(required(args.next(), "key <key>")?.to_string()),
            "history" => ConsoleCommand::History,
            "restore" => {
                let index = required(args.next(), "restore <index>")?;
                ConsoleCommand::Restore(
                    index
                        .parse()
                        .map_err(|_| format!("'{index}' is not a history index"))?,
                )
            }
            "share" => ConsoleCommand::Share,
            "open" => ConsoleCommand::Open(required(args.next(), "open <url>")?.to_string()),
            "theme" => ConsoleCommand::Theme(required(args.next(), "theme <mode>")?.to_string()),
            "flag" => {
                let name = required(args.next(), "flag <name> <on|off>")?.to_string();
                let value = match required(args.next(), "flag <name> <on|off>")? {
                    "on" | "true" => true,
                    "off" | "false" => false,
                    other => return Err(format!("'{other}' is not on or off")),
                };
                ConsoleCommand::Flag { name, value }
            }
            "hint" => ConsoleCommand::Hint(required(args.next(), "hint <name>")?.to_string()),
            "export" => ConsoleCommand::Export,
            "status" => ConsoleCommand::Status,
            "frame" => ConsoleCommand::Frame,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(command)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

/// "Inhale 40%" style caption for the breathing guide.
pub fn breath_caption(breath: &BreathFrame) -> String {
    format!("{} {:.0}%", breath.phase.label(), breath.progress * 100.0)
}

fn describe_frame(frame: &AnimationFrame) -> Result<String, String> {
    let json = to_json(frame)?;
    Ok(match &frame.breath {
        Some(breath) => format!("{}\n{json}", breath_caption(breath)),
        None => json,
    })
}

/// Runs one command and returns what should be printed.
pub async fn execute(
    state: &AppState,
    frames: &FrameLoopController,
    command: ConsoleCommand,
) -> Result<String, String> {
    match command {
        ConsoleCommand::Vibe(text) => Ok(match vibe_commands::submit_mood(state, &text).await? {
            Some(name) => format!("vibe: {name}"),
            None => String::new(),
        }),
        ConsoleCommand::Preset(id) => {
            let timer = timer_commands::apply_preset(state, &id).await?;
            let name = state.store.read(|store| store.current_vibe().name.clone());
            Ok(format!("vibe: {name} ({})", timer.display()))
        }
        ConsoleCommand::Start(minutes) => {
            let timer = timer_commands::start_timer(state, minutes).await?;
            Ok(format!("timer: {}", timer.display()))
        }
        ConsoleCommand::Stop => {
            timer_commands::stop_timer(state).await?;
            Ok("timer stopped".to_string())
        }
        ConsoleCommand::Toggle(name) => {
            let on = vibe_commands::toggle(state, &name)?;
            Ok(format!("{name}: {}", if on { "on" } else { "off" }))
        }
        ConsoleCommand::Ambience { channel, level } => {
            to_json(&vibe_commands::set_ambience(state, &channel, level)?)
        }
        ConsoleCommand::Mute => {
            let muted = crate::toggle_mute(state)?;
            Ok(if muted { "muted" } else { "unmuted" }.to_string())
        }
        ConsoleCommand::Key(key) => {
            vibe_commands::press_key(state, &key)?;
            Ok(String::new())
        }
        ConsoleCommand::History => Ok(vibe_commands::history(state)
            .into_iter()
            .map(|(index, entry)| {
                format!(
                    "[{index}] {} {}: {}",
                    entry.time, entry.vibe_name, entry.trigger_text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        ConsoleCommand::Restore(index) => Ok(if vibe_commands::restore_history(state, index)? {
            let name = state.store.read(|store| store.current_vibe().name.clone());
            format!("vibe: {name}")
        } else {
            format!("no history entry {index}")
        }),
        ConsoleCommand::Share => vibe_commands::share_vibe(state),
        ConsoleCommand::Open(link) => Ok(if vibe_commands::open_share_link(state, &link)? {
            let name = state.store.read(|store| store.current_vibe().name.clone());
            format!("vibe: {name}")
        } else {
            "link ignored".to_string()
        }),
        ConsoleCommand::Theme(mode) => to_json(&vibe_commands::set_theme_mode(state, &mode)?),
        ConsoleCommand::Flag { name, value } => {
            vibe_commands::set_feature_flag(state, &name, value)?;
            Ok(format!("{name}: {}", if value { "on" } else { "off" }))
        }
        ConsoleCommand::Hint(name) => {
            vibe_commands::dismiss_tool_hint(state, &name)?;
            Ok(format!("hint {name} dismissed"))
        }
        ConsoleCommand::Export => vibe_commands::export_metrics(state),
        ConsoleCommand::Status => to_json(&vibe_commands::status(state)),
        ConsoleCommand::Frame => match frames.latest() {
            Some(frame) => describe_frame(&frame),
            None => Ok("no frame yet".to_string()),
        },
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run_console(state: &AppState, frames: &FrameLoopController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        match execute(state, frames, command).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{output}"),
            Err(err) => {
                log::warn!("command failed: {}", err);
                eprintln!("error: {err}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::breath_at;

    #[test]
    fn parses_arguments() {
        assert_eq!(
            "vibe  chasing a flaky test ".parse(),
            Ok(ConsoleCommand::Vibe("chasing a flaky test".into()))
        );
        assert_eq!("start 25".parse(), Ok(ConsoleCommand::Start(25)));
        assert_eq!(
            "ambience rain 0.4".parse(),
            Ok(ConsoleCommand::Ambience {
                channel: "rain".into(),
                level: 0.4
            })
        );
        assert_eq!(
            "flag analogNoise off".parse(),
            Ok(ConsoleCommand::Flag {
                name: "analogNoise".into(),
                value: false
            })
        );
        assert_eq!("quit".parse(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn breath_caption_names_the_phase() {
        assert_eq!(breath_caption(&breath_at(2.0)), "Inhale 50%");
        assert_eq!(breath_caption(&breath_at(5.0)), "Hold 100%");
        assert_eq!(breath_caption(&breath_at(12.0)), "Exhale 50%");
    }

    #[test]
    fn rejects_bad_input() {
        assert!("vibe".parse::<ConsoleCommand>().is_err());
        assert!("start soon".parse::<ConsoleCommand>().is_err());
        assert!("ambience rain".parse::<ConsoleCommand>().is_err());
        assert!("flag analogNoise maybe".parse::<ConsoleCommand>().is_err());
        assert!("dance".parse::<ConsoleCommand>().is_err());
    }
}
