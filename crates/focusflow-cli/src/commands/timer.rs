use std::io::Write;

use clap::Subcommand;
use focusflow_core::{ChannelSubscriber, Config, Event, FocusFlow, TimerMode, TimerService};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::format_clock;

#[derive(Subcommand)]
pub enum TimerAction {
    /// List the available timer modes
    Modes,
    /// Run the timer in the foreground until interrupted
    Run {
        /// Preset name ("Pomodoro", "52/17", "Ultradian") or "Custom"
        #[arg(long)]
        mode: Option<String>,
        /// Custom work minutes (requires --break)
        #[arg(long, requires = "break_minutes")]
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        work: Option<u32>,
        /// Custom break minutes (requires --work)
        #[arg(long = "break", id = "break_minutes", requires = "work")]
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        break_minutes: Option<u32>,
        /// Stop after this many completed work sessions
        #[arg(long)]
        cycles: Option<u32>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Modes => {
            let config = Config::load()?;
            for mode in TimerMode::PRESETS {
                println!(
                    "{:<10} {:>3}/{:<3} {}",
                    mode.name(),
                    mode.work_minutes(),
                    mode.break_minutes(),
                    mode.description()
                );
            }
            match config.custom_mode() {
                Ok(custom) => println!(
                    "{:<10} {:>3}/{:<3} {}",
                    custom.name(),
                    custom.work_minutes(),
                    custom.break_minutes(),
                    custom.description()
                ),
                Err(e) => eprintln!("custom mode unavailable: {e}"),
            }
        }
        TimerAction::Run {
            mode,
            work,
            break_minutes,
            cycles,
        } => {
            let app = FocusFlow::open()?;
            let mode = resolve_mode(app.config(), mode.as_deref(), work, break_minutes)?;
            app.timer().set_mode(mode);

            let runtime = tokio::runtime::Runtime::new()?;
            let completed = runtime.block_on(run_loop(app.timer(), app.config(), cycles))?;

            let ledger = app.ledger();
            println!(
                "\n{completed} session(s) completed this run, {} total",
                ledger.completed_session_count()
            );
        }
    }
    Ok(())
}

fn resolve_mode(
    config: &Config,
    name: Option<&str>,
    work: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<TimerMode, Box<dyn std::error::Error>> {
    if let (Some(w), Some(b)) = (work, break_minutes) {
        return Ok(TimerMode::custom(w, b)?);
    }
    match name {
        Some(n) if n.eq_ignore_ascii_case("custom") => Ok(config.custom_mode()?),
        Some(n) => Ok(TimerMode::preset(n)?),
        None => Ok(config.default_mode()?),
    }
}

/// Drive the service until `cycles` work phases complete, stdin closes, or
/// ctrl-c. Returns the number of work phases completed.
async fn run_loop(
    timer: &TimerService,
    config: &Config,
    cycles: Option<u32>,
) -> Result<u32, Box<dyn std::error::Error>> {
    let (subscriber, mut events) = ChannelSubscriber::new();
    let sub_id = timer.subscribe(subscriber);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut completed = 0u32;

    println!("{} - press ctrl-c to stop", timer.mode());
    timer.start();

    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                timer.pause();
                break;
            }
        };
        let Some(event) = event else { break };

        match event {
            Event::TimerStarted {
                remaining_secs,
                is_work_phase,
                ..
            }
            | Event::TimerTick {
                remaining_secs,
                is_work_phase,
                ..
            } => {
                let label = if is_work_phase { "Focus" } else { "Break" };
                print!("\r{label} {}  ", format_clock(remaining_secs));
                std::io::stdout().flush()?;
            }
            Event::TimerCompleted { is_work_phase, .. } => {
                if config.notifications.sound_enabled {
                    print!("\x07");
                }
                if is_work_phase {
                    completed += 1;
                    println!("\rFocus session complete ({completed})");
                } else {
                    println!("\rBreak over");
                }
                if cycles.is_some_and(|n| completed >= n) {
                    break;
                }
                if !config.auto_start_after(is_work_phase) {
                    let next = if is_work_phase { "break" } else { "focus" };
                    println!("Press Enter to start the {next}");
                    let line = tokio::select! {
                        line = stdin.next_line() => line?,
                        _ = tokio::signal::ctrl_c() => break,
                    };
                    if line.is_none() {
                        break;
                    }
                }
                timer.start();
            }
            _ => {}
        }
    }

    timer.unsubscribe(sub_id);
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_durations_win_over_name() {
        let config = Config::default();
        let mode = resolve_mode(&config, Some("Ultradian"), Some(10), Some(2)).unwrap();
        assert_eq!(mode, TimerMode::custom(10, 2).unwrap());
    }

    #[test]
    fn custom_name_uses_configured_minutes() {
        let mut config = Config::default();
        config.timer.custom_work_minutes = 40;
        config.timer.custom_break_minutes = 8;
        let mode = resolve_mode(&config, Some("custom"), None, None).unwrap();
        assert_eq!(mode.work_minutes(), 40);
        assert_eq!(mode.break_minutes(), 8);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(resolve_mode(&Config::default(), Some("Tomato"), None, None).is_err());
        assert_eq!(
            resolve_mode(&Config::default(), None, None, None).unwrap(),
            TimerMode::Pomodoro
        );
    }
}
