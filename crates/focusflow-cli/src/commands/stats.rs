use focusflow_core::FocusFlow;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let app = FocusFlow::open()?;
    let stats = app.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Sessions:        {} ({} completed)", stats.total_sessions, stats.completed_sessions);
    println!("Focus time:      {} min", stats.total_focus_minutes);
    println!("Average session: {:.1} min", stats.average_session_minutes);
    println!("Completion rate: {:.0}%", stats.completion_rate);
    println!("Current streak:  {} day(s)", stats.current_streak);
    println!(
        "Today:           {} session(s), {} min",
        stats.today_sessions, stats.today_focus_minutes
    );
    Ok(())
}
