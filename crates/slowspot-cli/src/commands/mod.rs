pub mod breathe;
pub mod instructions;
pub mod prefs;
pub mod prepare;

use slowspot_core::Event;

/// Print one event as a JSON line on stdout.
pub fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn emit_all(events: &[Event]) -> Result<(), serde_json::Error> {
    events.iter().try_for_each(emit)
}

/// Single-threaded runtime for the real-time commands. The flow's timers are
/// `!Send`, so everything runs on the current thread.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

/// Sleep until `deadline`, or forever when there is none.
pub async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
