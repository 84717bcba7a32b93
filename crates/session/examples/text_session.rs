//! Run a short text-only practice session and print the summary.
//!
//! ```sh
//! cargo run -p roundtable-session --example text_session
//! ```

use std::time::Duration;

use roundtable_config::Settings;
use roundtable_scenario::scenario_by_id;
use roundtable_session::{PracticeSession, SessionEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roundtable_session=debug".into()),
        )
        .init();

    let scenario = scenario_by_id("party").ok_or("unknown scenario")?;
    let settings = Settings::load(None)?;

    let session = PracticeSession::builder(scenario)
        .settings(settings)
        .duration_secs(0)
        .start();

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::TurnAdded(turn) => println!("{}", turn.transcript_line()),
                SessionEvent::Ended => break,
                _ => {}
            }
        }
    });

    // Wait out the greeting, then exchange a couple of turns.
    tokio::time::sleep(Duration::from_secs(3)).await;
    session.send_text("Hi! I just moved to the neighborhood.")?;
    tokio::time::sleep(Duration::from_secs(11)).await;
    session.send_text("Mostly hiking and bad attempts at sourdough.")?;
    tokio::time::sleep(Duration::from_secs(11)).await;

    if let Some(summary) = session.end().await {
        println!(
            "\nsession over: {} user messages in {}s, score {}",
            summary.user_messages, summary.elapsed_secs, summary.score
        );
    }
    let _ = printer.await;
    Ok(())
}
