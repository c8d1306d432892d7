//! Two simulated participants play a trivia room over one in-process store.
//!
//! Rose (the host) knows her trivia; Arthur guesses. Both race to answer
//! each round — whoever commits first holds the round, the other's tap is
//! quietly overtaken, and the room advances on its own a moment after each
//! resolution.

use std::sync::Arc;
use std::time::Duration;

use parlor::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

/// How a simulated participant picks an answer.
#[derive(Clone, Copy)]
enum Style {
    /// Always answers correctly.
    Studied,
    /// Picks a random choice.
    Guessing,
}

fn pick_answer(doc: &RoomDoc, style: Style) -> Option<ActionPayload> {
    let RoundItem::Question { choices, answer, .. } = doc.items.first()? else {
        return None;
    };
    let choice = match style {
        Style::Studied => *answer,
        Style::Guessing => rand::random_range(0..choices.len()),
    };
    Some(ActionPayload::Choose { choice })
}

/// One participant's event loop: react to snapshots until the game ends.
async fn play(
    name: &str,
    session: RoomSession<MemoryStore>,
    mut events: UnboundedReceiver<RoomEvent>,
    style: Style,
) -> Result<(), ParlorError> {
    let me = session.participant();
    let mut answered_round = None;

    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::Snapshot(doc) => match doc.phase {
                Phase::Waiting => {
                    tracing::info!(%name, room = %doc.code, "waiting for a buddy");
                }
                Phase::Active if answered_round != Some(doc.round) => {
                    answered_round = Some(doc.round);

                    // A short, uneven think time keeps the race honest.
                    tokio::time::sleep(Duration::from_millis(rand::random_range(10..80))).await;

                    let Some(payload) = pick_answer(&doc, style) else {
                        continue;
                    };
                    match session.submit(doc.round, payload).await? {
                        SubmitReceipt::Accepted { correct } => {
                            tracing::info!(%name, round = doc.round, correct, "got the answer in")
                        }
                        SubmitReceipt::Overtaken => {
                            tracing::info!(%name, round = doc.round, "buddy was faster")
                        }
                    }
                }
                Phase::Active => {}
                Phase::Resolved => {
                    if let Some(record) = &doc.action {
                        let who = if record.by == me { "me" } else { "buddy" };
                        tracing::info!(
                            %name,
                            round = doc.round,
                            by = who,
                            correct = record.correct,
                            "round resolved"
                        );
                    }
                }
                Phase::Finished => {
                    println!(
                        "[{name}] final score — me: {}, buddy: {}",
                        doc.score_of(me),
                        doc.peer_of(me).map(|p| doc.score_of(p)).unwrap_or(0),
                    );
                    session.leave().await?;
                    return Ok(());
                }
            },
            RoomEvent::PeerStale(peer) => {
                tracing::warn!(%name, %peer, "buddy seems to have wandered off");
            }
            RoomEvent::Gone => {
                tracing::info!(%name, "room is gone");
                return Ok(());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let sweeper = spawn_sweeper(Arc::clone(&store), RoomOptions::default());

    // Short rounds and a snappy advance so the demo finishes quickly.
    let options = RoomOptions {
        rounds: 3,
        resolve_delay: Duration::from_millis(500),
        ..Default::default()
    };

    let (rose, rose_events) = RoomSession::create(
        Arc::clone(&store),
        ParticipantId(1),
        GameKind::Trivia,
        options.clone(),
    )
    .await?;
    println!("Rose opened room {}", rose.code());

    let (arthur, arthur_events) = RoomSession::join(
        Arc::clone(&store),
        rose.code().clone(),
        ParticipantId(2),
        options,
    )
    .await?;

    let rose_task = tokio::spawn(play("rose", rose, rose_events, Style::Studied));
    let arthur_task = tokio::spawn(play("arthur", arthur, arthur_events, Style::Guessing));

    let (a, b) = tokio::join!(rose_task, arthur_task);
    a??;
    b??;

    sweeper.abort();
    Ok(())
}
