use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::game::Game;
use crate::gateway::{ClientLink, Gateway};
use crate::rng::RandomSource;
use crate::types::{Delivery, Direction};

const CLOSE_CODE_SLOW_CONSUMER: u16 = 4002;

/// Everything the hub reacts to, besides its own rank timer.
#[derive(Debug)]
pub enum GameEvent {
    Connected {
        client_id: String,
        link: ClientLink,
    },
    Moved {
        client_id: String,
        direction: Option<Direction>,
    },
    Disconnected {
        client_id: String,
    },
}

/// Owns the game and the gateway. Events are applied one at a time, so every
/// state change and the messages it produces are atomic with respect to
/// other clients.
#[derive(Debug)]
pub struct Hub<R> {
    game: Game<R>,
    gateway: Gateway,
}

impl<R: RandomSource> Hub<R> {
    pub fn new(game: Game<R>) -> Self {
        Self {
            game,
            gateway: Gateway::new(),
        }
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Connected { client_id, link } => {
                self.gateway.register(&client_id, link);
                let deliveries = self.game.connect(&client_id);
                tracing::info!(
                    client_id,
                    players = self.game.world().len(),
                    "player connected"
                );
                self.publish(deliveries);
            }
            GameEvent::Moved {
                client_id,
                direction,
            } => {
                let deliveries = self.game.apply_move(&client_id, direction);
                if deliveries.is_empty() {
                    tracing::debug!(client_id, ?direction, "ignored movement intent");
                }
                self.publish(deliveries);
            }
            GameEvent::Disconnected { client_id } => {
                self.gateway.unregister(&client_id);
                let deliveries = self.game.disconnect(&client_id);
                if !deliveries.is_empty() {
                    tracing::info!(
                        client_id,
                        players = self.game.world().len(),
                        "player disconnected"
                    );
                }
                self.publish(deliveries);
            }
        }
    }

    pub fn handle_rank_tick(&mut self) {
        let delivery = self.game.rank_tick();
        self.publish(vec![delivery]);
    }

    /// Dispatches deliveries in order. A client that cannot keep up is
    /// dropped and its departure is broadcast like a regular disconnect.
    fn publish(&mut self, deliveries: Vec<Delivery>) {
        let mut pending: VecDeque<Delivery> = deliveries.into();
        while let Some(delivery) = pending.pop_front() {
            for client_id in self.gateway.dispatch(&delivery) {
                self.gateway
                    .kick(&client_id, CLOSE_CODE_SLOW_CONSUMER, "outbound queue overflow");
                let departures = self.game.disconnect(&client_id);
                if !departures.is_empty() {
                    tracing::info!(client_id, "player dropped");
                }
                pending.extend(departures);
            }
        }
    }
}

/// Runs the hub until every event sender is gone.
pub async fn run_hub<R: RandomSource>(
    mut hub: Hub<R>,
    mut events: mpsc::Receiver<GameEvent>,
    rank_interval: Duration,
) {
    let mut ticker = interval_at(Instant::now() + rank_interval, rank_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                hub.handle_event(event);
            }
            _ = ticker.tick() => {
                hub.handle_rank_tick();
            }
        }
    }
    tracing::info!("game loop stopped");
}
