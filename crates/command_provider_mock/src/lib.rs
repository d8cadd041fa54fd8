//! Local stand-ins for the `command_provider` contract.
//!
//! `JokeGenerator` picks a random programming joke after a simulated delay.
//! `ScriptedGenerator` replays caller-provided outcomes in order and is meant
//! for deterministic tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use command_provider::{BoxFuture, CommandError, CommandGenerator, CommandPresentation};
use rand::seq::SliceRandom;

const JOKES: [&str; 5] = [
    "Why don't programmers like nature? It has too many bugs!",
    "Why did the JavaScript developer wear glasses? Because he couldn't C#!",
    "What's a programmer's favorite place? The Foo Bar!",
    "Why do programmers always mix up Christmas and Halloween? Because Oct 31 == Dec 25!",
    "What did the AI say to the other AI? 01001000 01101001!",
];

/// Randomized joke generator with a fixed simulated latency.
#[derive(Debug, Clone)]
pub struct JokeGenerator {
    jokes: Vec<String>,
    latency: Duration,
}

impl JokeGenerator {
    const DEFAULT_LATENCY_MS: u64 = 1000;

    #[must_use]
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(Self::DEFAULT_LATENCY_MS))
    }

    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            jokes: JOKES.iter().map(|joke| joke.to_string()).collect(),
            latency,
        }
    }

    #[must_use]
    pub fn with_jokes(mut self, jokes: Vec<String>) -> Self {
        self.jokes = jokes;
        self
    }

    #[must_use]
    pub fn jokes(&self) -> &[String] {
        &self.jokes
    }
}

impl Default for JokeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandGenerator for JokeGenerator {
    fn generate(&self) -> BoxFuture<'static, Result<String, CommandError>> {
        let jokes = self.jokes.clone();
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            let joke = jokes.choose(&mut rand::thread_rng()).cloned();
            joke.ok_or(CommandError::Unavailable)
        })
    }
}

/// Replays queued outcomes, one per `generate` call.
///
/// Once the queue is drained every further call resolves to
/// [`CommandError::Unavailable`].
#[derive(Debug)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<String, CommandError>>>,
    latency: Duration,
    presentation: CommandPresentation,
    calls: Mutex<usize>,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new(outcomes: Vec<Result<String, CommandError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            latency: Duration::ZERO,
            presentation: CommandPresentation::default(),
            calls: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn succeeding(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(vec![Err(CommandError::failed(message))])
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_presentation(mut self, presentation: CommandPresentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// Number of `generate` calls observed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        *lock_unpoisoned(&self.calls)
    }
}

impl CommandGenerator for ScriptedGenerator {
    fn generate(&self) -> BoxFuture<'static, Result<String, CommandError>> {
        *lock_unpoisoned(&self.calls) += 1;
        let outcome = lock_unpoisoned(&self.outcomes)
            .pop_front()
            .unwrap_or(Err(CommandError::Unavailable));
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            outcome
        })
    }

    fn presentation(&self) -> CommandPresentation {
        self.presentation.clone()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
