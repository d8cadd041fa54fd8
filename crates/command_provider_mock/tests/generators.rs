use std::time::Duration;

use command_provider::{CommandError, CommandGenerator, CommandPresentation};
use command_provider_mock::{JokeGenerator, ScriptedGenerator};

#[tokio::test]
async fn joke_generator_returns_one_of_its_jokes() {
    let generator = JokeGenerator::with_latency(Duration::from_millis(1));
    let joke = generator.generate().await.expect("joke should be generated");
    assert!(generator.jokes().contains(&joke));
}

#[tokio::test]
async fn joke_generator_without_jokes_is_unavailable() {
    let generator = JokeGenerator::with_latency(Duration::ZERO).with_jokes(Vec::new());
    let result = generator.generate().await;
    assert_eq!(result, Err(CommandError::Unavailable));
}

#[tokio::test]
async fn scripted_generator_replays_outcomes_in_order() {
    let generator = ScriptedGenerator::new(vec![
        Ok("first".to_string()),
        Err(CommandError::failed("second")),
    ]);

    assert_eq!(generator.generate().await, Ok("first".to_string()));
    assert_eq!(
        generator.generate().await,
        Err(CommandError::failed("second"))
    );
    assert_eq!(generator.generate().await, Err(CommandError::Unavailable));
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn outcome_is_fixed_when_generate_is_called() {
    let generator = ScriptedGenerator::new(vec![Ok("a".to_string()), Ok("b".to_string())])
        .with_latency(Duration::from_millis(5));

    let first = generator.generate();
    let second = generator.generate();

    assert_eq!(second.await, Ok("b".to_string()));
    assert_eq!(first.await, Ok("a".to_string()));
}

#[test]
fn scripted_generator_exposes_custom_presentation() {
    let presentation = CommandPresentation::new("…", "> ", "nope");
    let generator = ScriptedGenerator::succeeding("x").with_presentation(presentation.clone());
    assert_eq!(generator.presentation(), presentation);
}
