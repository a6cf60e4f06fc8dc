//! `switchyard classify` — Run only the classifier and print the route.

use switchyard_core::ConversationState;
use switchyard_core::message::Message;

use super::{build_classifier, load_config};

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let registry = switchyard_providers::build_from_config(&config);
    let classifier = build_classifier(&config, &registry)?;

    let state = ConversationState::from_messages(vec![Message::user(message)]);
    let route = classifier.classify(&state).await?;

    println!("{route}");
    Ok(())
}
