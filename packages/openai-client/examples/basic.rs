//! Basic OpenAI client usage example

use openai_client::{ChatRequest, Message, OpenAIClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize from environment
    let client = OpenAIClient::from_env()?;

    let response = client
        .chat_completion(
            ChatRequest::new("gpt-3.5-turbo")
                .message(Message::system(""))
                .message(Message::user(
                    "Suggest 3 alternative search terms for 'waste graphite'. \
                     Return them as a comma-separated list.",
                ))
                .temperature(0.7)
                .presence_penalty(0.7)
                .max_tokens(50),
        )
        .await?;

    println!("Response: {}", response.content);
    if let Some(usage) = response.usage {
        println!("Tokens used: {}", usage.total_tokens);
    }

    Ok(())
}
