use anyhow::Result;
use futures::TryStreamExt;
use serde_json::json;
use vulcan::chat::ChatSession;
use vulcan::personas::spock_chat;
use vulcan::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig};
use vulcan::providers::factory::get_provider;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANSWER: &str = "Spock is Kirk's closest friend. Logically.";

fn openai_session(host: String) -> Result<ChatSession> {
    let provider = get_provider(ProviderConfig::OpenAi(OpenAiProviderConfig {
        host,
        api_key: None,
        model: "ai/qwen2.5:latest".to_string(),
        temperature: Some(0.0),
        max_tokens: None,
    }))?;
    Ok(spock_chat(provider))
}

fn ollama_session(host: String) -> Result<ChatSession> {
    let provider = get_provider(ProviderConfig::Ollama(OllamaProviderConfig {
        host,
        model: "qwen2.5:0.5b".to_string(),
        temperature: Some(0.0),
        max_tokens: None,
    }))?;
    Ok(spock_chat(provider))
}

async fn openai_server() -> MockServer {
    let server = MockServer::start().await;
    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Spock is Kirk's\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" closest friend.\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" Logically.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": ANSWER}}]
        })))
        .with_priority(2)
        .mount(&server)
        .await;
    server
}

async fn ollama_server() -> MockServer {
    let server = MockServer::start().await;
    let ndjson = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Spock is\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\" Kirk's closest friend.\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\" Logically.\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(
            json!({"stream": false, "options": {"temperature": 0.0}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": ANSWER},
            "done": true
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_openai_deterministic_at_zero_temperature() -> Result<()> {
    let server = openai_server().await;
    let session = openai_session(server.uri())?;

    let first = session.complete("Who is Kirk's best friend?").await?;
    let second = session.complete("Who is Kirk's best friend?").await?;
    assert_eq!(first, second);
    assert_eq!(first, ANSWER);
    Ok(())
}

#[tokio::test]
async fn test_openai_stream_matches_complete() -> Result<()> {
    let server = openai_server().await;
    let session = openai_session(server.uri())?;

    let complete = session.complete("Who is Kirk's best friend?").await?;
    let fragments: Vec<String> = session
        .stream("Who is Kirk's best friend?")
        .await?
        .try_collect()
        .await?;

    assert!(fragments.len() > 1);
    assert_eq!(fragments.concat(), complete);
    Ok(())
}

#[tokio::test]
async fn test_ollama_deterministic_at_zero_temperature() -> Result<()> {
    let server = ollama_server().await;
    let session = ollama_session(server.uri())?.with_streaming(false);

    let first = session.send("Who is Kirk's best friend?").await?.into_text().await?;
    let second = session.send("Who is Kirk's best friend?").await?.into_text().await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_ollama_stream_matches_complete() -> Result<()> {
    let server = ollama_server().await;
    let session = ollama_session(server.uri())?;

    let complete = session.complete("Who is Kirk's best friend?").await?;
    let streamed = session.send("Who is Kirk's best friend?").await?.into_text().await?;
    assert_eq!(streamed, complete);
    Ok(())
}

#[tokio::test]
async fn test_session_sends_persona_then_context() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "system"},
                {"role": "user", "content": "Who is Khan?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "A superhuman."},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ollama_session(server.uri())?;
    assert_eq!(session.complete("Who is Khan?").await?, "A superhuman.");
    Ok(())
}
