use std::sync::Arc;

use anyhow::Context;
use axon_core::types::{
    EmbeddingInput, Message, ModelParameters, Role, SpeechInput, TranscriptionInput, UnifiedResponse,
};
use axon_core::{EventStream, NoopHooks, Provider, RequestContext};
use tokio::io::AsyncWriteExt;

use crate::args::{ChatArgs, Command, EmbedArgs, SpeechArgs, TranscribeArgs};

pub async fn run(provider: &dyn Provider, ctx: &RequestContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Chat(args) => chat(provider, ctx, args).await,
        Command::Embed(args) => embed(provider, ctx, args).await,
        Command::Speech(args) => speech(provider, ctx, args).await,
        Command::Transcribe(args) => transcribe(provider, ctx, args).await,
    }
}

async fn chat(provider: &dyn Provider, ctx: &RequestContext, args: ChatArgs) -> anyhow::Result<()> {
    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(Message::text(Role::System, system));
    }
    messages.push(Message::text(Role::User, args.prompt));

    let params = ModelParameters {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        ..Default::default()
    };

    if args.stream {
        let events = provider
            .chat_completion_stream(ctx, Arc::new(NoopHooks), &args.model, &messages, Some(&params))
            .await?;
        return print_events(events, |_| {}).await;
    }

    let response = provider
        .chat_completion(ctx, &args.model, &messages, Some(&params))
        .await?;
    print_json(&response)
}

async fn embed(provider: &dyn Provider, ctx: &RequestContext, args: EmbedArgs) -> anyhow::Result<()> {
    let input = match <[String; 1]>::try_from(args.input) {
        Ok([single]) => EmbeddingInput::Single(single),
        Err(many) => EmbeddingInput::Multiple(many),
    };

    let params = ModelParameters {
        dimensions: args.dimensions,
        encoding_format: args.encoding_format,
        ..Default::default()
    };

    let response = provider.embedding(ctx, &args.model, &input, Some(&params)).await?;
    print_json(&response)
}

async fn speech(provider: &dyn Provider, ctx: &RequestContext, args: SpeechArgs) -> anyhow::Result<()> {
    let input = SpeechInput {
        input: args.input,
        voice: args.voice,
        instructions: args.instructions,
        response_format: args.format,
    };

    let mut file = tokio::fs::File::create(&args.output)
        .await
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    if args.stream {
        let events = provider
            .speech_stream(ctx, Arc::new(NoopHooks), &args.model, &input, None)
            .await?;

        let mut audio = Vec::new();
        print_events(events, |response| {
            if let Some(speech) = response.speech.as_mut() {
                audio.append(&mut speech.audio);
            }
        })
        .await?;

        file.write_all(&audio).await?;
    } else {
        let mut response = provider.speech(ctx, &args.model, &input, None).await?;
        if let Some(speech) = response.speech.as_mut() {
            file.write_all(&speech.audio).await?;
            speech.audio.clear();
        }
        print_json(&response)?;
    }

    file.flush().await?;
    tracing::info!(path = %args.output.display(), "audio written");

    Ok(())
}

async fn transcribe(provider: &dyn Provider, ctx: &RequestContext, args: TranscribeArgs) -> anyhow::Result<()> {
    let file = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let input = TranscriptionInput {
        file,
        language: args.language,
        prompt: args.prompt,
        response_format: args.response_format,
    };

    if args.stream {
        let events = provider
            .transcription_stream(ctx, Arc::new(NoopHooks), &args.model, &input, None)
            .await?;
        return print_events(events, |_| {}).await;
    }

    let response = provider.transcription(ctx, &args.model, &input, None).await?;
    print_json(&response)
}

/// Print every event as one JSON line; a terminal error fails the command
///
/// `inspect` sees each response before it is printed.
async fn print_events<F>(mut events: EventStream, mut inspect: F) -> anyhow::Result<()>
where
    F: FnMut(&mut UnifiedResponse),
{
    while let Some(mut event) = events.recv().await {
        if let Some(error) = event.as_error() {
            print_json(&event)?;
            anyhow::bail!("stream failed: {error}");
        }

        if let Some(response) = event.as_response_mut() {
            inspect(response);
        }
        print_json(&event)?;

        if event.stream_end {
            break;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

