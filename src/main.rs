use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use intent_gateway::voice::{AudioCapture, rms};
use intent_gateway::{
    ApiServerBuilder, Config, IntentClassifier, InteractionLog, MicrophoneTranscriber, Transcriber,
};

/// Intent Gateway - text and voice intent recognition service
#[derive(Parser)]
#[command(name = "intent-gateway", version, about)]
struct Cli {
    /// Address to bind (overrides `INTENT_HOST`)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides `INTENT_PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Capture one utterance and print its transcript and keyword intent
    Listen,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,intent_gateway=info",
        1 => "info,intent_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::Listen => listen(&config).await,
        };
    }

    let Config {
        api_server,
        store,
        api_keys,
        intent,
        voice,
    } = config;

    let host = cli.host.unwrap_or(api_server.host);
    let port = cli.port.unwrap_or(api_server.port);
    tracing::info!(host = %host, port, "starting intent gateway");

    let transcriber = MicrophoneTranscriber::from_config(&voice, &api_keys, &intent.base_url);
    let classifier = IntentClassifier::from_config(api_keys.openai, &intent);
    let interactions = InteractionLog::connect(&store.url, store.connect_timeout);

    ApiServerBuilder::new(classifier, interactions)
        .transcriber(Arc::new(transcriber))
        .host(host)
        .port(port)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Capture one utterance and report what the service would see
async fn listen(config: &Config) -> anyhow::Result<()> {
    let transcriber = MicrophoneTranscriber::from_config(
        &config.voice,
        &config.api_keys,
        &config.intent.base_url,
    );

    println!("Speak now...");
    let text = transcriber.transcribe().await;
    if text.is_empty() {
        anyhow::bail!("could not recognize speech");
    }

    println!("Recognized: {text}");
    println!("Intent:     {}", intent_gateway::intent::match_keywords(&text));
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::open()?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If RMS stayed near 0, check that the default input device is the one you expect.");

    Ok(())
}
