//! Vemix Web CLI
//!
//! Runs the RevenueCat webhook receiver and drives the Veo proxy from the
//! command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use base64::Engine;
use clap::{Parser, Subcommand};

use vemix_web::config::{ProxyConfig, VertexConfig, WebhookConfig};
use vemix_web::cors::{cors_layer, cors_layer_permissive};
use vemix_web::handlers::{app_router, ServiceInfo};
use vemix_web::veo::{
    FetchOperationRequest, ImageInput, PersonGeneration, ProxyState, VeoClient, VeoModel,
    VideoGenerationRequest, VideoInstance, VideoParameters,
};
use vemix_web::webhook::{CreditPolicy, EventProcessor, LoggingHandler, WebhookState};
use vemix_web::WebhookPayload;

/// Vemix Web
#[derive(Parser, Debug)]
#[command(name = "vemix-web")]
#[command(author = "Vemix Team")]
#[command(version)]
#[command(about = "RevenueCat webhook receiver and Veo proxy client")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Proxy base URL (overrides VEO_PROXY_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the webhook receiver and the Veo proxy endpoints
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Only allow localhost origins
        #[arg(long)]
        strict_cors: bool,
    },

    /// Start a video generation through the proxy
    Generate {
        /// Text prompt
        #[arg(short, long)]
        prompt: String,

        /// First-frame image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// MIME type of the image
        #[arg(long, default_value = "image/jpeg")]
        mime_type: String,

        /// Model: veo2, veo3 or veo3-fast
        #[arg(short, long, default_value = "veo3-fast")]
        model: VeoModel,

        #[arg(long, default_value = "16:9")]
        aspect_ratio: String,

        /// Clip length in seconds
        #[arg(long, default_value = "8")]
        duration: u32,

        #[arg(long)]
        seed: Option<u32>,

        #[arg(long)]
        negative_prompt: Option<String>,

        /// Generate an audio track (Veo 3 only)
        #[arg(long)]
        generate_audio: bool,

        /// allow_adult, dont_allow or allow_all
        #[arg(long, default_value = "allow_adult")]
        person_generation: PersonGeneration,
    },

    /// Poll a long-running generation
    Check {
        /// Operation name returned by `generate`
        operation_name: String,
    },

    /// Decode a webhook payload file and print a summary
    Inspect {
        /// JSON file containing one delivery
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut proxy = ProxyConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        proxy = proxy.with_base_url(base_url);
    }

    match args.command {
        Command::Serve {
            port,
            host,
            strict_cors,
        } => serve(port, host, strict_cors).await,
        Command::Generate {
            prompt,
            image,
            mime_type,
            model,
            aspect_ratio,
            duration,
            seed,
            negative_prompt,
            generate_audio,
            person_generation,
        } => {
            let image = match image {
                Some(path) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    Some(ImageInput {
                        bytes_base64_encoded: Some(
                            base64::engine::general_purpose::STANDARD.encode(bytes),
                        ),
                        gcs_uri: None,
                        mime_type,
                    })
                }
                None => None,
            };

            let request = VideoGenerationRequest {
                instances: vec![VideoInstance {
                    prompt: Some(prompt),
                    image,
                }],
                parameters: Some(VideoParameters {
                    aspect_ratio,
                    duration_seconds: duration,
                    generate_audio: generate_audio.then_some(true),
                    person_generation,
                    negative_prompt,
                    seed,
                    ..VideoParameters::default()
                }),
            };

            proxy.validate()?;
            let client = VeoClient::new(proxy)?;
            let operation = client.generate_video(model, &request).await?;
            tracing::info!(model = %model, "Generation started");
            println!("{}", operation.name);
            Ok(())
        }
        Command::Check { operation_name } => {
            proxy.validate()?;
            let client = VeoClient::new(proxy)?;
            let status = client
                .fetch_operation(&FetchOperationRequest::new(operation_name))
                .await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Command::Inspect { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let payload = WebhookPayload::from_bytes(&bytes)?;
            let event = &payload.event;

            println!("api_version: {}", payload.api_version);
            println!("type:        {}", event.event_type());
            println!("id:          {}", event.id());
            println!("app_user_id: {}", event.base.app_user_id);
            if let Some(timestamp) = event.timestamp() {
                println!("timestamp:   {}", timestamp.to_rfc3339());
            }
            if let Some(product_id) = event.product_id() {
                println!("product_id:  {}", product_id);
            }
            if let Some(environment) = event.environment() {
                println!("environment: {:?}", environment);
            }
            if let Some(renewal) = event.as_renewal() {
                let credits = CreditPolicy::default()
                    .credits_for(&renewal.product_id)
                    .unwrap_or(0);
                println!("credits:     {}", credits);
            }
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>, host: Option<String>, strict_cors: bool) -> anyhow::Result<()> {
    let mut config = WebhookConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    let vertex = VertexConfig::from_env()?;

    let processor = EventProcessor::new(Arc::new(LoggingHandler), CreditPolicy::default());
    let cors = if strict_cors {
        cors_layer()
    } else {
        cors_layer_permissive()
    };
    let app = app_router(
        Arc::new(WebhookState::new(processor)),
        Arc::new(ProxyState::new(vertex.clone())?),
        ServiceInfo::from_config(&config, &vertex),
        cors,
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        project_id = %vertex.project_id,
        region = %vertex.region,
        strict_cors,
        "{} v{} listening on {}",
        vemix_web::NAME,
        vemix_web::VERSION,
        addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}
