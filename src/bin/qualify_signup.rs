//! Runs one qualification against the live providers and prints the result.
//!
//! Usage: `qualify_signup <email> [--location <location>] [--source <signup source>]`

use clap::Parser;
use dotenvy::dotenv;
use signup_qualifier::config::Config;
use signup_qualifier::core::models::SignupAttributes;
use signup_qualifier::core::qualifier::Qualifier;
use signup_qualifier::integrations::hunter_client::HunterClient;
use signup_qualifier::integrations::openai_client::OpenAiClient;
use std::sync::Arc;
use std::time::Instant;

/// Command-line arguments for qualify_signup
#[derive(Parser, Debug)]
#[command(name = "qualify_signup")]
#[command(about = "Qualify one signup email against Hunter and OpenAI")]
#[command(version)]
struct Args {
    /// Email address to qualify
    email: String,

    /// Region the user entered at signup (e.g. "france")
    #[arg(long)]
    location: Option<String>,

    /// Signup source or referrer (e.g. "appsumo")
    #[arg(long, value_name = "SIGNUP SOURCE")]
    source: Option<String>,
}

impl Args {
    fn into_attributes(self) -> SignupAttributes {
        SignupAttributes {
            email: Some(self.email),
            location: self.location,
            signup_source: self.source,
            ..SignupAttributes::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let attributes = Args::parse().into_attributes();

    let config = Config::from_env()?;
    let hunter = Arc::new(HunterClient::from_config(&config)?);
    let openai = Arc::new(OpenAiClient::from_config(&config)?);
    let qualifier = Qualifier::new(hunter.clone(), hunter, openai);

    println!("Email:         {}", attributes.email.as_deref().unwrap_or("N/A"));
    println!("Location:      {}", attributes.location.as_deref().unwrap_or("N/A"));
    println!("Signup source: {}", attributes.signup_source.as_deref().unwrap_or("N/A"));

    let started = Instant::now();
    let result = qualifier.qualify(&attributes).await;
    let elapsed = started.elapsed();

    println!();
    println!("Bucket: {}", result.bucket);
    println!("Explanations:");
    for explanation in &result.explanation {
        println!("  - {}", explanation);
    }
    println!();
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
