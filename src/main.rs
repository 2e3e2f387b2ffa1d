mod brcode;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use brcode::{Amount, PixPayload};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "pixcola", about = "Static PIX BR Code (copia e cola) generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a copia-e-cola payload from merchant data
    Generate {
        /// PIX key; falls back to the configured default
        #[arg(long)]
        key: Option<String>,
        /// Amount in BRL, e.g. 150.00; omit for an open-value code
        #[arg(long)]
        amount: Option<String>,
        /// Merchant display name
        #[arg(long)]
        name: Option<String>,
        /// Merchant city
        #[arg(long)]
        city: Option<String>,
        /// Reference label carried in the additional data field
        #[arg(long)]
        reference: Option<String>,
        /// Print the structured fields plus the payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a payload string and print its fields
    Decode {
        payload: String,
        #[arg(long)]
        json: bool,
    },
    /// Store merchant defaults in the config file
    Setup {
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
}

/// JSON view of a generated code: the decoded fields plus the payload
/// string itself.
#[derive(Serialize)]
struct GeneratedCode<'a> {
    #[serde(flatten)]
    fields: &'a PixPayload,
    brcode: &'a str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries nothing but the payload
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("pixcola=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate {
            key,
            amount,
            name,
            city,
            reference,
            json,
        } => generate(key, amount, name, city, reference, json),
        Command::Decode { payload, json } => decode(&payload, json),
        Command::Setup { key, name, city } => setup(key, name, city),
    }
}

fn generate(
    key: Option<String>,
    amount: Option<String>,
    name: Option<String>,
    city: Option<String>,
    reference: Option<String>,
    json: bool,
) -> Result<()> {
    let config = AppConfig::load();

    let key = key.or(config.pix_key).context(
        "PIX key not configured; pass --key or run `pixcola setup --key <KEY>`",
    )?;
    let amount = amount.as_deref().map(str::parse::<Amount>).transpose()?;
    let name = name.or(config.merchant_name);
    let city = city.or(config.merchant_city);

    let payload = PixPayload::with_details(
        key,
        amount,
        name.as_deref(),
        city.as_deref(),
        reference.as_deref(),
    )?;
    let encoded = payload.encode()?;

    // Re-derive the fields from our own output before handing it out
    let fields = PixPayload::decode(&encoded)?;
    debug!("Generated {} byte payload, checksum verified", encoded.len());

    if json {
        let view = GeneratedCode {
            fields: &fields,
            brcode: &encoded,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{encoded}");
    }
    Ok(())
}

fn decode(payload: &str, json: bool) -> Result<()> {
    let decoded = PixPayload::decode(payload.trim())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        println!("pix key:   {}", decoded.pix_key);
        println!("merchant:  {}", decoded.merchant_name);
        println!("city:      {}", decoded.merchant_city);
        match &decoded.amount {
            Some(amount) => println!("amount:    {amount}"),
            None => println!("amount:    (open value)"),
        }
        println!("reference: {}", decoded.reference);
    }
    info!("Checksum OK");
    Ok(())
}

fn setup(key: Option<String>, name: Option<String>, city: Option<String>) -> Result<()> {
    if key.is_none() && name.is_none() && city.is_none() {
        bail!("nothing to store; pass --key, --name or --city");
    }

    let mut config = AppConfig::load();
    if key.is_some() {
        config.pix_key = key;
    }
    if name.is_some() {
        config.merchant_name = name;
    }
    if city.is_some() {
        config.merchant_city = city;
    }
    config.save()?;
    println!("Defaults written to {}", AppConfig::path().display());
    Ok(())
}
