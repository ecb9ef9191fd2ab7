//! Quote a parcel against every enabled service and list the carriers.
//!
//! ```bash
//! export MELHOR_ENVIO_CLIENT_ID=1234
//! export MELHOR_ENVIO_CLIENT_SECRET=...
//! export MELHOR_ENVIO_REFRESH_TOKEN=...   # or MELHOR_ENVIO_CODE=... on first run
//! export MELHOR_ENVIO_APP_NAME="Minha Loja"
//! export MELHOR_ENVIO_EMAIL=dev@minhaloja.com.br
//! RUST_LOG=melhor_envio_auth=debug cargo run -p melhor-envio --example quote
//! ```

use melhor_envio::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SessionConfig::from_env("MELHOR_ENVIO")?.on_credentials_changed(|creds| {
        tracing::info!(expires_at = ?creds.expires_at, "credentials changed, persist the refresh token");
        Ok(())
    });
    let client = MelhorEnvio::new(config)?;
    client.connect().await?;

    let request = QuoteRequest::new("01001-000", "20040-020").with_product(Product {
        id: "camiseta".into(),
        dimensions: Dimensions::new(4.0, 12.0, 17.0),
        weight: 1.5,
        insurance_value: 49.9,
        quantity: 1,
    });

    let shipments = client.shipments();
    let (quotes, companies) =
        futures::future::try_join(shipments.quote(&request), shipments.companies()).await?;

    println!("{} carriers registered", companies.len());
    for quote in quotes {
        match (&quote.price, &quote.delivery_range, &quote.error) {
            (Some(price), Some(range), None) => println!(
                "{:>10} {:<12} R$ {:>8}  {}-{} days",
                quote.company.name, quote.name, price, range.min, range.max
            ),
            (_, _, Some(reason)) => {
                println!("{:>10} {:<12} unavailable: {reason}", quote.company.name, quote.name)
            }
            _ => println!("{:>10} {:<12} no price", quote.company.name, quote.name),
        }
    }

    client.shutdown();
    Ok(())
}
