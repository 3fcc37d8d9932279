use std::io;

use tracing_subscriber::EnvFilter;
use youmail::{PhoneNumber, RawPhoneNumber, YouMailClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let number = std::env::args().nth(1).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "usage: lookup_carrier <phone number>")
    })?;
    let number: RawPhoneNumber = PhoneNumber::parse(None, number)?.into();

    // Carrier lookup works without an account.
    let client = YouMailClient::builder().build()?;
    let lookup = client.lookup_carrier(&number).await?;
    println!(
        "{number}: carrier {:?}, wireless={}",
        lookup.carrier.map(|carrier| carrier.name),
        lookup.is_wireless
    );

    Ok(())
}
