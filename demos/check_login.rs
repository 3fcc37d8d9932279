use std::io;

use tracing_subscriber::EnvFilter;
use youmail::{Credentials, YouMailClient};

fn env(name: &str) -> io::Result<String> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let credentials = Credentials::new(env("YOUMAIL_USERNAME")?, env("YOUMAIL_PASSWORD")?)?;
    let client = YouMailClient::new(credentials)?;
    let mut changes = client.session().subscribe_authentication();

    client.login().await?;
    while let Ok(change) = changes.try_recv() {
        println!("token set: {}", change.token.is_some());
    }

    let account = client.get_account().await?;
    println!(
        "logged in as {:?} ({:?})",
        account.phone_number, account.email_address
    );

    Ok(())
}
