use std::io;

use tracing_subscriber::EnvFilter;
use youmail::{Credentials, DataFormat, MessageQuery, YouMailClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = std::env::var("YOUMAIL_USERNAME").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "YOUMAIL_USERNAME environment variable is required",
        )
    })?;
    let password = std::env::var("YOUMAIL_PASSWORD").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "YOUMAIL_PASSWORD environment variable is required",
        )
    })?;

    let client = YouMailClient::builder()
        .credentials(Credentials::new(username, password)?)
        .format(DataFormat::Json)
        .build()?;

    for folder in client.list_folders().await? {
        println!(
            "{} ({}): {} entries, {} new",
            folder.name, folder.id, folder.entry_count, folder.new_entry_count
        );

        let query = MessageQuery::folder(folder.id).page(0, 20)?;
        for message in client.list_messages(&query).await? {
            println!(
                "  #{} from {:?} unread={}",
                message.id,
                message.caller_name.as_ref().or(message.caller_id.as_ref()),
                message.is_unread()
            );
        }
    }

    Ok(())
}
