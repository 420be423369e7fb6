use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

const PING_ATTEMPTS: u32 = 5;
const FIRST_RETRY: Duration = Duration::from_millis(250);
const LAST_RETRY: Duration = Duration::from_secs(4);

/// Build a client and wait until the server answers a ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut retry_in = FIRST_RETRY;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok((client, database)),
            Err(source) => {
                attempts += 1;
                if attempts >= PING_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing { attempts, source });
                }
                debug!(attempts, error = %source, "MongoDB ping failed; retrying");
                sleep(retry_in).await;
                retry_in = (retry_in * 2).min(LAST_RETRY);
            }
        }
    }
}
