use mongodb::Client;

/// True when the server answers a cheap metadata command.
///
/// Backs the `/ready` endpoint: a false return means server selection or the
/// round trip failed, not that a query was wrong.
pub async fn check_health(client: &Client) -> bool {
    client.list_database_names().await.is_ok()
}
