use bytes::Bytes;
use reqwest::Client;
use url::Url;

use super::types::FetchError;

pub async fn fetch_feed(client: &Client, url: &str) -> Result<Bytes, FetchError> {
    let url = Url::parse(url)?;
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(resp.bytes().await?)
}
