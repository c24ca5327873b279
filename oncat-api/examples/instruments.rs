use oncat_api::{Client, OncatApiError, Request};

#[tokio::main]
pub async fn main() -> Result<(), OncatApiError> {
    let client = Client::new("https://oncat.ornl.gov", "access_token");

    let req = Request::instruments().list().facility("SNS");

    let _res = client.send(req).await?;
    Ok(())
}
