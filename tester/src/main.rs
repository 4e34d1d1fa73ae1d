use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server to exercise
    #[arg(long, env = "TESTER_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// How many likes to send
    #[arg(long, default_value_t = 3)]
    likes: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let base = args.base_url.trim_end_matches('/');

    let guide = client.get(format!("{base}/")).send().await?;
    ensure!(guide.status() == StatusCode::OK, "guide: {}", guide.status());
    println!("Guide OK");

    let created = expect(
        client
            .post(format!("{base}/thoughts"))
            .json(&json!({ "message": "Hello from the tester!", "name": "tester" })),
        StatusCode::CREATED,
    )
    .await?;
    let id = created["response"]["_id"]
        .as_str()
        .context("created thought has no _id")?
        .to_string();
    println!("Created thought {id}");

    let rejected = client
        .post(format!("{base}/thoughts"))
        .json(&json!({ "message": "hey", "name": "tester" }))
        .send()
        .await?;
    ensure!(
        rejected.status() == StatusCode::BAD_REQUEST,
        "short message: {}",
        rejected.status()
    );
    println!("Short message rejected");

    for _ in 0..args.likes {
        expect(
            client.post(format!("{base}/thoughts/{id}/like")),
            StatusCode::CREATED,
        )
        .await?;
    }

    let listed = expect(client.get(format!("{base}/thoughts")), StatusCode::OK).await?;
    let thoughts = listed["response"]
        .as_array()
        .context("listing is not an array")?;
    println!("Listed {} thoughts", thoughts.len());

    let Some(thought) = thoughts.iter().find(|t| t["_id"] == id.as_str()) else {
        bail!("thought {id} missing from listing");
    };
    ensure!(
        thought["likes"] == args.likes,
        "expected {} likes, got {}",
        args.likes,
        thought["likes"]
    );
    println!("Likes: {}", thought["likes"]);

    expect(
        client.delete(format!("{base}/thoughts/{id}/delete")),
        StatusCode::OK,
    )
    .await?;
    expect(
        client.delete(format!("{base}/thoughts/{id}/delete")),
        StatusCode::NOT_FOUND,
    )
    .await?;
    println!("Deleted thought {id}");

    println!("All checks passed");
    Ok(())
}

async fn expect(request: reqwest::RequestBuilder, status: StatusCode) -> Result<Value> {
    let response = request.send().await?;
    let actual = response.status();
    let body: Value = response.json().await?;

    ensure!(actual == status, "expected {status}, got {actual}: {body}");
    Ok(body)
}
