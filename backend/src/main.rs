use thoughts_server::error::StartupError;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    thoughts_server::start_server().await
}
