#[tokio::main]
async fn main() {
    gym_backend::run().await;
}
