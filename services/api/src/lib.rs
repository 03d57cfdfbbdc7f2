mod cli;
mod estimate;
mod infra;
mod routes;
mod server;

use estate_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
