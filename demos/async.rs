use bigbutton::asynchronous::board::Board;
use bigbutton::config::ButtonConfig;
use bigbutton::{script, Result};

#[tokio::main]
pub async fn main() -> Result<()> {
    let config = ButtonConfig::default();
    let mut board = Board::connect(&config).await?;

    let show = script::demo_show();
    let played = tokio::select! {
        result = board.play(&show) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("interrupted");
            Ok(())
        }
    };

    board.close().await?;
    played
}
