/*
[INPUT]:  Symbol and interval from the command line
[OUTPUT]: Kline updates printed until Ctrl-C or the first five events
[POS]:    Examples - kline stream handling
[UPDATE]: When WebSocket API changes
*/

use binance_wss_adapter::*;
use futures_util::StreamExt;

/// Example: consume a kline stream without the CLI driver
///
/// Usage: cargo run -p binance-wss-adapter --example stream_klines -- ethusdt 1s
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let symbol = args.next().unwrap_or_else(|| "btcusdt".to_string());
    let interval = args.next().unwrap_or_else(|| "1m".to_string());
    let target = SubscriptionTarget::new(symbol, interval)?;

    let ws = KlineWebSocket::new();
    let session = ws.open(&target).await?;
    println!("connected to {}", session.url());

    let (messages, mut errors, stop) = session.into_parts();
    let mut first_five = messages.take(5);

    loop {
        tokio::select! {
            event = first_five.next() => match event {
                Some(event) => println!("{event}"),
                None => break,
            },
            Some(err) = errors.recv() => return Err(err),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    stop.stop().await;
    println!("stream closed");
    Ok(())
}
