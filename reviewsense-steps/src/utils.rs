use tracing::Level;

pub fn init_logging(json: bool) {
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(Level::INFO)
            .init();
    } else {
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .init();
    }
}
