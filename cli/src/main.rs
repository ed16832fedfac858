use reqcraft::{config, Options, Session};
use tracing_subscriber::FmtSubscriber;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    dotenvy::dotenv().ok();

    let matches = config::command().get_matches();
    let options = Options::from_matches(&matches)?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(options.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(warning) = options.body_warning() {
        tracing::warn!("{warning}");
    }

    let mut session = Session::new(options.timeout)?;
    let mut spec = options.spec;

    for round in 1..=options.repeat {
        if options.repeat > 1 {
            println!("--- request {round} of {} ---", options.repeat);
        }
        println!("time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        let exchange = session.send(&spec).await;
        println!("{}", exchange.render_response());
        println!("checked at {}", chrono::Local::now().format("%H:%M:%S"));
        println!("{}", exchange.render_cookies());

        if let Some(cookies) = exchange.refreshed_cookies() {
            spec.cookies = cookies;
        }
    }

    Ok(())
}
