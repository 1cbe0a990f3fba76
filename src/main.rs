use tundra::{
    publish_hello, Config, Entity, FleetPublisher, MqttTransport, ReadingsPublisher, Result,
    Transport,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tundra=info".parse().unwrap()),
        )
        .init();

    info!("Tundra v{} starting", tundra::VERSION);

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| {
        eprintln!("Usage: tundra <fleet|readings|hello> [config.yaml]");
        std::process::exit(1);
    });
    let config_path = args.next();

    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match mode.as_str() {
        "fleet" => run_fleet(&config).await,
        "readings" => run_readings(&config).await,
        "hello" => run_hello(&config).await,
        other => {
            eprintln!("Unknown mode '{}'", other);
            eprintln!("Usage: tundra <fleet|readings|hello> [config.yaml]");
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Publish simulated positions for the whole fleet, one broker connection
/// per entity as on the reference dashboard.
async fn run_fleet(config: &Config) -> Result<()> {
    let mut units = Vec::new();
    for spec in &config.fleet.entities {
        let mut entity = Entity::from_config(spec);
        entity.start();

        let client_id = format!("Client_Study_{}", entity.name());
        let transport = MqttTransport::connect(&config.mqtt, &client_id).await?;
        units.push((entity, transport));
    }

    let mut publisher = FleetPublisher::new(&config.fleet, units);

    tokio::select! {
        res = publisher.run() => {
            let stats = res?;
            info!(
                publishes = stats.publish_count,
                rounds = stats.rounds_completed,
                "Fleet run complete"
            );
        }
        _ = signal::ctrl_c() => {
            info!("OK. Shutting down.");
        }
    }

    publisher.shutdown().await
}

/// Publish the scalar readings sequence over a single connection.
async fn run_readings(config: &Config) -> Result<()> {
    let transport = MqttTransport::connect(&config.mqtt, "Client_for_Study").await?;
    let mut publisher = ReadingsPublisher::new(&config.readings, transport);

    tokio::select! {
        res = publisher.run() => {
            let stats = res?;
            info!(publishes = stats.publish_count, "Readings run complete");
        }
        _ = signal::ctrl_c() => {
            info!("OK. Shutting down.");
        }
    }

    publisher.shutdown().await
}

/// Publish a single hello envelope as a broker smoke test.
async fn run_hello(config: &Config) -> Result<()> {
    let transport = MqttTransport::connect(&config.mqtt, "Client_for_Study").await?;
    publish_hello(&transport, config.readings.assignment_num).await?;

    if transport.is_connected() {
        info!("Disconnecting");
        transport.disconnect().await?;
    }
    Ok(())
}
