use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Brokers unreachable at {brokers}: {source}")]
    BrokerUnreachable {
        brokers: String,
        #[source]
        source: rdkafka::error::KafkaError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
