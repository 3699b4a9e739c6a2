pub mod apilayer;

pub use apilayer::ApilayerClient;
