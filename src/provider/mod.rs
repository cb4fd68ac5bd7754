pub mod client;
pub mod aws_cli;
pub mod snapshot;
pub mod timeout;
pub mod router;

pub use client::*;
pub use aws_cli::{AwsCliProvider, AwsCliSettings, AwsCredentials};
pub use snapshot::{InventorySnapshot, SnapshotProvider};
pub use timeout::TimeoutProvider;
pub use router::{create_provider, ProviderKind, ProviderSettings};
