//! Stack inventory: typed records, collaborator traits, hydration

pub mod api;
pub mod hydrate;
pub mod model;

pub use api::{StackApi, StorageApi};
pub use hydrate::{hydrate_fleet, hydrate_stack, BucketTagIndex, STACK_TAG_KEY};
pub use model::{BucketUsage, DatabaseInstance, HydratedStack, Instance, Stack, Volume};
