pub mod adapters;
pub mod anti_targeting;
pub mod subdivision;

pub use anti_targeting::AntiTargetingResource;
pub use subdivision::SubdivisionTargetingResource;
