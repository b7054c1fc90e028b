pub mod anti_targeting;
pub mod caps;
pub mod chain;
pub mod conversion;
pub mod daypart;
pub mod dismissed;
pub mod marked_inappropriate;
pub mod rule;
pub mod split_test;
pub mod subdivision;
pub mod transferred;

pub use chain::ExclusionRuleChain;
pub use rule::ExclusionRule;
