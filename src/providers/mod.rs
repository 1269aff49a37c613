//! External capabilities the auditor delegates to
//!
//! Both capabilities are injected at construction and optional. A missing
//! speed provider leaves performance neutral; a missing or failing
//! recommendation provider is replaced by [`RuleBasedRecommender`].

pub mod pagespeed;
pub mod recommend;
pub mod speed;

pub use pagespeed::{parse_lighthouse, PageSpeedInsightsClient};
pub use recommend::{
    generate_recommendations, Impact, Priority, Recommendation, RecommendationProvider,
    RuleBasedRecommender,
};
pub use speed::{
    run_speed_check, Opportunity, SpeedInsightsProvider, SpeedReport, Strategy, StrategyAnalysis,
    StrategyMetrics,
};
