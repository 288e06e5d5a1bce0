mod dj_skill;
mod paywall;

pub use dj_skill::DjSkill;
pub use paywall::{
    BillingPeriod, FooterAction, PaywallBanner, PaywallCatalog, PaywallContent, PaywallProduct,
    ProductOffer,
};
