//! Paywall products and the skill-dependent copy shown on the paywall screen.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::DjSkill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A subscription product as sold on the paywall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaywallProduct {
    pub period: BillingPeriod,
    pub price: Decimal,
}

/// Display-ready strings for one product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOffer {
    pub period: BillingPeriod,
    pub formatted_price: String,
    pub formatted_secondary_price: Option<String>,
    pub savings_text: Option<String>,
}

/// Products offered on the paywall, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaywallCatalog {
    pub currency_symbol: String,
    pub products: Vec<PaywallProduct>,
}

impl Default for PaywallCatalog {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            products: vec![
                PaywallProduct {
                    period: BillingPeriod::Yearly,
                    price: dec!(59.99),
                },
                PaywallProduct {
                    period: BillingPeriod::Monthly,
                    price: dec!(7.99),
                },
            ],
        }
    }
}

impl PaywallCatalog {
    pub fn new(
        currency_symbol: impl Into<String>,
        products: Vec<PaywallProduct>,
    ) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            products,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn format_amount(
        &self,
        amount: Decimal,
    ) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }

    fn monthly_reference(&self) -> Option<Decimal> {
        self.products
            .iter()
            .find(|p| p.period == BillingPeriod::Monthly)
            .map(|p| p.price)
    }

    /// Price of a yearly product spread over twelve months, truncated to cents.
    fn per_month(price: Decimal) -> Decimal {
        (price / Decimal::from(12)).round_dp_with_strategy(2, RoundingStrategy::ToZero)
    }

    /// Whole-percent saving of `yearly` against twelve months at `monthly`,
    /// rounded up. `None` when there is nothing to save.
    fn savings_percent(
        yearly: Decimal,
        monthly: Decimal,
    ) -> Option<u32> {
        let full_year = monthly * Decimal::from(12);
        let ratio = yearly.checked_div(full_year)?;
        let percent = ((Decimal::ONE - ratio) * Decimal::ONE_HUNDRED).ceil();
        if percent <= Decimal::ZERO {
            return None;
        }
        percent.to_u32()
    }

    /// Builds the display strings for every product.
    pub fn offers(&self) -> Vec<ProductOffer> {
        let monthly = self.monthly_reference();

        self.products
            .iter()
            .map(|product| {
                let yearly = product.period == BillingPeriod::Yearly;
                ProductOffer {
                    period: product.period,
                    formatted_price: self.format_amount(product.price),
                    formatted_secondary_price: yearly.then(|| {
                        format!(
                            "{} per month",
                            self.format_amount(Self::per_month(product.price))
                        )
                    }),
                    savings_text: monthly
                        .filter(|_| yearly)
                        .and_then(|m| Self::savings_percent(product.price, m))
                        .map(|percent| format!("SAVE {percent}%")),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaywallBanner {
    Standard,
    Pro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterAction {
    Terms,
    PrivacyPolicy,
    RestorePurchase,
}

impl FooterAction {
    pub fn all() -> &'static [FooterAction] {
        &[
            FooterAction::Terms,
            FooterAction::PrivacyPolicy,
            FooterAction::RestorePurchase,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Terms => "Terms",
            Self::PrivacyPolicy => "Privacy policy",
            Self::RestorePurchase => "Restore Purchase",
        }
    }
}

/// Everything the paywall screen shows for a given skill level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaywallContent {
    pub skill: DjSkill,
    pub banner: PaywallBanner,
    pub title: String,
    pub subtitle: String,
    pub bullet_points: Vec<String>,
    pub offers: Vec<ProductOffer>,
    pub footer_actions: Vec<FooterAction>,
}

impl PaywallContent {
    pub fn for_skill(
        skill: DjSkill,
        catalog: &PaywallCatalog,
    ) -> Self {
        let (banner, title, subtitle, bullet_points): (_, _, _, [&str; 3]) = match skill {
            DjSkill::New => (
                PaywallBanner::Standard,
                "No DJ Experience? No Problem!",
                "Mix your own tracks in minutes",
                [
                    "AI ensures smooth transitions between tracks",
                    "Machine learning suggests the next song to match your set",
                    "Learn with our fun, intuitive interface and built-in tutorials.",
                ],
            ),
            DjSkill::Amateur => (
                PaywallBanner::Standard,
                "Take Your DJing to the Next Level",
                "A refined toolkit for DJs looking to upgrade their performance.",
                [
                    "Intelligent beat detection syncs BPM and key instantly.",
                    "1000+ loops, FX and visuals",
                    "Learn with our fun, intuitive interface and built-in tutorials.",
                ],
            ),
            DjSkill::Professional => (
                PaywallBanner::Pro,
                "Elevate Your Sets with DJay Pro",
                "Professional-grade tools designed to enhance your performance and creativity.",
                [
                    "Advanced MIDI and hardware integration",
                    "1000+ loops, FX and visuals",
                    "High-resolution waveform display and beat/key matching.",
                ],
            ),
        };

        Self {
            skill,
            banner,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            bullet_points: bullet_points.iter().map(|s| s.to_string()).collect(),
            offers: catalog.offers(),
            footer_actions: FooterAction::all().to_vec(),
        }
    }
}
