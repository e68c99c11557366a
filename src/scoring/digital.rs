use super::curves::clamp_score;
use super::kpi::{Kpi, KpiKey};
use crate::dossier::Dossier;

const REVIEW_CAP: f64 = 200.0;
const FOLLOWER_CAP: f64 = 5000.0;

/// Digital signals are always computable; absent values are zero.
pub fn digital_kpis(dossier: &Dossier) -> Vec<Kpi> {
    let d = &dossier.digital;

    let reputation = d.star_rating / 5.0 * 100.0;
    let reviews = clamp_score(d.review_count / REVIEW_CAP * 100.0);
    let followers = clamp_score(d.follower_count / FOLLOWER_CAP * 100.0);
    let sentiment = (d.sentiment + 1.0) / 2.0 * 100.0;

    vec![
        Kpi::scored(KpiKey::Reputation, reputation, reputation),
        Kpi::scored(KpiKey::ReviewVolume, reviews, reviews),
        Kpi::scored(KpiKey::Engagement, followers, followers),
        Kpi::scored(KpiKey::Sentiment, sentiment, sentiment),
    ]
}
