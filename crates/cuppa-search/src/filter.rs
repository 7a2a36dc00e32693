//! Progressive filtering of enriched shops.

use std::fmt;

use chrono::{DateTime, Utc};
use cuppa_core::{haversine_km, Coordinates, FilterSet, Shop};
use serde::Serialize;

use crate::hours::{is_open_now, matches_open_after};

const RELAXED_MESSAGE: &str = "We couldn't find an exact match, but here are some nearby \
                               alternatives that may be closed right now.";

/// One narrowing step, in the order the pipeline applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    OpenNow,
    OpenAfter,
    Pets,
    Wifi,
    Charger,
    Price,
    Distance,
    MinRating,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OpenNow => "open now",
            Self::OpenAfter => "open late enough",
            Self::Pets => "pet friendly",
            Self::Wifi => "Wi-Fi",
            Self::Charger => "charging outlets",
            Self::Price => "price",
            Self::Distance => "distance",
            Self::MinRating => "rating",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: FilterStage,
    pub remaining: usize,
}

/// How many shops survived each active stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub input: usize,
    pub stages: Vec<StageCount>,
    /// Set when the open-now stage was dropped to find alternatives.
    pub relaxed: bool,
}

impl FilterReport {
    /// The first active stage that left nothing behind.
    #[must_use]
    pub fn first_emptied(&self) -> Option<FilterStage> {
        self.stages
            .iter()
            .find(|count| count.remaining == 0)
            .map(|count| count.stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterNotice {
    /// Open-now was dropped; the shops may be closed.
    Relaxed,
    /// Nothing survived. `stage` is `None` when there were no candidates to filter.
    NoMatches { stage: Option<FilterStage> },
}

impl FilterNotice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Relaxed => RELAXED_MESSAGE.to_string(),
            Self::NoMatches { stage: Some(stage) } => {
                format!("No cafés matched your search once we filtered by {stage}.")
            }
            Self::NoMatches { stage: None } => "No cafés matched your search.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub shops: Vec<Shop>,
    pub notice: Option<FilterNotice>,
    pub report: FilterReport,
}

/// Narrow `shops` by every predicate present in `filters`, then apply the
/// requested count.
///
/// When open-now is required and nothing survives, the stages are re-run
/// without it; a non-empty relaxed result is returned with
/// [`FilterNotice::Relaxed`]. A filter set with every field absent returns
/// the input unchanged.
#[must_use]
pub fn apply_filters(
    shops: Vec<Shop>,
    filters: &FilterSet,
    anchor: Coordinates,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let input = shops.len();
    let fallback = (filters.requires_open_now() && input > 0).then(|| shops.clone());

    let (strict, report) = run_stages(shops, filters, anchor, now);
    if !strict.is_empty() {
        return finish(strict, None, report, filters.count);
    }

    if let Some(shops) = fallback {
        let (relaxed, mut relaxed_report) =
            run_stages(shops, &filters.without_open_now(), anchor, now);
        if !relaxed.is_empty() {
            tracing::debug!(
                remaining = relaxed.len(),
                "no shop open now; returning relaxed results"
            );
            relaxed_report.relaxed = true;
            return finish(relaxed, Some(FilterNotice::Relaxed), relaxed_report, filters.count);
        }
    }

    let stage = report.first_emptied();
    finish(strict, Some(FilterNotice::NoMatches { stage }), report, filters.count)
}

type Predicate = Box<dyn Fn(&Shop) -> bool>;

fn active_stages(
    filters: &FilterSet,
    anchor: Coordinates,
    now: DateTime<Utc>,
) -> Vec<(FilterStage, Predicate)> {
    let mut stages: Vec<(FilterStage, Predicate)> = Vec::new();

    if filters.requires_open_now() {
        stages.push((FilterStage::OpenNow, Box::new(move |s: &Shop| is_open_now(s, now))));
    }
    if let Some(threshold) = filters.open_after {
        stages.push((
            FilterStage::OpenAfter,
            Box::new(move |s: &Shop| matches_open_after(s, threshold)),
        ));
    }
    if filters.pets == Some(true) {
        stages.push((
            FilterStage::Pets,
            Box::new(|s: &Shop| s.amenities.pet_friendly == Some(true)),
        ));
    }
    if filters.wifi == Some(true) {
        stages.push((FilterStage::Wifi, Box::new(|s: &Shop| s.amenities.wifi == Some(true))));
    }
    if filters.charger == Some(true) {
        stages.push((
            FilterStage::Charger,
            Box::new(|s: &Shop| s.amenities.charger == Some(true)),
        ));
    }
    if let Some(max) = filters.price_level {
        stages.push((
            FilterStage::Price,
            Box::new(move |s: &Shop| s.price_level.is_some_and(|p| p <= max)),
        ));
    }
    if let Some(limit) = filters.distance_km {
        stages.push((
            FilterStage::Distance,
            Box::new(move |s: &Shop| {
                s.location
                    .is_some_and(|location| haversine_km(anchor, location) <= limit)
            }),
        ));
    }
    if let Some(min) = filters.min_rating {
        stages.push((
            FilterStage::MinRating,
            Box::new(move |s: &Shop| s.rating.is_some_and(|r| r >= min)),
        ));
    }

    stages
}

fn run_stages(
    mut shops: Vec<Shop>,
    filters: &FilterSet,
    anchor: Coordinates,
    now: DateTime<Utc>,
) -> (Vec<Shop>, FilterReport) {
    let mut report = FilterReport {
        input: shops.len(),
        ..FilterReport::default()
    };

    for (stage, keep) in active_stages(filters, anchor, now) {
        shops.retain(|shop| keep(shop));
        tracing::debug!(%stage, remaining = shops.len(), "applied filter stage");
        report.stages.push(StageCount {
            stage,
            remaining: shops.len(),
        });
    }

    (shops, report)
}

fn finish(
    mut shops: Vec<Shop>,
    notice: Option<FilterNotice>,
    report: FilterReport,
    count: Option<usize>,
) -> FilterOutcome {
    if let Some(count) = count {
        shops.truncate(count);
    }
    FilterOutcome {
        shops,
        notice,
        report,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use cuppa_core::{Amenities, OpeningHours};

    use super::*;

    const ANCHOR: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn shop(id: &str) -> Shop {
        Shop {
            id: None,
            external_id: id.to_string(),
            name: format!("Shop {id}"),
            address: None,
            location: Some(ANCHOR),
            opening_hours: Some(OpeningHours {
                open_now: Some(true),
                periods: vec![],
                weekday_text: vec![],
            }),
            utc_offset_minutes: None,
            price_level: Some(2),
            rating: Some(4.5),
            photo_refs: vec![],
            amenities: Amenities::default(),
        }
    }

    fn closed(mut shop: Shop) -> Shop {
        if let Some(hours) = shop.opening_hours.as_mut() {
            hours.open_now = Some(false);
        }
        shop
    }

    fn ids(shops: &[Shop]) -> Vec<&str> {
        shops.iter().map(|s| s.external_id.as_str()).collect()
    }

    #[test]
    fn empty_filter_set_is_identity() {
        let mut odd = shop("c");
        odd.location = None;
        odd.rating = None;
        odd.opening_hours = None;
        let input = vec![shop("a"), closed(shop("b")), odd];

        let outcome = apply_filters(input.clone(), &FilterSet::default(), ANCHOR, now());

        assert_eq!(outcome.shops, input);
        assert!(outcome.notice.is_none());
        assert!(outcome.report.stages.is_empty());
    }

    #[test]
    fn open_now_uses_provider_flag() {
        let filters = FilterSet {
            open_now: Some(true),
            ..FilterSet::default()
        };

        let outcome = apply_filters(vec![shop("a"), closed(shop("b"))], &filters, ANCHOR, now());

        assert_eq!(ids(&outcome.shops), vec!["a"]);
        assert!(outcome.notice.is_none());
    }

    #[test]
    fn distance_stage_uses_haversine_from_anchor() {
        let mut far = shop("far");
        far.location = Some(Coordinates { lat: 0.0, lng: 0.05 });
        let mut unknown = shop("unknown");
        unknown.location = None;
        let filters = FilterSet {
            distance_km: Some(1.0),
            ..FilterSet::default()
        };

        let outcome = apply_filters(vec![shop("near"), far, unknown], &filters, ANCHOR, now());

        assert_eq!(ids(&outcome.shops), vec!["near"]);
    }

    #[test]
    fn rating_and_price_exclude_unknown_values() {
        let mut unrated = shop("unrated");
        unrated.rating = None;
        let mut unpriced = shop("unpriced");
        unpriced.price_level = None;
        let mut pricey = shop("pricey");
        pricey.price_level = Some(4);
        let filters = FilterSet {
            min_rating: Some(4.0),
            price_level: Some(2),
            ..FilterSet::default()
        };

        let outcome = apply_filters(
            vec![shop("ok"), unrated, unpriced, pricey],
            &filters,
            ANCHOR,
            now(),
        );

        assert_eq!(ids(&outcome.shops), vec!["ok"]);
    }

    #[test]
    fn amenity_filters_only_constrain_when_true() {
        let mut with_wifi = shop("wifi");
        with_wifi.amenities.wifi = Some(true);
        let filters = FilterSet {
            wifi: Some(false),
            ..FilterSet::default()
        };
        let outcome = apply_filters(vec![with_wifi.clone(), shop("plain")], &filters, ANCHOR, now());
        assert_eq!(outcome.shops.len(), 2);

        let filters = FilterSet {
            wifi: Some(true),
            ..FilterSet::default()
        };
        let outcome = apply_filters(vec![with_wifi, shop("plain")], &filters, ANCHOR, now());
        assert_eq!(ids(&outcome.shops), vec!["wifi"]);
    }

    #[test]
    fn relaxes_open_now_when_nothing_is_open() {
        let mut far = closed(shop("far"));
        far.location = Some(Coordinates { lat: 0.0, lng: 0.05 });
        let mut unrated = closed(shop("unrated"));
        unrated.rating = Some(2.0);
        let input = vec![
            closed(shop("a")),
            far,
            closed(shop("b")),
            unrated,
            closed(shop("c")),
        ];
        let filters = FilterSet {
            open_now: Some(true),
            distance_km: Some(1.0),
            min_rating: Some(4.0),
            ..FilterSet::default()
        };

        let outcome = apply_filters(input, &filters, ANCHOR, now());

        assert_eq!(ids(&outcome.shops), vec!["a", "b", "c"]);
        assert_eq!(outcome.notice, Some(FilterNotice::Relaxed));
        assert!(outcome.report.relaxed);
        assert_eq!(
            outcome.notice.map(|n| n.message()).as_deref(),
            Some(RELAXED_MESSAGE)
        );
    }

    #[test]
    fn relaxation_never_resurrects_shops_failing_other_stages() {
        let mut far = closed(shop("far"));
        far.location = Some(Coordinates { lat: 0.0, lng: 0.05 });
        let filters = FilterSet {
            open_now: Some(true),
            distance_km: Some(1.0),
            ..FilterSet::default()
        };

        let outcome = apply_filters(vec![far], &filters, ANCHOR, now());

        assert!(outcome.shops.is_empty());
        assert_eq!(
            outcome.notice,
            Some(FilterNotice::NoMatches {
                stage: Some(FilterStage::OpenNow)
            })
        );
    }

    #[test]
    fn no_matches_names_the_stage_that_emptied_the_set() {
        let filters = FilterSet {
            charger: Some(true),
            min_rating: Some(3.0),
            ..FilterSet::default()
        };

        let outcome = apply_filters(vec![shop("a"), shop("b")], &filters, ANCHOR, now());

        assert_eq!(
            outcome.notice,
            Some(FilterNotice::NoMatches {
                stage: Some(FilterStage::Charger)
            })
        );
        assert_eq!(
            outcome.report.stages,
            vec![
                StageCount {
                    stage: FilterStage::Charger,
                    remaining: 0
                },
                StageCount {
                    stage: FilterStage::MinRating,
                    remaining: 0
                },
            ]
        );
    }

    #[test]
    fn empty_input_reports_no_matches_without_stage() {
        let outcome = apply_filters(vec![], &FilterSet::default(), ANCHOR, now());

        assert_eq!(outcome.notice, Some(FilterNotice::NoMatches { stage: None }));
    }

    #[test]
    fn count_truncates_after_filtering() {
        let filters = FilterSet {
            count: Some(2),
            ..FilterSet::default()
        };

        let outcome = apply_filters(
            vec![shop("a"), shop("b"), shop("c")],
            &filters,
            ANCHOR,
            now(),
        );

        assert_eq!(ids(&outcome.shops), vec!["a", "b"]);
    }
}
