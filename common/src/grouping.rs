//! Clustering of stock units into catalog cards.
//!
//! Runs on the server when the catalog endpoint renders cards and in the
//! browser on a unit list it already fetched. Both sides must pick the same
//! representative, so the scoring lives only here.

use crate::model::catalog::{CardSort, ProductCard};
use crate::model::stock::{StockUnit, AVAILABLE_NOW_STATUS};
use crate::signature::signature;
use std::cmp::Ordering;
use std::collections::HashMap;

const SCORE_NOT_SOLD: u32 = 1000;
const SCORE_READY: u32 = 100;
const SCORE_PHOTO: u32 = 10;
const SCORE_AVAILABLE_TEXT: u32 = 1;

/// Units sharing one signature, in the order they were encountered.
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    pub signature: String,
    pub members: Vec<&'a StockUnit>,
}

/// Ranking used to choose which member represents a cluster.
pub fn representative_score(unit: &StockUnit) -> u32 {
    let mut score = 0;
    if !unit.is_sold() {
        score += SCORE_NOT_SOLD;
    }
    if unit.is_ready() {
        score += SCORE_READY;
    }
    if unit.has_photo() {
        score += SCORE_PHOTO;
    }
    if unit.status.trim().eq_ignore_ascii_case("available") {
        score += SCORE_AVAILABLE_TEXT;
    }
    score
}

impl<'a> Cluster<'a> {
    /// Highest-scoring member; the earliest one wins a tie.
    pub fn representative(&self) -> Option<&'a StockUnit> {
        let mut best: Option<(&'a StockUnit, u32)> = None;
        for &unit in &self.members {
            let score = representative_score(unit);
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((unit, score)),
            }
        }
        best.map(|(unit, _)| unit)
    }

    pub fn has_ready_unsold(&self) -> bool {
        self.members.iter().any(|u| u.is_ready() && !u.is_sold())
    }

    pub fn available_count(&self) -> usize {
        self.members.iter().filter(|u| !u.is_sold()).count()
    }

    /// Status shown on the card: the synthetic "available now" value when
    /// any member is ready and unsold, the representative's own otherwise.
    pub fn display_status(&self) -> String {
        if self.has_ready_unsold() {
            return AVAILABLE_NOW_STATUS.to_string();
        }
        self.representative()
            .map(|u| u.status.clone())
            .unwrap_or_default()
    }
}

/// Groups units by signature, keeping first-appearance order.
pub fn cluster(units: &[StockUnit]) -> Vec<Cluster<'_>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut clusters: Vec<Cluster<'_>> = Vec::new();

    for unit in units {
        let sig = signature(unit);
        match index.get(&sig) {
            Some(&pos) => clusters[pos].members.push(unit),
            None => {
                index.insert(sig.clone(), clusters.len());
                clusters.push(Cluster {
                    signature: sig,
                    members: vec![unit],
                });
            }
        }
    }

    clusters
}

fn card_price(cluster: &Cluster<'_>, representative: &StockUnit) -> Option<f64> {
    let lowest_unsold = cluster
        .members
        .iter()
        .filter(|u| !u.is_sold())
        .filter_map(|u| u.effective_price())
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    lowest_unsold.or_else(|| representative.effective_price())
}

fn card_photo(cluster: &Cluster<'_>, representative: &StockUnit) -> Option<String> {
    representative
        .images
        .first()
        .or_else(|| cluster.members.iter().find_map(|u| u.images.first()))
        .cloned()
}

pub fn build_cards(units: &[StockUnit]) -> Vec<ProductCard> {
    cluster(units)
        .iter()
        .filter_map(|c| {
            let representative = c.representative()?;
            let mut shown = representative.clone();
            shown.status = c.display_status();
            Some(ProductCard {
                signature: c.signature.clone(),
                vins: c.members.iter().map(|u| u.vin.clone()).collect(),
                available_count: c.available_count(),
                display_status: shown.status.clone(),
                price: card_price(c, representative),
                photo: card_photo(c, representative),
                representative: shown,
                bulletins: Vec::new(),
            })
        })
        .collect()
}

fn cmp_price(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_cards(cards: &mut [ProductCard], sort: CardSort) {
    match sort {
        CardSort::Recommended => cards.sort_by(|a, b| {
            let a_available = a.available_count > 0;
            let b_available = b.available_count > 0;
            let a_now = a.display_status == AVAILABLE_NOW_STATUS;
            let b_now = b.display_status == AVAILABLE_NOW_STATUS;
            b_available
                .cmp(&a_available)
                .then(b_now.cmp(&a_now))
                .then(cmp_price(a.price, b.price))
        }),
        CardSort::PriceAsc => cards.sort_by(|a, b| cmp_price(a.price, b.price)),
        CardSort::PriceDesc => cards.sort_by(|a, b| match (a.price, b.price) {
            (Some(_), Some(_)) => cmp_price(b.price, a.price),
            _ => cmp_price(a.price, b.price),
        }),
        CardSort::Newest => cards.sort_by(|a, b| {
            match (
                a.representative.production_year,
                b.representative.production_year,
            ) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
    }
}
