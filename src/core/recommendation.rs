use crate::core::tfidf::TfidfIndex;
use crate::domain::model::{Dataset, Product, Segment};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_RECOMMENDATIONS: usize = 6;
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.1;
pub const DEFAULT_MAX_FEATURES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationSettings {
    pub n_recommendations: usize,
    pub min_similarity: f64,
    pub max_features: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            n_recommendations: DEFAULT_RECOMMENDATIONS,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationReason {
    QueryMatch { query: String },
    Popular,
}

impl RecommendationReason {
    pub fn label(&self) -> String {
        match self {
            RecommendationReason::QueryMatch { query } => format!("Related to '{}'", query),
            RecommendationReason::Popular => "Popular pick".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: u64,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub brand: String,
    pub price: f64,
    pub reason: RecommendationReason,
    pub similarity_to_query: f64,
}

impl Recommendation {
    fn from_product(product: &Product, reason: RecommendationReason, similarity: f64) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            brand: product.brand.clone(),
            price: product.price,
            reason,
            similarity_to_query: similarity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationRequest<'a> {
    pub customer_id: u64,
    pub query: &'a str,
    /// None 時使用設定中的預設數量
    pub n: Option<usize>,
    pub segment: Segment,
}

/// 以 TF-IDF 比對查詢字串，不足時以區隔熱門商品補齊
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    products: Vec<Product>,
    index: TfidfIndex,
    popularity_by_segment: HashMap<Segment, Vec<usize>>,
    global_popularity: Vec<usize>,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn fit(dataset: &Dataset, settings: RecommendationSettings) -> Self {
        let documents: Vec<String> = dataset.products.iter().map(Product::search_text).collect();
        let index = TfidfIndex::fit(&documents, settings.max_features);

        let product_index: HashMap<u64, usize> = dataset
            .products
            .iter()
            .enumerate()
            .map(|(i, product)| (product.product_id, i))
            .collect();
        let customer_segments: HashMap<u64, Segment> = dataset
            .customers
            .iter()
            .map(|customer| (customer.customer_id, customer.segment))
            .collect();

        let mut global_counts: HashMap<usize, usize> = HashMap::new();
        let mut segment_counts: HashMap<Segment, HashMap<usize, usize>> = HashMap::new();
        for transaction in &dataset.transactions {
            let Some(&product) = product_index.get(&transaction.product_id) else {
                continue;
            };
            *global_counts.entry(product).or_insert(0) += 1;
            if let Some(segment) = customer_segments.get(&transaction.customer_id) {
                *segment_counts
                    .entry(*segment)
                    .or_default()
                    .entry(product)
                    .or_insert(0) += 1;
            }
        }

        let popularity_by_segment = segment_counts
            .into_iter()
            .map(|(segment, counts)| (segment, rank_by_count(counts)))
            .collect();

        tracing::debug!(
            "Fitted recommendation engine: {} products, {} terms",
            index.len(),
            index.vocabulary_len()
        );

        Self {
            products: dataset.products.clone(),
            index,
            popularity_by_segment,
            global_popularity: rank_by_count(global_counts),
            settings,
        }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn recommend(&self, request: &RecommendationRequest<'_>) -> Vec<Recommendation> {
        let limit = request
            .n
            .unwrap_or(self.settings.n_recommendations)
            .min(self.products.len());
        if limit == 0 {
            return Vec::new();
        }

        let query = request.query.trim();
        let similarities = self.index.similarities(query);

        let mut ranked: Vec<usize> = (0..self.products.len()).collect();
        ranked.sort_by(|&a, &b| {
            similarities[b]
                .partial_cmp(&similarities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut chosen: HashSet<usize> = HashSet::new();
        let mut recommendations = Vec::with_capacity(limit);

        for idx in ranked {
            if recommendations.len() >= limit || similarities[idx] <= self.settings.min_similarity {
                break;
            }
            chosen.insert(idx);
            recommendations.push(Recommendation::from_product(
                &self.products[idx],
                RecommendationReason::QueryMatch {
                    query: query.to_string(),
                },
                similarities[idx],
            ));
        }

        if recommendations.len() < limit {
            let segment_ranking = self
                .popularity_by_segment
                .get(&request.segment)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let fallback = segment_ranking
                .iter()
                .chain(self.global_popularity.iter())
                .copied()
                .chain(0..self.products.len());

            for idx in fallback {
                if recommendations.len() >= limit {
                    break;
                }
                if chosen.insert(idx) {
                    recommendations.push(Recommendation::from_product(
                        &self.products[idx],
                        RecommendationReason::Popular,
                        similarities[idx],
                    ));
                }
            }
        }

        tracing::debug!(
            customer_id = request.customer_id,
            segment = %request.segment,
            "Recommended {} products for query '{}'",
            recommendations.len(),
            query
        );

        recommendations
    }
}

fn rank_by_count(counts: HashMap<usize, usize>) -> Vec<usize> {
    let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().map(|(idx, _)| idx).collect()
}
