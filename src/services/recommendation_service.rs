//! "People like you" and "people near you".

use crate::entities::{person_entity as persons, person_interest_entity as person_interests};
use crate::error::AppResult;
use crate::models::{PersonSummary, SimilarPersonResponse};
use crate::services::PersonService;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 50;

/// Cosine similarity of two binary vectors given their overlap and sizes.
pub fn cosine_similarity(shared: usize, a_len: usize, b_len: usize) -> f64 {
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }
    shared as f64 / ((a_len * b_len) as f64).sqrt()
}

/// Candidate scored against the target.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub person_id: i64,
    pub similarity: f64,
    pub shared: usize,
}

/// Highest score first, ties by id. Candidates with no overlap are dropped.
pub fn rank_candidates(
    target_len: usize,
    shared_counts: &HashMap<i64, usize>,
    interest_counts: &HashMap<i64, usize>,
    limit: usize,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = shared_counts
        .iter()
        .filter(|(_, shared)| **shared > 0)
        .map(|(&person_id, &shared)| {
            let b_len = interest_counts.get(&person_id).copied().unwrap_or(shared);
            ScoredCandidate {
                person_id,
                similarity: cosine_similarity(shared, target_len, b_len),
                shared,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then(a.person_id.cmp(&b.person_id))
    });
    scored.truncate(limit);
    scored
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Clone)]
pub struct RecommendationService {
    pool: DatabaseConnection,
    person_service: PersonService,
}

impl RecommendationService {
    pub fn new(pool: DatabaseConnection, person_service: PersonService) -> Self {
        Self {
            pool,
            person_service,
        }
    }

    async fn active_interest_rows(
        &self,
        filter: sea_orm::sea_query::SimpleExpr,
    ) -> AppResult<Vec<person_interests::Model>> {
        Ok(person_interests::Entity::find()
            .filter(filter)
            .filter(person_interests::Column::DeletedAt.is_null())
            .all(&self.pool)
            .await?)
    }

    /// Other users' persons ranked by interest overlap with `person_id`.
    pub async fn similar_persons(
        &self,
        user_id: i64,
        person_id: i64,
        limit: Option<u64>,
    ) -> AppResult<Vec<SimilarPersonResponse>> {
        self.person_service.find_owned(user_id, person_id).await?;

        let target: HashSet<i64> = self
            .active_interest_rows(person_interests::Column::PersonId.eq(person_id))
            .await?
            .into_iter()
            .map(|pi| pi.interest_id)
            .collect();
        if target.is_empty() {
            return Ok(Vec::new());
        }

        let mut shared_counts: HashMap<i64, usize> = HashMap::new();
        for row in self
            .active_interest_rows(
                person_interests::Column::InterestId.is_in(target.iter().copied()),
            )
            .await?
        {
            if row.person_id != person_id {
                *shared_counts.entry(row.person_id).or_default() += 1;
            }
        }
        if shared_counts.is_empty() {
            return Ok(Vec::new());
        }

        // only active persons belonging to other users are eligible
        let candidates: HashMap<i64, persons::Model> = persons::Entity::find()
            .filter(persons::Column::Id.is_in(shared_counts.keys().copied()))
            .filter(persons::Column::DeletedAt.is_null())
            .filter(persons::Column::UserId.ne(user_id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        shared_counts.retain(|id, _| candidates.contains_key(id));
        if shared_counts.is_empty() {
            return Ok(Vec::new());
        }

        let mut interest_counts: HashMap<i64, usize> = HashMap::new();
        for row in self
            .active_interest_rows(
                person_interests::Column::PersonId.is_in(shared_counts.keys().copied()),
            )
            .await?
        {
            *interest_counts.entry(row.person_id).or_default() += 1;
        }

        let ranked = rank_candidates(
            target.len(),
            &shared_counts,
            &interest_counts,
            clamp_limit(limit) as usize,
        );

        let mut candidates = candidates;
        Ok(ranked
            .into_iter()
            .filter_map(|c| {
                candidates.remove(&c.person_id).map(|p| SimilarPersonResponse {
                    person: PersonSummary::from(p),
                    similarity: c.similarity,
                    shared_interests: c.shared as i64,
                })
            })
            .collect())
    }

    /// Other users' persons in the same city, compared case-insensitively.
    pub async fn nearby_persons(
        &self,
        user_id: i64,
        person_id: i64,
        limit: Option<u64>,
    ) -> AppResult<Vec<PersonSummary>> {
        let person = self.person_service.find_owned(user_id, person_id).await?;
        let Some(city) = person
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
        else {
            return Ok(Vec::new());
        };

        Ok(persons::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(persons::Column::City))).eq(city))
            .filter(persons::Column::DeletedAt.is_null())
            .filter(persons::Column::UserId.ne(user_id))
            .order_by_asc(persons::Column::Id)
            .limit(clamp_limit(limit))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PersonSummary::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sets_score_one() {
        assert!((cosine_similarity(4, 4, 4) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_overlap() {
        let s = cosine_similarity(1, 4, 1);
        assert!((s - 0.5).abs() < 1e-9);
        assert_eq!(cosine_similarity(0, 3, 3), 0.0);
        assert_eq!(cosine_similarity(0, 0, 3), 0.0);
    }

    #[test]
    fn test_ranking_orders_by_score_then_id() {
        let shared = HashMap::from([(10, 2), (11, 2), (12, 1), (13, 0)]);
        let totals = HashMap::from([(10, 3), (11, 2), (12, 1), (13, 5)]);
        let ranked = rank_candidates(2, &shared, &totals, 10);
        let ids: Vec<i64> = ranked.iter().map(|c| c.person_id).collect();
        // 11: 2/sqrt(4)=1.0, 10: 2/sqrt(6)=0.816, 12: 1/sqrt(2)=0.707
        assert_eq!(ids, vec![11, 10, 12]);
        assert_eq!(ranked[0].shared, 2);
    }

    #[test]
    fn test_ranking_respects_limit() {
        let shared = HashMap::from([(1, 1), (2, 1), (3, 1)]);
        let totals = HashMap::from([(1, 1), (2, 1), (3, 1)]);
        assert_eq!(rank_candidates(1, &shared, &totals, 2).len(), 2);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
    }
}
