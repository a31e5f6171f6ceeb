//! Strategy registry.
//!
//! A [`Configuration`] maps (coreference type, mention type) to a
//! [`Strategy`]. It is built once, shared read-only (typically behind an
//! `Arc`) and replaced as a whole; there is no partial mutation.

use std::collections::HashMap;

use bioref_core::{CoreferenceType, MentionType};

use super::{
    Agreement, CandidateFilter, MentionFilter, PostFilter, ResolutionContext, Salience,
    ScoringRule,
};
use crate::error::{Error, Result};
use crate::lexicon::DomainLexicon;
use crate::mention::Mention;

/// The filter/score/post-filter pipeline for one (type, mention type) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Strategy {
    /// Short-circuit on the first rejection
    pub mention_filters: Vec<MentionFilter>,
    /// Intersected in order
    pub candidate_filters: Vec<CandidateFilter>,
    /// Summed per candidate
    pub scoring: Vec<ScoringRule>,
    /// Applied in order to the score map
    pub post_filters: Vec<PostFilter>,
}

impl Strategy {
    /// Empty strategy: accepts every mention and every candidate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mention filter.
    #[must_use]
    pub fn with_mention_filter(mut self, filter: MentionFilter) -> Self {
        self.mention_filters.push(filter);
        self
    }

    /// Append a candidate filter.
    #[must_use]
    pub fn with_candidate_filter(mut self, filter: CandidateFilter) -> Self {
        self.candidate_filters.push(filter);
        self
    }

    /// Append a scoring triple.
    #[must_use]
    pub fn with_scoring(mut self, agreement: Agreement, reward: i32, penalty: i32) -> Self {
        self.scoring.push(ScoringRule::new(agreement, reward, penalty));
        self
    }

    /// Append a post filter.
    #[must_use]
    pub fn with_post_filter(mut self, filter: PostFilter) -> Self {
        self.post_filters.push(filter);
        self
    }

    /// True if every mention filter accepts.
    #[must_use]
    pub fn accepts_mention(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        coreference_type: CoreferenceType,
    ) -> bool {
        self.mention_filters
            .iter()
            .all(|f| f.accepts(ctx, mention, coreference_type))
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Strategy registry plus the domain lexicon its checks consult.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    strategies: HashMap<(CoreferenceType, MentionType), Strategy>,
    lexicon: DomainLexicon,
}

impl Configuration {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Strategy for a pair, if configured.
    #[must_use]
    pub fn lookup(
        &self,
        coreference_type: CoreferenceType,
        mention_type: MentionType,
    ) -> Option<&Strategy> {
        self.strategies.get(&(coreference_type, mention_type))
    }

    /// The domain lexicon.
    #[must_use]
    pub fn lexicon(&self) -> &DomainLexicon {
        &self.lexicon
    }

    /// Number of configured pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True if no strategy is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Built-in biomedical strategies for all five coreference types.
    #[must_use]
    pub fn biomedical() -> Self {
        let mut builder = Self::builder().lexicon(DomainLexicon::biomedical());

        let pronoun_anaphora = Strategy::new()
            .with_mention_filter(MentionFilter::PleonasticIt)
            .with_mention_filter(MentionFilter::ThatComplementizer)
            .with_mention_filter(MentionFilter::NonFirstSecondPerson)
            .with_candidate_filter(CandidateFilter::WindowSize(2))
            .with_candidate_filter(CandidateFilter::PriorDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonPronominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_candidate_filter(CandidateFilter::Binding)
            .with_scoring(Agreement::Number, 2, 3)
            .with_scoring(Agreement::Person, 1, 3)
            .with_scoring(Agreement::Gender, 1, 2)
            .with_scoring(Agreement::Animacy, 1, 2)
            .with_scoring(Agreement::SemanticCoercion, 2, 1)
            .with_scoring(Agreement::DiscourseConnective, 1, 1)
            .with_post_filter(PostFilter::Threshold(0))
            .with_post_filter(PostFilter::TopScore)
            .with_post_filter(PostFilter::Salience(Salience::ParseTree));
        for m in [
            MentionType::PersonalPronoun,
            MentionType::PossessivePronoun,
            MentionType::DemonstrativePronoun,
            MentionType::DistributivePronoun,
        ] {
            builder = builder.strategy(CoreferenceType::Anaphora, m, pronoun_anaphora.clone());
        }

        let reciprocal = Strategy::new()
            .with_candidate_filter(CandidateFilter::SameSentence)
            .with_candidate_filter(CandidateFilter::PriorDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_scoring(Agreement::Number, 2, 4)
            .with_post_filter(PostFilter::Threshold(1))
            .with_post_filter(PostFilter::Salience(Salience::Proximity));
        builder = builder.strategy(
            CoreferenceType::Anaphora,
            MentionType::ReciprocalPronoun,
            reciprocal,
        );

        let relative = Strategy::new()
            .with_mention_filter(MentionFilter::ThatComplementizer)
            .with_candidate_filter(CandidateFilter::SameSentence)
            .with_candidate_filter(CandidateFilter::PriorDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_scoring(Agreement::Adjacency, 2, 2)
            .with_post_filter(PostFilter::Threshold(1))
            .with_post_filter(PostFilter::Salience(Salience::Proximity));
        builder = builder.strategy(
            CoreferenceType::Anaphora,
            MentionType::RelativePronoun,
            relative,
        );

        let nominal_anaphora = Strategy::new()
            .with_mention_filter(MentionFilter::HypernymHeaded)
            .with_candidate_filter(CandidateFilter::WindowSize(3))
            .with_candidate_filter(CandidateFilter::PriorDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonPronominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_candidate_filter(CandidateFilter::EntityBearing)
            .with_scoring(Agreement::HypernymList, 3, 3)
            .with_scoring(Agreement::Number, 1, 2)
            .with_post_filter(PostFilter::Threshold(2))
            .with_post_filter(PostFilter::TopScore)
            .with_post_filter(PostFilter::Salience(Salience::Proximity));
        for m in [
            MentionType::DefiniteNP,
            MentionType::DemonstrativeNP,
            MentionType::DistributiveNP,
        ] {
            builder = builder.strategy(CoreferenceType::Anaphora, m, nominal_anaphora.clone());
        }

        let cataphora = Strategy::new()
            .with_mention_filter(MentionFilter::PleonasticIt)
            .with_mention_filter(MentionFilter::NonFirstSecondPerson)
            .with_mention_filter(MentionFilter::CataphoricPosition)
            .with_candidate_filter(CandidateFilter::SameSentence)
            .with_candidate_filter(CandidateFilter::SubsequentDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonPronominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_scoring(Agreement::Number, 2, 3)
            .with_scoring(Agreement::Gender, 1, 2)
            .with_scoring(Agreement::Animacy, 1, 2)
            .with_post_filter(PostFilter::Threshold(0))
            .with_post_filter(PostFilter::TopScore)
            .with_post_filter(PostFilter::Salience(Salience::ParseTree));
        for m in [MentionType::PersonalPronoun, MentionType::PossessivePronoun] {
            builder = builder.strategy(CoreferenceType::Cataphora, m, cataphora.clone());
        }

        let appositive = Strategy::new()
            .with_candidate_filter(CandidateFilter::SameSentence)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_scoring(Agreement::SyntacticAppositive, 3, 3)
            .with_scoring(Agreement::Number, 1, 1)
            .with_post_filter(PostFilter::Threshold(2));
        let predicate_nominative = Strategy::new()
            .with_candidate_filter(CandidateFilter::SameSentence)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_scoring(Agreement::PredicateNominative, 3, 3)
            .with_scoring(Agreement::Number, 1, 1)
            .with_post_filter(PostFilter::Threshold(2));
        let ontological = Strategy::new()
            .with_candidate_filter(CandidateFilter::WindowSize(0))
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonOverlapping)
            .with_candidate_filter(CandidateFilter::EntityBearing)
            .with_scoring(Agreement::SharedConcept, 2, 2)
            .with_scoring(Agreement::Adjacency, 1, 0)
            .with_post_filter(PostFilter::Threshold(2))
            .with_post_filter(PostFilter::TopScore);
        for m in MentionType::NOMINAL {
            builder = builder
                .strategy(CoreferenceType::Appositive, m, appositive.clone())
                .strategy(
                    CoreferenceType::PredicateNominative,
                    m,
                    predicate_nominative.clone(),
                );
        }
        for m in [MentionType::ZeroArticleNP, MentionType::DefiniteNP] {
            builder = builder.strategy(CoreferenceType::Ontological, m, ontological.clone());
        }

        builder.build_unchecked()
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    strategies: HashMap<(CoreferenceType, MentionType), Strategy>,
    lexicon: Option<DomainLexicon>,
}

impl ConfigurationBuilder {
    /// Register (or replace) the strategy for a pair.
    #[must_use]
    pub fn strategy(
        mut self,
        coreference_type: CoreferenceType,
        mention_type: MentionType,
        strategy: Strategy,
    ) -> Self {
        self.strategies
            .insert((coreference_type, mention_type), strategy);
        self
    }

    /// Set the domain lexicon.
    #[must_use]
    pub fn lexicon(mut self, lexicon: DomainLexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Validate and build.
    ///
    /// Fails when a reward or penalty is negative, or when a threshold is
    /// above the best score the strategy's rules can produce.
    pub fn build(self) -> Result<Configuration> {
        for ((t, m), strategy) in &self.strategies {
            let max: i32 = strategy.scoring.iter().map(|r| r.reward.max(0)).sum();
            for filter in &strategy.post_filters {
                if let PostFilter::Threshold(threshold) = filter {
                    if !strategy.scoring.is_empty() && *threshold > max {
                        return Err(Error::config(format!(
                            "{t}/{m}: threshold {threshold} exceeds maximum score {max}"
                        )));
                    }
                }
            }
            if strategy
                .scoring
                .iter()
                .any(|r| r.reward < 0 || r.penalty < 0)
            {
                return Err(Error::config(format!(
                    "{t}/{m}: rewards and penalties must be non-negative"
                )));
            }
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> Configuration {
        Configuration {
            strategies: self.strategies,
            lexicon: self.lexicon.unwrap_or_default(),
        }
    }
}
